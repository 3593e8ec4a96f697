use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use matchday_engine::{db_types::MatchStatus, events::EventProducers, MatchApi};
use serde_json::Value;

use super::{helpers::*, mocks::MockClubStore};
use crate::routes::{
    CreateMatchRoute,
    DeleteMatchRoute,
    MatchByIdRoute,
    MatchesRoute,
    UpcomingMatchesRoute,
    UpdateMatchRoute,
};

fn match_routes(store: MockClubStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(MatchApi::new(store, EventProducers::default())))
            .service(UpcomingMatchesRoute::<MockClubStore>::new())
            .service(MatchesRoute::<MockClubStore>::new())
            .service(MatchByIdRoute::<MockClubStore>::new())
            .service(CreateMatchRoute::<MockClubStore>::new())
            .service(UpdateMatchRoute::<MockClubStore>::new())
            .service(DeleteMatchRoute::<MockClubStore>::new());
    }
}

#[actix_web::test]
async fn listing_a_day_finishes_overdue_matches() {
    let mut store = MockClubStore::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    store.expect_fetch_matches_by_date().times(2).returning(move |date| {
        assert_eq!(date, match_day());
        let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
        let early_status = if first { MatchStatus::Live } else { MatchStatus::Finished };
        Ok(vec![fixture(1, Some((10, 0)), early_status), fixture(2, Some((14, 0)), MatchStatus::NotStarted)])
    });
    store
        .expect_update_match_status()
        .withf(|id, status| *id == 1 && *status == MatchStatus::Finished)
        .times(1)
        .returning(|id, status| Ok(Some(fixture(id, Some((10, 0)), status))));

    let req = authorized(TestRequest::get().uri("/matches?date=2024-06-01"), 7);
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    let views: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(views[0]["status"], "FT");
    assert_eq!(views[0]["clock"]["elapsed_display"], "90′");
    assert_eq!(views[1]["status"], "NS");
    assert_eq!(views[1]["clock"]["has_started"], false);
    assert_eq!(views[1]["clock"]["kickoff_display"], "14:00");
}

#[actix_web::test]
async fn search_filters_the_day_by_team_name() {
    let mut store = MockClubStore::new();
    store.expect_fetch_matches_by_date().times(1).returning(|_| {
        let mut other = fixture(3, Some((15, 0)), MatchStatus::NotStarted);
        other.home_team.team_name = "Athletic".into();
        other.away_team.team_name = "Wanderers".into();
        Ok(vec![fixture(2, Some((14, 0)), MatchStatus::NotStarted), other])
    });
    let req = authorized(TestRequest::get().uri("/matches?date=2024-06-01&q=WAND"), 7);
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let views: Value = serde_json::from_str(&body).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["id"], 3);
}

#[actix_web::test]
async fn matches_cannot_be_scheduled_in_the_past() {
    let store = MockClubStore::new();
    let req = authorized(TestRequest::post().uri("/matches"), 7).set_json(serde_json::json!({
        "home_team_id": 1,
        "away_team_id": 2,
        "match_date": "2024-05-31",
        "match_time": "18:00:00"
    }));
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("in the past"), "{body}");
}

#[actix_web::test]
async fn new_matches_belong_to_the_caller() {
    let mut store = MockClubStore::new();
    store
        .expect_insert_match()
        .withf(|m| m.user_id == Some(7) && m.home_team_id == 1 && m.away_team_id == 2)
        .times(1)
        .returning(|_| Ok(fixture(5, Some((18, 0)), MatchStatus::NotStarted)));
    let req = authorized(TestRequest::post().uri("/matches"), 7).set_json(serde_json::json!({
        "home_team_id": 1,
        "away_team_id": 2,
        "match_date": "2024-06-01",
        "match_time": "18:00:00"
    }));
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let view: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(view["id"], 5);
    assert_eq!(view["clock"]["has_started"], false);
}

#[actix_web::test]
async fn finished_matches_cannot_be_restarted() {
    let mut store = MockClubStore::new();
    store.expect_fetch_match().returning(|id| Ok(Some(fixture(id, Some((10, 0)), MatchStatus::Finished))));
    let req = authorized(TestRequest::patch().uri("/matches/1"), 7).set_json(serde_json::json!({ "status": "LIVE" }));
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot move from FT to LIVE"), "{body}");
}

#[actix_web::test]
async fn status_changes_lost_to_the_sweep_are_refused() {
    let mut store = MockClubStore::new();
    let mut reads = 0;
    store.expect_fetch_match().times(2).returning(move |id| {
        reads += 1;
        let status = if reads == 1 { MatchStatus::NotStarted } else { MatchStatus::Finished };
        Ok(Some(fixture(id, Some((10, 0)), status)))
    });
    store
        .expect_update_match()
        .withf(|id, update| *id == 1 && update.expected_status == Some(MatchStatus::NotStarted))
        .times(1)
        .returning(|_, _| Ok(None));
    let req = authorized(TestRequest::patch().uri("/matches/1"), 7).set_json(serde_json::json!({ "status": "LIVE" }));
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("cannot move from FT to LIVE"), "{body}");
}

#[actix_web::test]
async fn started_matches_cannot_be_deleted() {
    let mut store = MockClubStore::new();
    store.expect_fetch_match().returning(|id| Ok(Some(fixture(id, Some((11, 0)), MatchStatus::Live))));
    let req = authorized(TestRequest::delete().uri("/matches/1"), 7);
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already started"), "{body}");
}

#[actix_web::test]
async fn upcoming_matches_exclude_kicked_off_fixtures() {
    let mut store = MockClubStore::new();
    store.expect_search_matches().times(1).returning(|_| {
        Ok(vec![fixture(1, Some((10, 0)), MatchStatus::NotStarted), fixture(2, Some((14, 0)), MatchStatus::NotStarted)])
    });
    let req = authorized(TestRequest::get().uri("/matches/upcoming"), 7);
    let (status, body) = send(req, match_routes(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let views: Value = serde_json::from_str(&body).unwrap();
    let ids = views.as_array().unwrap().iter().map(|v| v["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec![2]);
}

#[actix_web::test]
async fn matches_require_a_session() {
    let store = MockClubStore::new();
    let (status, body) = send(TestRequest::get().uri("/matches"), match_routes(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No session token"), "{body}");
}
