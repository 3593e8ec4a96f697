use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use matchday_engine::{traits::StoreError, TeamApi};
use serde_json::{json, Value};

use super::{helpers::*, mocks::MockTeamManager};
use crate::routes::{upload_avatar, CreateTeamRoute, DeleteTeamRoute, TeamByIdRoute, TeamsRoute, UpdateTeamRoute};

fn team_routes(store: MockTeamManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(TeamApi::new(store)))
            .service(TeamsRoute::<MockTeamManager>::new())
            .service(TeamByIdRoute::<MockTeamManager>::new())
            .service(CreateTeamRoute::<MockTeamManager>::new())
            .service(UpdateTeamRoute::<MockTeamManager>::new())
            .service(DeleteTeamRoute::<MockTeamManager>::new());
    }
}

#[actix_web::test]
async fn new_teams_belong_to_the_caller() {
    let mut store = MockTeamManager::new();
    store
        .expect_insert_team()
        .withf(|t| t.user_id == Some(7) && t.team_name == "Rovers" && t.captain_phone == "0700000000")
        .times(1)
        .returning(|t| Ok(team(1, &t.team_name)));
    let req = authorized(TestRequest::post().uri("/teams"), 7).set_json(json!({
        "team_name": "  Rovers ",
        "captain_name": "Ann",
        "captain_phone": "0700000000",
        "user_id": 99
    }));
    let (status, body) = send(req, team_routes(store)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let team: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(team["team_name"], "Rovers");
    assert_eq!(team["user_id"], 7);
}

#[actix_web::test]
async fn teams_need_a_captain() {
    let store = MockTeamManager::new();
    let req = authorized(TestRequest::post().uri("/teams"), 7).set_json(json!({
        "team_name": "Rovers",
        "captain_name": " ",
        "captain_phone": "0700000000"
    }));
    let (status, body) = send(req, team_routes(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Captain name"), "{body}");
}

#[actix_web::test]
async fn teams_with_fixtures_cannot_be_deleted() {
    let mut store = MockTeamManager::new();
    store
        .expect_delete_team()
        .times(1)
        .returning(|_| Err(StoreError::ConstraintViolation("FOREIGN KEY constraint failed".into())));
    let (status, body) = send(authorized(TestRequest::delete().uri("/teams/1"), 7), team_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("still has fixtures"), "{body}");
}

#[actix_web::test]
async fn unknown_teams_are_not_found() {
    let mut store = MockTeamManager::new();
    store.expect_fetch_team().returning(|_| Ok(None));
    let (status, _) = send(authorized(TestRequest::get().uri("/teams/99"), 7), team_routes(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn list_teams() {
    let mut store = MockTeamManager::new();
    store.expect_fetch_all_teams().returning(|| Ok(vec![team(2, "United"), team(1, "Rovers")]));
    let (status, body) = send(authorized(TestRequest::get().uri("/teams"), 7), team_routes(store)).await;
    assert_eq!(status, StatusCode::OK);
    let teams: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(teams.as_array().unwrap().len(), 2);
    assert_eq!(teams[0]["team_name"], "United");
}

#[actix_web::test]
async fn svg_avatars_are_refused() {
    let req = authorized(TestRequest::post().uri("/avatars"), 7)
        .insert_header(("Content-Type", "image/svg+xml"))
        .set_payload("<svg xmlns='http://www.w3.org/2000/svg'><script>alert(1)</script></svg>");
    let (status, body) = send(req, |cfg: &mut ServiceConfig| {
        cfg.service(upload_avatar);
    })
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body.contains("image/svg+xml images are not supported"), "{body}");
}
