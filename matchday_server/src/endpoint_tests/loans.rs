use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use matchday_engine::{
    db_types::{LoanStatus, MatchStatus},
    events::EventProducers,
    LoanApi,
};
use serde_json::{json, Value};

use super::{helpers::*, mocks::MockClubStore};
use crate::routes::{CreateLoanRoute, DeleteLoanRoute, LoanByIdRoute, LoansRoute, UpdateLoanRoute};

fn loan_routes(store: MockClubStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(LoanApi::new(store, EventProducers::default())))
            .service(LoansRoute::<MockClubStore>::new())
            .service(LoanByIdRoute::<MockClubStore>::new())
            .service(CreateLoanRoute::<MockClubStore>::new())
            .service(UpdateLoanRoute::<MockClubStore>::new())
            .service(DeleteLoanRoute::<MockClubStore>::new());
    }
}

#[actix_web::test]
async fn listing_loans_completes_finished_ones() {
    let mut store = MockClubStore::new();
    let finished = fixture(1, Some((10, 0)), MatchStatus::Finished);
    let waiting = loan(4, &finished, LoanStatus::Active);
    let done = loan(4, &finished, LoanStatus::Completed);
    store.expect_fetch_loans_awaiting_completion().times(1).returning(move || Ok(vec![waiting.clone()]));
    let completed = done.clone();
    store
        .expect_update_loan_status()
        .withf(|id, status| *id == 4 && *status == LoanStatus::Completed)
        .times(1)
        .returning(move |_, _| Ok(Some(completed.clone())));
    store.expect_fetch_all_loans().times(1).returning(move || Ok(vec![done.clone()]));

    let (status, body) = send(authorized(TestRequest::get().uri("/loans"), 7), loan_routes(store)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let loans: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(loans[0]["id"], 4);
    assert_eq!(loans[0]["status"], "completed");
    assert_eq!(loans[0]["fixture"]["status"], "FT");
}

#[actix_web::test]
async fn loans_need_a_match_that_has_not_started() {
    let mut store = MockClubStore::new();
    store.expect_fetch_match().returning(|id| Ok(Some(fixture(id, Some((10, 0)), MatchStatus::NotStarted))));
    let req = authorized(TestRequest::post().uri("/loans"), 7)
        .set_json(json!({ "team_id": 2, "match_id": 1, "number_of_players": 3 }));
    let (status, body) = send(req, loan_routes(store)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Match #1 has already started"), "{body}");
}

#[actix_web::test]
async fn loans_need_at_least_one_player() {
    let store = MockClubStore::new();
    let req = authorized(TestRequest::post().uri("/loans"), 7)
        .set_json(json!({ "team_id": 2, "match_id": 1, "number_of_players": 0 }));
    let (status, _) = send(req, loan_routes(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn create_loan_for_an_upcoming_match() {
    let mut store = MockClubStore::new();
    let upcoming = fixture(2, Some((14, 0)), MatchStatus::NotStarted);
    let stored = loan(9, &upcoming, LoanStatus::Pending);
    store.expect_fetch_match().returning(move |_| Ok(Some(upcoming.clone())));
    store
        .expect_insert_loan()
        .withf(|l| l.user_id == Some(3) && l.match_id == 2 && l.number_of_players == 2)
        .times(1)
        .returning(move |_| Ok(stored.clone()));
    let req = authorized(TestRequest::post().uri("/loans"), 3)
        .set_json(json!({ "team_id": 2, "match_id": 2, "number_of_players": 2 }));
    let (status, body) = send(req, loan_routes(store)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let loan: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(loan["id"], 9);
    assert_eq!(loan["status"], "pending");
}

#[actix_web::test]
async fn unknown_loans_are_not_found() {
    let mut store = MockClubStore::new();
    store.expect_fetch_loan().returning(|_| Ok(None));
    let (status, body) = send(authorized(TestRequest::get().uri("/loans/42"), 7), loan_routes(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Loan #42"), "{body}");
}
