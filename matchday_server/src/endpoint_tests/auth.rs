use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use matchday_common::Secret;
use matchday_engine::UserApi;
use serde_json::{json, Value};

use super::{helpers::*, mocks::MockUserManager};
use crate::{
    data_objects::SessionResponse,
    helpers::calculate_hmac,
    middleware::{HmacMiddlewareFactory, IDENTITY_HMAC_HEADER},
    routes::{CreateSessionRoute, MeRoute},
};

const IDENTITY_SECRET: &str = "identity-provider-test-secret";

async fn post_session(store: MockUserManager, body: &str, signature: Option<String>) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().app_data(web::Data::new(UserApi::new(store))).app_data(web::Data::new(test_issuer())).service(
        web::scope("/auth")
            .wrap(HmacMiddlewareFactory::new(IDENTITY_HMAC_HEADER, Secret::new(IDENTITY_SECRET.to_string()), true))
            .service(CreateSessionRoute::<MockUserManager>::new()),
    );
    let service = test::init_service(app).await;
    let mut req = TestRequest::post()
        .uri("/auth/session")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((IDENTITY_HMAC_HEADER, signature));
    }
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            (res.status(), e.to_string())
        },
    }
}

fn profile() -> String {
    json!({ "provider_id": "google-1234", "email": "Coach@Example.com", "name": "Coach" }).to_string()
}

#[actix_web::test]
async fn signed_logins_get_a_session() {
    let mut store = MockUserManager::new();
    store
        .expect_upsert_user()
        .withf(|u| u.provider_id == "google-1234" && u.provider == "google")
        .times(1)
        .returning(|_| Ok(user(12, "coach@example.com")));
    let body = profile();
    let signature = calculate_hmac(IDENTITY_SECRET, body.as_bytes());
    let (status, body) = post_session(store, &body, Some(signature)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let session: SessionResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(session.user.id, 12);
    let claims = test_issuer().verify(&session.token).unwrap();
    assert_eq!(claims.user_id, 12);
    assert_eq!(claims.email, "coach@example.com");
    assert_eq!(claims.expires_at(), session.expires_at);
}

#[actix_web::test]
async fn logins_with_a_bad_signature_are_forbidden() {
    let body = profile();
    let signature = calculate_hmac("not the identity secret", body.as_bytes());
    let (status, _) = post_session(MockUserManager::new(), &body, Some(signature)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unsigned_logins_are_forbidden() {
    let (status, _) = post_session(MockUserManager::new(), &profile(), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn logins_need_an_email_address() {
    let body = json!({ "provider_id": "google-1234", "email": "nobody" }).to_string();
    let signature = calculate_hmac(IDENTITY_SECRET, body.as_bytes());
    let (status, body) = post_session(MockUserManager::new(), &body, Some(signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("not a valid email address"), "{body}");
}

#[actix_web::test]
async fn me_returns_the_session_user() {
    let mut store = MockUserManager::new();
    store.expect_fetch_user().withf(|id| *id == 12).returning(|id| Ok(Some(user(id, "coach@example.com"))));
    let configure = move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(UserApi::new(store))).service(MeRoute::<MockUserManager>::new());
    };
    let (status, body) = send(authorized(TestRequest::get().uri("/me"), 12), configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let me: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(me["email"], "coach@example.com");
}

#[actix_web::test]
async fn garbage_tokens_are_unauthorized() {
    let configure = |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(UserApi::new(MockUserManager::new()))).service(MeRoute::<MockUserManager>::new());
    };
    let req = TestRequest::get().uri("/me").insert_header(("mdl_access_token", "made.up"));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("Session token"), "{body}");
}
