use std::time::Duration;

use actix_web::{body::to_bytes, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use matchday_engine::{
    db_types::{Loan, LoanFixture, LoanStatus, Match, MatchStatus, Team, TeamSummary, UserAccount},
    lifecycle::ScheduleClock,
};

use crate::{
    auth::{TokenIssuer, SESSION_TOKEN_HEADER},
    config::{AuthConfig, AvatarConfig},
    middleware::SessionMiddlewareFactory,
    storage::FileAvatarStore,
};

// DO NOT re-use this secret anywhere.
pub const TEST_SESSION_SECRET: &str = "endpoint-test-session-secret-0001";

pub fn test_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig::new(TEST_SESSION_SECRET, Duration::from_secs(3600)))
}

pub fn valid_token(user_id: i64) -> String {
    let (token, _) = test_issuer().issue_token(user_id, "coach@example.com").unwrap();
    token
}

/// Saturday 1 June 2024, 11:46 club time
pub fn now() -> NaiveDateTime {
    match_day().and_hms_opt(11, 46, 0).unwrap()
}

pub fn match_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn team(id: i64, name: &str) -> Team {
    let stamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    Team {
        id,
        team_name: name.to_string(),
        captain_name: format!("Captain of {name}"),
        captain_phone: "0700000000".to_string(),
        avatar_url: None,
        user_id: Some(7),
        created_at: stamp,
        updated_at: stamp,
    }
}

fn summary(id: i64, name: &str) -> TeamSummary {
    TeamSummary { id, team_name: name.to_string(), avatar_url: None }
}

/// Rovers (1) vs United (2) on the match day
pub fn fixture(id: i64, kickoff: Option<(u32, u32)>, status: MatchStatus) -> Match {
    let stamp = Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap();
    Match {
        id,
        home_team: summary(1, "Rovers"),
        away_team: summary(2, "United"),
        home_score: 0,
        away_score: 0,
        status,
        league: "Sunday League".to_string(),
        country: "England".to_string(),
        match_date: match_day(),
        match_time: kickoff.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
        location: Some("Hackney Marshes".to_string()),
        user_id: Some(7),
        created_at: stamp,
        updated_at: stamp,
    }
}

pub fn loan(id: i64, fixture: &Match, status: LoanStatus) -> Loan {
    let stamp = Utc.with_ymd_and_hms(2024, 5, 21, 8, 0, 0).unwrap();
    Loan {
        id,
        team: fixture.away_team.clone(),
        fixture: LoanFixture {
            match_id: fixture.id,
            match_date: fixture.match_date,
            match_time: fixture.match_time,
            location: fixture.location.clone(),
            home_team_name: fixture.home_team.team_name.clone(),
            away_team_name: fixture.away_team.team_name.clone(),
            status: fixture.status,
        },
        number_of_players: 2,
        status,
        user_id: Some(7),
        created_at: stamp,
        updated_at: stamp,
    }
}

pub fn user(id: i64, email: &str) -> UserAccount {
    let stamp = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    UserAccount {
        id,
        provider_id: "google-1234".to_string(),
        provider: "google".to_string(),
        email: email.to_string(),
        name: Some("Coach".to_string()),
        image: None,
        last_login_at: stamp,
        created_at: stamp,
        updated_at: stamp,
    }
}

pub fn authorized(req: TestRequest, user_id: i64) -> TestRequest {
    req.insert_header((SESSION_TOKEN_HEADER, valid_token(user_id)))
}

/// Sends the request to an app made up of the routes in `configure`, behind the session middleware. The clock is
/// frozen at [`now`].
pub async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let avatars = FileAvatarStore::new(&AvatarConfig {
        path: std::env::temp_dir().join("matchday-endpoint-tests"),
        ..AvatarConfig::default()
    });
    let app = App::new()
        .app_data(web::Data::new(ScheduleClock::Frozen(now())))
        .app_data(web::Data::new(avatars))
        .service(web::scope("").wrap(SessionMiddlewareFactory::new(test_issuer())).configure(configure));
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.ok().unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}
