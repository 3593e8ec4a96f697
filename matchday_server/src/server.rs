use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use matchday_engine::{
    events::{EventHandlers, EventHooks, EventProducers, LoanCompletedEvent, MatchFinishedEvent},
    lifecycle::ScheduleClock,
    LoanApi,
    MatchApi,
    SqliteDatabase,
    TeamApi,
    UserApi,
};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    lifecycle_worker::{start_auto_finish_worker, start_loan_completion_worker},
    middleware::{HmacMiddlewareFactory, SessionMiddlewareFactory, IDENTITY_HMAC_HEADER},
    routes::{
        delete_avatar,
        health,
        serve_avatar,
        upload_avatar,
        CreateLoanRoute,
        CreateMatchRoute,
        CreateSessionRoute,
        CreateTeamRoute,
        DeleteLoanRoute,
        DeleteMatchRoute,
        DeleteTeamRoute,
        LoanByIdRoute,
        LoansRoute,
        MatchByIdRoute,
        MatchesRoute,
        MeRoute,
        TeamByIdRoute,
        TeamsRoute,
        UpcomingMatchesRoute,
        UpdateLoanRoute,
        UpdateMatchRoute,
        UpdateTeamRoute,
    },
    storage::FileAvatarStore,
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    }
    let avatars = FileAvatarStore::new(&config.avatars);
    avatars.prepare().await?;

    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let clock = config.schedule_clock();
    // The workers stop when these handles go out of scope, i.e. when the server shuts down
    let _auto_finish = start_auto_finish_worker(db.clone(), producers.clone(), clock, config.sweep_interval);
    let _loan_completion = start_loan_completion_worker(db.clone(), producers.clone(), config.sweep_interval);

    let srv = create_server_instance(config, db, producers, avatars, clock)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    avatars: FileAvatarStore,
    clock: ScheduleClock,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let team_api = TeamApi::new(db.clone());
        let match_api = MatchApi::new(db.clone(), producers.clone());
        let loan_api = LoanApi::new(db.clone(), producers.clone());
        let user_api = UserApi::new(db.clone());
        let issuer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mdl::access_log"))
            .app_data(web::Data::new(team_api))
            .app_data(web::Data::new(match_api))
            .app_data(web::Data::new(loan_api))
            .app_data(web::Data::new(user_api))
            .app_data(web::Data::new(issuer.clone()))
            .app_data(web::Data::new(avatars.clone()))
            .app_data(web::Data::new(clock))
            .app_data(web::PayloadConfig::new(avatars.max_bytes()));
        // Routes that require a session
        let api_scope = web::scope("/api")
            .wrap(SessionMiddlewareFactory::new(issuer))
            .service(MeRoute::<SqliteDatabase>::new())
            .service(TeamsRoute::<SqliteDatabase>::new())
            .service(TeamByIdRoute::<SqliteDatabase>::new())
            .service(CreateTeamRoute::<SqliteDatabase>::new())
            .service(UpdateTeamRoute::<SqliteDatabase>::new())
            .service(DeleteTeamRoute::<SqliteDatabase>::new())
            .service(upload_avatar)
            .service(delete_avatar)
            .service(UpcomingMatchesRoute::<SqliteDatabase>::new())
            .service(MatchesRoute::<SqliteDatabase>::new())
            .service(MatchByIdRoute::<SqliteDatabase>::new())
            .service(CreateMatchRoute::<SqliteDatabase>::new())
            .service(UpdateMatchRoute::<SqliteDatabase>::new())
            .service(DeleteMatchRoute::<SqliteDatabase>::new())
            .service(LoansRoute::<SqliteDatabase>::new())
            .service(LoanByIdRoute::<SqliteDatabase>::new())
            .service(CreateLoanRoute::<SqliteDatabase>::new())
            .service(UpdateLoanRoute::<SqliteDatabase>::new())
            .service(DeleteLoanRoute::<SqliteDatabase>::new());
        // Called by the identity provider, and signed with the shared secret
        let auth_scope = web::scope("/auth")
            .wrap(HmacMiddlewareFactory::new(
                IDENTITY_HMAC_HEADER,
                config.identity.hmac_secret.clone(),
                config.identity.hmac_checks,
            ))
            .service(CreateSessionRoute::<SqliteDatabase>::new());
        app.service(health).service(serve_avatar).service(auth_scope).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// The server only logs engine events. Other subscribers (notifications, for example) would be registered here.
fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_match_finished(|ev: MatchFinishedEvent| {
            Box::pin(async move {
                let fixture = &ev.fixture;
                let how = if ev.automatic { "automatically" } else { "manually" };
                info!(
                    "⚽️ Match #{} {} {}-{} {} finished {how} (was {})",
                    fixture.id,
                    fixture.home_team.team_name,
                    fixture.home_score,
                    fixture.away_score,
                    fixture.away_team.team_name,
                    ev.previous_status
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
        .on_loan_completed(|ev: LoanCompletedEvent| {
            Box::pin(async move {
                let loan = &ev.loan;
                info!(
                    "🤝️ Loan #{} completed: {} players from {} for match #{}",
                    loan.id, loan.number_of_players, loan.team.team_name, loan.fixture.match_id
                );
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    hooks
}
