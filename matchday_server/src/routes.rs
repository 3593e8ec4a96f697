//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: validation and the lifecycle rules live in the engine
//! API objects, and handlers only translate between HTTP and those calls.
//!
//! Every handler that depends on the time of day reads it from the shared [`ScheduleClock`], never from the system
//! clock directly.
use actix_web::{delete, get, http::header, post, web, HttpRequest, HttpResponse, Responder};
use log::*;
use matchday_engine::{
    db_types::{LoanUpdate, MatchUpdate, NewLoan, NewMatch, NewTeam, NewUserAccount, TeamUpdate},
    lifecycle::ScheduleClock,
    match_objects::{MatchQueryFilter, MatchView},
    traits::{LoanManagement, MatchManagement, TeamManagement, UserManagement},
    LoanApi,
    MatchApi,
    TeamApi,
    UserApi,
};

use crate::{
    auth::{SessionClaims, TokenIssuer},
    data_objects::{JsonResponse, MatchListParams, SessionResponse},
    errors::ServerError,
    storage::FileAvatarStore,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    // One type parameter per bound
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    // A single type parameter that carries all the bounds
    ($name:ident => $method:ident $path:literal where $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Session  ----------------------------------------------------
route!(create_session => Post "/session" impl UserManagement);
/// Route handler for the session endpoint
///
/// The identity provider calls this route after it has signed a user in. The body is the user's profile
/// (`provider_id`, `email` and optionally `name`, `image` and `provider`), signed with the shared identity secret in
/// the `X-Identity-Hmac-SHA256` header. The signature is checked by the HMAC middleware before this handler runs.
///
/// The user is created on first login and refreshed on every later one. The response carries a session token that
/// the client sends back in the `mdl_access_token` header.
pub async fn create_session<B: UserManagement>(
    body: web::Json<NewUserAccount>,
    api: web::Data<UserApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received session request");
    let user = api.login(body.into_inner()).await?;
    let (token, claims) = signer.issue_token(user.id, &user.email)?;
    debug!("💻️ Issued session token for user #{}", user.id);
    Ok(HttpResponse::Ok().json(SessionResponse { token, expires_at: claims.expires_at(), user }))
}

route!(me => Get "/me" impl UserManagement);
pub async fn me<B: UserManagement>(
    claims: SessionClaims,
    api: web::Data<UserApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET me for user #{}", claims.user_id);
    let user = api
        .user(claims.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User #{}", claims.user_id)))?;
    Ok(HttpResponse::Ok().json(user))
}

//----------------------------------------------   Teams  ----------------------------------------------------
route!(teams => Get "/teams" impl TeamManagement);
pub async fn teams<B: TeamManagement>(api: web::Data<TeamApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET teams");
    let teams = api.teams().await?;
    Ok(HttpResponse::Ok().json(teams))
}

route!(team_by_id => Get "/teams/{id}" impl TeamManagement);
pub async fn team_by_id<B: TeamManagement>(
    path: web::Path<i64>,
    api: web::Data<TeamApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let team = api.team(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(team))
}

route!(create_team => Post "/teams" impl TeamManagement);
pub async fn create_team<B: TeamManagement>(
    claims: SessionClaims,
    body: web::Json<NewTeam>,
    api: web::Data<TeamApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let team = body.into_inner().with_owner(claims.user_id);
    debug!("💻️ POST team {} for user #{}", team.team_name, claims.user_id);
    let team = api.create_team(team).await?;
    Ok(HttpResponse::Created().json(team))
}

route!(update_team => Patch "/teams/{id}" impl TeamManagement);
/// Changes to the avatar replace the stored image. The old image is removed once the team has been updated.
pub async fn update_team<B: TeamManagement>(
    path: web::Path<i64>,
    body: web::Json<TeamUpdate>,
    api: web::Data<TeamApi<B>>,
    avatars: web::Data<FileAvatarStore>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let update = body.into_inner();
    let previous_avatar = match &update.avatar_url {
        Some(_) => api.team(id).await?.avatar_url,
        None => None,
    };
    let team = api.update_team(id, update).await?;
    if let Some(old) = previous_avatar.filter(|old| team.avatar_url.as_ref() != Some(old)) {
        remove_avatar(&avatars, &old).await;
    }
    Ok(HttpResponse::Ok().json(team))
}

route!(delete_team => Delete "/teams/{id}" impl TeamManagement);
pub async fn delete_team<B: TeamManagement>(
    path: web::Path<i64>,
    api: web::Data<TeamApi<B>>,
    avatars: web::Data<FileAvatarStore>,
) -> Result<HttpResponse, ServerError> {
    let team = api.delete_team(path.into_inner()).await?;
    if let Some(url) = &team.avatar_url {
        remove_avatar(&avatars, url).await;
    }
    Ok(HttpResponse::Ok().json(team))
}

async fn remove_avatar(avatars: &FileAvatarStore, url: &str) {
    // An orphaned image is harmless, so failures here do not fail the request
    if let Err(e) = avatars.delete_by_url(url).await {
        warn!("🖼️ Could not remove avatar {url}. {e}");
    }
}

//----------------------------------------------   Avatars  ----------------------------------------------------
/// Accepts a raw image body. The image type is taken from the `Content-Type` header.
#[post("/avatars")]
pub async fn upload_avatar(
    req: HttpRequest,
    body: web::Bytes,
    avatars: web::Data<FileAvatarStore>,
) -> Result<HttpResponse, ServerError> {
    let content_type = req.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let stored = avatars.save(content_type, body.as_ref()).await?;
    Ok(HttpResponse::Created().json(stored))
}

#[delete("/avatars/{name}")]
pub async fn delete_avatar(
    path: web::Path<String>,
    avatars: web::Data<FileAvatarStore>,
) -> Result<HttpResponse, ServerError> {
    let name = path.into_inner();
    if avatars.delete(&name).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Avatar {name} deleted"))))
    } else {
        Err(ServerError::NoRecordFound(format!("Avatar {name}")))
    }
}

#[get("/avatars/{name}")]
pub async fn serve_avatar(
    path: web::Path<String>,
    avatars: web::Data<FileAvatarStore>,
) -> Result<HttpResponse, ServerError> {
    let name = path.into_inner();
    let (data, content_type) =
        avatars.read(&name).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Avatar {name}")))?;
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .body(data))
}

//----------------------------------------------   Matches  ----------------------------------------------------
route!(matches => Get "/matches" impl MatchManagement);
/// Lists matches as [`MatchView`]s.
///
/// With `date`, this is the schedule for that day, after overdue matches have been finished. With `q`, only matches
/// where either team's name contains `q` are returned. Without parameters, the whole schedule is returned.
pub async fn matches<B: MatchManagement>(
    params: web::Query<MatchListParams>,
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let now = clock.now();
    let fixtures = match (params.date, params.search_text()) {
        (Some(date), text) => {
            let day = api.matches_for_date(date, now).await?;
            match text.map(str::to_lowercase) {
                Some(text) => day
                    .into_iter()
                    .filter(|m| {
                        m.home_team.team_name.to_lowercase().contains(&text) ||
                            m.away_team.team_name.to_lowercase().contains(&text)
                    })
                    .collect(),
                None => day,
            }
        },
        (None, Some(text)) => api.search(MatchQueryFilter::default().with_team_name(text)).await?,
        (None, None) => api.matches().await?,
    };
    Ok(HttpResponse::Ok().json(MatchView::from_matches(fixtures, now)))
}

route!(upcoming_matches => Get "/matches/upcoming" impl MatchManagement);
/// Matches that have not kicked off. Loans can only be made for these.
pub async fn upcoming_matches<B: MatchManagement>(
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let now = clock.now();
    let fixtures = api.upcoming_matches(now).await?;
    Ok(HttpResponse::Ok().json(MatchView::from_matches(fixtures, now)))
}

route!(match_by_id => Get "/matches/{id:\\d+}" impl MatchManagement);
pub async fn match_by_id<B: MatchManagement>(
    path: web::Path<i64>,
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let fixture = api.fixture(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MatchView::new(fixture, clock.now())))
}

route!(create_match => Post "/matches" impl MatchManagement);
pub async fn create_match<B: MatchManagement>(
    claims: SessionClaims,
    body: web::Json<NewMatch>,
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let now = clock.now();
    let fixture = api.create_match(body.into_inner().with_owner(claims.user_id), now).await?;
    Ok(HttpResponse::Created().json(MatchView::new(fixture, now)))
}

route!(update_match => Patch "/matches/{id:\\d+}" impl MatchManagement);
pub async fn update_match<B: MatchManagement>(
    path: web::Path<i64>,
    body: web::Json<MatchUpdate>,
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let now = clock.now();
    let fixture = api.update_match(path.into_inner(), body.into_inner(), now).await?;
    Ok(HttpResponse::Ok().json(MatchView::new(fixture, now)))
}

route!(delete_match => Delete "/matches/{id:\\d+}" impl MatchManagement);
pub async fn delete_match<B: MatchManagement>(
    path: web::Path<i64>,
    api: web::Data<MatchApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError> {
    let now = clock.now();
    let fixture = api.delete_match(path.into_inner(), now).await?;
    Ok(HttpResponse::Ok().json(MatchView::new(fixture, now)))
}

//----------------------------------------------   Loans  ----------------------------------------------------
route!(loans => Get "/loans" where LoanManagement, MatchManagement);
/// Lists all loans, newest first. Loans for finished matches are completed before the list is read.
pub async fn loans<B>(api: web::Data<LoanApi<B>>) -> Result<HttpResponse, ServerError>
where B: LoanManagement + MatchManagement {
    let loans = api.loans_with_completion().await?;
    Ok(HttpResponse::Ok().json(loans))
}

route!(loan_by_id => Get "/loans/{id}" where LoanManagement, MatchManagement);
pub async fn loan_by_id<B>(path: web::Path<i64>, api: web::Data<LoanApi<B>>) -> Result<HttpResponse, ServerError>
where B: LoanManagement + MatchManagement {
    let loan = api.loan(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(loan))
}

route!(create_loan => Post "/loans" where LoanManagement, MatchManagement);
pub async fn create_loan<B>(
    claims: SessionClaims,
    body: web::Json<NewLoan>,
    api: web::Data<LoanApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError>
where
    B: LoanManagement + MatchManagement,
{
    let loan = api.create_loan(body.into_inner().with_owner(claims.user_id), clock.now()).await?;
    Ok(HttpResponse::Created().json(loan))
}

route!(update_loan => Patch "/loans/{id}" where LoanManagement, MatchManagement);
pub async fn update_loan<B>(
    path: web::Path<i64>,
    body: web::Json<LoanUpdate>,
    api: web::Data<LoanApi<B>>,
    clock: web::Data<ScheduleClock>,
) -> Result<HttpResponse, ServerError>
where
    B: LoanManagement + MatchManagement,
{
    let loan = api.update_loan(path.into_inner(), body.into_inner(), clock.now()).await?;
    Ok(HttpResponse::Ok().json(loan))
}

route!(delete_loan => Delete "/loans/{id}" where LoanManagement, MatchManagement);
pub async fn delete_loan<B>(path: web::Path<i64>, api: web::Data<LoanApi<B>>) -> Result<HttpResponse, ServerError>
where B: LoanManagement + MatchManagement {
    let loan = api.delete_loan(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(loan))
}
