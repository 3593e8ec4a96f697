use std::{env, path::PathBuf, time::Duration};

use log::*;
use matchday_common::{parse_boolean_flag, parse_env_var, Secret};
use matchday_engine::lifecycle::ScheduleClock;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_MDL_HOST: &str = "127.0.0.1";
const DEFAULT_MDL_PORT: u16 = 8370;
const DEFAULT_SESSION_LIFETIME_HOURS: u64 = 24;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_AVATAR_PATH: &str = "data/team-avatars";
const DEFAULT_AVATAR_PUBLIC_URL: &str = "/avatars";
const DEFAULT_AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Apply the embedded schema migrations before accepting requests
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub identity: IdentityConfig,
    /// How often the auto-finish and loan completion sweeps run
    pub sweep_interval: Duration,
    /// Offset from UTC of the club's local time. Match dates and kickoff times are read in this time zone.
    pub schedule_utc_offset_minutes: i32,
    pub avatars: AvatarConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MDL_HOST.to_string(),
            port: DEFAULT_MDL_PORT,
            database_url: String::default(),
            run_migrations: true,
            auth: AuthConfig::default(),
            identity: IdentityConfig::default(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            schedule_utc_offset_minutes: 0,
            avatars: AvatarConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MDL_HOST").ok().unwrap_or_else(|| DEFAULT_MDL_HOST.into());
        let port = env_or_default("MDL_PORT", DEFAULT_MDL_PORT);
        let database_url = env::var("MDL_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MDL_DATABASE_URL is not set. Please set it to the URL for the matchday database.");
            String::default()
        });
        let run_migrations = parse_boolean_flag(env::var("MDL_RUN_MIGRATIONS").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the session configuration from environment variables. {e}");
            AuthConfig::default()
        });
        let identity = IdentityConfig::from_env_or_default();
        let sweep_interval = env_or_default("MDL_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
        let sweep_interval = if sweep_interval == 0 {
            warn!("🪛️ MDL_SWEEP_INTERVAL_SECS cannot be zero. Using {DEFAULT_SWEEP_INTERVAL_SECS}s instead.");
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        } else {
            Duration::from_secs(sweep_interval)
        };
        let schedule_utc_offset_minutes = env_or_default("MDL_SCHEDULE_UTC_OFFSET_MINUTES", 0i32);
        let avatars = AvatarConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            run_migrations,
            auth,
            identity,
            sweep_interval,
            schedule_utc_offset_minutes,
            avatars,
        }
    }

    /// The clock used to decide whether matches have kicked off.
    pub fn schedule_clock(&self) -> ScheduleClock {
        if !(-1439..=1439).contains(&self.schedule_utc_offset_minutes) {
            warn!(
                "🪛️ {} minutes is not a valid UTC offset. Match times will be read as UTC.",
                self.schedule_utc_offset_minutes
            );
        }
        ScheduleClock::with_utc_offset_minutes(self.schedule_utc_offset_minutes)
    }
}

/// Reads and parses `name`, logging and falling back to `default` when the variable is missing or invalid.
fn env_or_default<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match parse_env_var::<T>(name) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            warn!("🪛️ Invalid configuration value for {name}. {e} Using the default, {default}, instead.");
            default
        },
        None => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The key used to sign session tokens.
    pub session_secret: Secret<String>,
    pub session_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The session secret has not been set. I'm using a random value for this session. Every session \
             token will become invalid when the server restarts. Set MDL_SESSION_SECRET in production. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self {
            session_secret: Secret::new(secret),
            session_lifetime: Duration::from_secs(DEFAULT_SESSION_LIFETIME_HOURS * 3600),
        }
    }
}

impl AuthConfig {
    pub fn new(secret: &str, session_lifetime: Duration) -> Self {
        Self { session_secret: Secret::new(secret.to_string()), session_lifetime }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("MDL_SESSION_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [MDL_SESSION_SECRET]")))?;
        if secret.len() < 16 {
            return Err(ServerError::ConfigurationError(
                "MDL_SESSION_SECRET must be at least 16 characters long".to_string(),
            ));
        }
        let hours = env_or_default("MDL_SESSION_LIFETIME_HOURS", DEFAULT_SESSION_LIFETIME_HOURS);
        Ok(Self::new(&secret, Duration::from_secs(hours * 3600)))
    }
}

//-----------------------------------------------  IdentityConfig  -----------------------------------------------------
/// Settings for the identity provider that signs users in and calls `/auth/session` on their behalf.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub hmac_secret: Secret<String>,
    pub hmac_checks: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { hmac_secret: Secret::default(), hmac_checks: true }
    }
}

impl IdentityConfig {
    pub fn from_env_or_default() -> Self {
        let hmac_secret = env::var("MDL_IDENTITY_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ MDL_IDENTITY_HMAC_SECRET is not set. Please set it to the secret shared with the identity \
                 provider."
            );
            String::default()
        });
        let hmac_checks = parse_boolean_flag(env::var("MDL_IDENTITY_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!("🚨️ Identity HMAC checks are disabled. Anyone can sign in as anyone. Never do this in production.");
        }
        Self { hmac_secret: Secret::new(hmac_secret), hmac_checks }
    }
}

//------------------------------------------------  AvatarConfig  -----------------------------------------------------
#[derive(Clone, Debug)]
pub struct AvatarConfig {
    /// Directory holding the stored images
    pub path: PathBuf,
    /// Prefix for the public URL of a stored image
    pub public_url: String,
    pub max_bytes: usize,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_AVATAR_PATH),
            public_url: DEFAULT_AVATAR_PUBLIC_URL.to_string(),
            max_bytes: DEFAULT_AVATAR_MAX_BYTES,
        }
    }
}

impl AvatarConfig {
    pub fn from_env_or_default() -> Self {
        let path = env::var("MDL_AVATAR_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_AVATAR_PATH));
        let public_url = env::var("MDL_AVATAR_PUBLIC_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_AVATAR_PUBLIC_URL.to_string());
        let max_bytes = env_or_default("MDL_AVATAR_MAX_BYTES", DEFAULT_AVATAR_MAX_BYTES);
        info!("🪛️ Avatars are stored in {} and served from {public_url}", path.display());
        Self { path, public_url, max_bytes }
    }
}
