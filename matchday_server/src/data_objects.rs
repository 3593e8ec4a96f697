use std::fmt::Display;

use chrono::{DateTime, NaiveDate, Utc};
use matchday_engine::db_types::UserAccount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Returned by `/auth/session`. The token goes in the `mdl_access_token` header of subsequent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserAccount,
}

/// Query parameters for `GET /api/matches`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchListParams {
    /// Only this day's schedule. Loading a day runs the auto-finish pass over it first.
    pub date: Option<NaiveDate>,
    /// Case-insensitive fragment of either team's name
    pub q: Option<String>,
}

impl MatchListParams {
    pub fn search_text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
