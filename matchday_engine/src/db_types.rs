use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::error;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

//--------------------------------------     MatchStatus       ---------------------------------------------------------
/// The lifecycle status of a match.
///
/// The allowed transitions are `NS → LIVE → HT → LIVE → FT`, plus the shortcuts `NS → FT` (used by auto-finish) and
/// `HT → FT`. `FT` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum MatchStatus {
    /// Scheduled, and not yet kicked off
    #[serde(rename = "NS")]
    #[sqlx(rename = "NS")]
    NotStarted,
    /// In play
    #[serde(rename = "LIVE")]
    #[sqlx(rename = "LIVE")]
    Live,
    /// Half time
    #[serde(rename = "HT")]
    #[sqlx(rename = "HT")]
    HalfTime,
    /// Full time. Nothing can move a match out of this status.
    #[serde(rename = "FT")]
    #[sqlx(rename = "FT")]
    Finished,
}

impl MatchStatus {
    pub fn code(&self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "NS",
            MatchStatus::Live => "LIVE",
            MatchStatus::HalfTime => "HT",
            MatchStatus::Finished => "FT",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Finished)
    }

    /// Returns true if a match in this status may be moved to `next`. Remaining in the same status is always allowed,
    /// except that nothing else is reachable from `FT`.
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (NotStarted, Live) | (NotStarted, Finished) | (Live, HalfTime) | (Live, Finished) | (HalfTime, Live) |
                (HalfTime, Finished)
        )
    }
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MatchStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NS" => Ok(Self::NotStarted),
            "LIVE" => Ok(Self::Live),
            "HT" => Ok(Self::HalfTime),
            "FT" => Ok(Self::Finished),
            s => Err(ConversionError(format!("Invalid match status: {s}"))),
        }
    }
}

//--------------------------------------     LoanStatus       ----------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LoanStatus {
    /// The loan has been requested, but the players have not turned up yet
    #[default]
    Pending,
    /// The players are with the borrowing team
    Active,
    /// The match is over and the players have gone home
    Completed,
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoanStatus::Pending => write!(f, "pending"),
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for LoanStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            s => Err(ConversionError(format!("Invalid loan status: {s}"))),
        }
    }
}

impl From<String> for LoanStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid loan status: {value}. But this conversion cannot fail. Defaulting to pending");
            LoanStatus::Pending
        })
    }
}

//--------------------------------------        Avatars        ---------------------------------------------------------
/// Normalises an avatar URL for storage.
///
/// Inline `data:` URLs are never stored, and neither are blank values. Both mean "no avatar".
pub fn normalize_avatar_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("data:") {
        None
    } else {
        Some(url.to_string())
    }
}

//--------------------------------------         Team         ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    pub captain_name: String,
    pub captain_phone: String,
    pub avatar_url: Option<String>,
    /// The account that registered the team
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn summary(&self) -> TeamSummary {
        TeamSummary { id: self.id, team_name: self.team_name.clone(), avatar_url: self.avatar_url.clone() }
    }
}

/// The slice of a team that is embedded in matches and loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: i64,
    pub team_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub captain_name: String,
    pub captain_phone: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(skip)]
    pub user_id: Option<i64>,
}

impl NewTeam {
    pub fn new<S: Into<String>>(team_name: S, captain_name: S, captain_phone: S) -> Self {
        Self {
            team_name: team_name.into(),
            captain_name: captain_name.into(),
            captain_phone: captain_phone.into(),
            ..Default::default()
        }
    }

    pub fn with_avatar_url<S: Into<String>>(mut self, url: S) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_owner(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Changes to a team. `None` fields are left untouched.
///
/// For `avatar_url`, an empty string or a `data:` URL removes the avatar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamUpdate {
    pub team_name: Option<String>,
    pub captain_name: Option<String>,
    pub captain_phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl TeamUpdate {
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none() &&
            self.captain_name.is_none() &&
            self.captain_phone.is_none() &&
            self.avatar_url.is_none()
    }

    pub fn with_team_name<S: Into<String>>(mut self, name: S) -> Self {
        self.team_name = Some(name.into());
        self
    }

    pub fn with_avatar_url<S: Into<String>>(mut self, url: S) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

//--------------------------------------         Match         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub home_team: TeamSummary,
    pub away_team: TeamSummary,
    pub home_score: i64,
    pub away_score: i64,
    pub status: MatchStatus,
    pub league: String,
    pub country: String,
    pub match_date: NaiveDate,
    pub match_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatch {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub match_date: NaiveDate,
    #[serde(default)]
    pub match_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub league: String,
    #[serde(default)]
    pub country: String,
    #[serde(skip)]
    pub user_id: Option<i64>,
}

impl NewMatch {
    pub fn new(home_team_id: i64, away_team_id: i64, match_date: NaiveDate) -> Self {
        Self {
            home_team_id,
            away_team_id,
            match_date,
            match_time: None,
            location: None,
            league: String::default(),
            country: String::default(),
            user_id: None,
        }
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.match_time = Some(time);
        self
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_league<S: Into<String>>(mut self, league: S, country: S) -> Self {
        self.league = league.into();
        self.country = country.into();
        self
    }

    pub fn with_owner(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Changes to a match. `None` fields are left untouched. An empty `location` or `match_time` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub home_team_id: Option<i64>,
    pub away_team_id: Option<i64>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub status: Option<MatchStatus>,
    pub league: Option<String>,
    pub country: Option<String>,
    pub match_date: Option<NaiveDate>,
    /// `Some(None)` clears the kickoff time. In JSON, `""` and `null` both clear it.
    #[serde(default, deserialize_with = "deserialize_kickoff_change", skip_serializing_if = "Option::is_none")]
    pub match_time: Option<Option<NaiveTime>>,
    pub location: Option<String>,
    /// The write only goes through if the stored status still matches. Set by the match API, never by clients.
    #[serde(skip)]
    pub expected_status: Option<MatchStatus>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.home_team_id.is_none() &&
            self.away_team_id.is_none() &&
            self.home_score.is_none() &&
            self.away_score.is_none() &&
            self.status.is_none() &&
            self.league.is_none() &&
            self.country.is_none() &&
            self.match_date.is_none() &&
            self.match_time.is_none() &&
            self.location.is_none()
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_score(mut self, home: i64, away: i64) -> Self {
        self.home_score = Some(home);
        self.away_score = Some(away);
        self
    }

    /// Moves the kickoff. `None` clears the time.
    pub fn with_kickoff(mut self, time: Option<NaiveTime>) -> Self {
        self.match_time = Some(time);
        self
    }

    pub fn if_status(mut self, status: MatchStatus) -> Self {
        self.expected_status = Some(status);
        self
    }

}

fn deserialize_kickoff_change<'de, D>(deserializer: D) -> Result<Option<Option<NaiveTime>>, D::Error>
where D: Deserializer<'de> {
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Some(None)),
        Some(s) => s.parse::<NaiveTime>().map(|t| Some(Some(t))).map_err(D::Error::custom),
    }
}

//--------------------------------------          Loan         ---------------------------------------------------------
/// The fixture a loan is attached to, as shown alongside the loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFixture {
    pub match_id: i64,
    pub match_date: NaiveDate,
    pub match_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub home_team_name: String,
    pub away_team_name: String,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub team: TeamSummary,
    pub fixture: LoanFixture,
    pub number_of_players: i64,
    pub status: LoanStatus,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    pub team_id: i64,
    pub match_id: i64,
    pub number_of_players: i64,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(skip)]
    pub user_id: Option<i64>,
}

impl NewLoan {
    pub fn new(team_id: i64, match_id: i64, number_of_players: i64) -> Self {
        Self { team_id, match_id, number_of_players, status: LoanStatus::Pending, user_id: None }
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_owner(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanUpdate {
    pub team_id: Option<i64>,
    pub match_id: Option<i64>,
    pub number_of_players: Option<i64>,
    pub status: Option<LoanStatus>,
}

impl LoanUpdate {
    pub fn is_empty(&self) -> bool {
        self.team_id.is_none() && self.match_id.is_none() && self.number_of_players.is_none() && self.status.is_none()
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }
}

//--------------------------------------      UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: i64,
    /// The subject id assigned by the identity provider
    pub provider_id: String,
    pub provider: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub last_login_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile received from the identity provider on login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserAccount {
    pub provider_id: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_provider() -> String {
    "google".to_string()
}

impl NewUserAccount {
    pub fn new<S: Into<String>>(provider_id: S, email: S) -> Self {
        Self { provider_id: provider_id.into(), provider: default_provider(), email: email.into(), ..Default::default() }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Emails are matched case-insensitively, so they are always stored lower-cased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
