use std::fmt::Debug;

use log::*;

use crate::{
    club_api::errors::ClubApiError,
    db_types::{NewUserAccount, UserAccount},
    traits::UserManagement,
};

/// Records logins from the identity provider.
pub struct UserApi<B> {
    db: B,
}

impl<B> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi")
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates the account on first login, and refreshes the profile on subsequent logins.
    pub async fn login(&self, profile: NewUserAccount) -> Result<UserAccount, ClubApiError> {
        if profile.provider_id.trim().is_empty() {
            return Err(ClubApiError::validation("A provider id is required to log in"));
        }
        let email = profile.normalized_email();
        if email.is_empty() || !email.contains('@') {
            return Err(ClubApiError::validation(format!("'{email}' is not a valid email address")));
        }
        let user = self.db.upsert_user(profile).await?;
        info!("🔐️ {} (#{}) logged in", user.email, user.id);
        Ok(user)
    }

    pub async fn user(&self, id: i64) -> Result<Option<UserAccount>, ClubApiError> {
        Ok(self.db.fetch_user(id).await?)
    }

    pub async fn user_by_provider_id(&self, provider_id: &str) -> Result<Option<UserAccount>, ClubApiError> {
        Ok(self.db.fetch_user_by_provider_id(provider_id).await?)
    }
}
