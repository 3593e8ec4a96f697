use crate::{
    db_types::{NewUserAccount, UserAccount},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Records a login. New users are created. For known users (matched on `provider_id`), the name, image and
    /// `last_login_at` fields are refreshed; the email is left as it was first recorded.
    async fn upsert_user(&self, user: NewUserAccount) -> Result<UserAccount, StoreError>;

    async fn fetch_user(&self, id: i64) -> Result<Option<UserAccount>, StoreError>;

    async fn fetch_user_by_provider_id(&self, provider_id: &str) -> Result<Option<UserAccount>, StoreError>;
}
