use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewUserAccount, UserAccount};

/// Inserts the user, or refreshes the profile fields of an existing user with the same provider id.
///
/// The email address is only written on first login.
pub async fn upsert_user(user: NewUserAccount, conn: &mut SqliteConnection) -> Result<UserAccount, sqlx::Error> {
    let email = user.normalized_email();
    let account: UserAccount = sqlx::query_as(
        r#"
            INSERT INTO users (provider_id, provider, email, name, image, last_login_at)
            VALUES ($1, $2, $3, $4, $5, CURRENT_TIMESTAMP)
            ON CONFLICT (provider_id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image,
                last_login_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(user.provider_id)
    .bind(user.provider)
    .bind(email)
    .bind(user.name)
    .bind(user.image)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ User #{} ({}) logged in", account.id, account.email);
    Ok(account)
}

pub async fn fetch_user(id: i64, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_provider_id(
    provider_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, sqlx::Error> {
    let user =
        sqlx::query_as("SELECT * FROM users WHERE provider_id = $1").bind(provider_id).fetch_optional(conn).await?;
    Ok(user)
}
