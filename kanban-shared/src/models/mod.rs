/// Database models for the Kanban backend
///
/// Each model exposes static async methods taking the pool and returning
/// `sqlx::Error`; mapping to domain errors happens one layer up.
///
/// # Models
///
/// - `user`: accounts and public profiles
/// - `board`: boards and invite links
/// - `membership`: user-board relationships with roles
/// - `column`, `card`: board content (placement owned by `ordering`)
/// - `comment`, `checklist`, `attachment`, `assignment`: card content
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
/// use kanban_shared::models::board::{Board, CreateBoard};
/// use kanban_shared::models::user::{CreateUser, User};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "user@example.com".to_string(),
///     name: "Jane".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let board = Board::create(&pool, user.id, CreateBoard {
///     name: "Launch".to_string(),
///     background: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod assignment;
pub mod attachment;
pub mod board;
pub mod card;
pub mod checklist;
pub mod column;
pub mod comment;
pub mod membership;
pub mod user;

/// Deserializes a present field into `Some`, so `null` becomes `Some(None)`
///
/// Used with `#[serde(default)]` on `Option<Option<T>>` patch fields, where a
/// missing field means "leave it" and `null` means "clear it".
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
