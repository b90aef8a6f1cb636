/// Database models for Atrium
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `agency`: Top-level tenant owning sub-accounts and users
/// - `sub_account`: Child tenant unit under an agency
/// - `user`: Identity-provider-linked user accounts and roles
/// - `invitation`: Pending, single-use membership grants
/// - `notification`: Append-only activity log entries
///
/// # Example
///
/// ```no_run
/// use atrium_shared::models::user::{CreateUser, Role, User};
/// use atrium_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     identity_id: "idp_2f9a".to_string(),
///     email: "user@example.com".to_string(),
///     name: "John Doe".to_string(),
///     avatar_url: None,
///     role: Role::SubaccountUser,
///     agency_id: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod agency;
pub mod invitation;
pub mod notification;
pub mod sub_account;
pub mod user;
