/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `session`: Session establishment (invitation resolution)
/// - `agencies`: Agency lifecycle and settings
/// - `sub_accounts`: Sub-account management
/// - `users`: Current-user lookup and role changes
/// - `invitations`: Invitation management
/// - `notifications`: Activity feed

pub mod agencies;
pub mod health;
pub mod invitations;
pub mod notifications;
pub mod session;
pub mod sub_accounts;
pub mod users;
