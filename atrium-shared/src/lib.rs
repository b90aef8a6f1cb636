//! # Atrium Shared Library
//!
//! This crate contains the data layer and tenant-membership logic shared by
//! the Atrium API server and its tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `db`: Connection pool and migration runner
//! - `identity`: Identity-provider boundary (verified identities, session
//!   tokens, outbound role metadata)
//! - `onboarding`: Invitation resolution at session establishment
//! - `activity`: Append-only activity notification writer

pub mod activity;
pub mod db;
pub mod identity;
pub mod models;
pub mod onboarding;

/// Current version of the Atrium shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
