//! # Atrium API Server Library
//!
//! This library provides the core functionality for the Atrium API server:
//! the server-side backend of a multi-tenant agency dashboard, where
//! agencies manage sub-accounts, users, invitations, and activity
//! notifications.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Tenant host routing and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
