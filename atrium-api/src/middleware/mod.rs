/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Tenant host routing (subdomain rewrites, auth redirects)
/// - Security headers

pub mod security;
pub mod tenant;
