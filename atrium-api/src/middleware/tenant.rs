/// Tenant host routing
///
/// Multi-tenant requests arrive on subdomains of the platform domain
/// (`acme.app.example.com`) as well as on the bare platform host. This
/// middleware inspects each request's host header and path and decides
/// whether to rewrite the request to a tenant-scoped path, redirect generic
/// auth paths to the tenant sign-in, or pass the request through untouched.
///
/// The decision is a pure function of the request ([`route_request`]); the
/// middleware only applies it. Because rewrites must re-enter routing, the
/// middleware is layered *around* the router (see `main.rs`), not added via
/// `Router::layer`.
///
/// # Rules
///
/// Evaluated in fixed priority order; only the first match applies:
///
/// 1. Host carries a subdomain under the platform domain → rewrite to
///    `/{subdomain}{path}`
/// 2. Path is `/sign-in` or `/sign-up` → redirect to `/agency/sign-in`
/// 3. Bare root (`/` or `/site`) on the platform host → rewrite to `/site`
/// 4. Path already scoped to `/agency` or `/subaccount` → pass-through
///    rewrite preserving path and query
/// 5. Otherwise → no action
///
/// A missing platform-domain configuration degrades rules 1 and 3 to
/// never-match; requests are never failed on account of configuration.

use axum::{
    extract::{Request, State},
    http::{header::HOST, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use crate::app::AppState;

/// Outcome of the routing decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Rewrite the request to the given path (with query attached)
    Rewrite(String),

    /// Redirect the client to the given path
    Redirect(String),

    /// Leave the request untouched
    Pass,
}

/// Decides what to do with a request, given its host, path, and query
///
/// `query` is the raw query string without the leading `?`. It is preserved
/// verbatim in rewrites and reattached with a literal `?` separator; when
/// absent, no separator is emitted.
pub fn route_request(
    host: &str,
    path: &str,
    query: Option<&str>,
    platform_domain: Option<&str>,
) -> RouteAction {
    let path_with_query = match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    };

    let platform_domain = platform_domain.filter(|d| !d.is_empty());

    // 1. Subdomain tenants come first: "acme.app.example.com" → "/acme/..."
    if let Some(domain) = platform_domain {
        if let Some(subdomain) = host
            .strip_suffix(domain)
            .and_then(|prefix| prefix.strip_suffix('.'))
            .filter(|subdomain| !subdomain.is_empty())
        {
            return RouteAction::Rewrite(format!("/{subdomain}{path_with_query}"));
        }
    }

    // 2. Generic auth paths always land on the tenant-scoped sign-in
    if path == "/sign-in" || path == "/sign-up" {
        return RouteAction::Redirect("/agency/sign-in".to_string());
    }

    // 3. The bare platform host serves the public marketing page
    if (path == "/" || path == "/site") && platform_domain == Some(host) {
        return RouteAction::Rewrite("/site".to_string());
    }

    // 4. Already tenant-scoped paths pass through with path and query intact
    if path.starts_with("/agency") || path.starts_with("/subaccount") {
        return RouteAction::Rewrite(path_with_query);
    }

    RouteAction::Pass
}

/// Axum middleware applying [`route_request`] to every request
pub async fn tenant_router_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let action = route_request(
        &host,
        request.uri().path(),
        request.uri().query(),
        state.config.routing.platform_domain.as_deref(),
    );

    match action {
        RouteAction::Rewrite(target) => match target.parse::<Uri>() {
            Ok(uri) => {
                debug!(%host, %uri, "Rewriting request to tenant-scoped path");
                *request.uri_mut() = uri;
                next.run(request).await
            }
            Err(e) => {
                // A rewrite target that doesn't parse is a config/host
                // anomaly; fall through rather than fail the request.
                warn!(%host, target, error = %e, "Ignoring unparsable rewrite target");
                next.run(request).await
            }
        },
        RouteAction::Redirect(target) => Redirect::temporary(&target).into_response(),
        RouteAction::Pass => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: Option<&str> = Some("app.example.com");

    #[test]
    fn test_subdomain_host_rewrites_to_prefixed_path() {
        let action = route_request("acme.app.example.com", "/dashboard", None, DOMAIN);
        assert_eq!(action, RouteAction::Rewrite("/acme/dashboard".to_string()));
    }

    #[test]
    fn test_subdomain_rewrite_preserves_query_verbatim() {
        let action = route_request(
            "acme.app.example.com",
            "/settings",
            Some("tab=billing&page=2"),
            DOMAIN,
        );
        assert_eq!(
            action,
            RouteAction::Rewrite("/acme/settings?tab=billing&page=2".to_string())
        );
    }

    #[test]
    fn test_no_separator_emitted_without_query() {
        let action = route_request("acme.app.example.com", "/settings", None, DOMAIN);
        assert_eq!(action, RouteAction::Rewrite("/acme/settings".to_string()));
        let RouteAction::Rewrite(target) = action else {
            unreachable!()
        };
        assert!(!target.contains('?'));
    }

    #[test]
    fn test_exact_platform_host_is_not_a_subdomain() {
        let action = route_request("app.example.com", "/dashboard", None, DOMAIN);
        assert_eq!(action, RouteAction::Pass);
    }

    #[test]
    fn test_lookalike_host_without_dot_boundary_is_not_a_subdomain() {
        // "badapp.example.com" ends with the domain string but carries no
        // "." boundary, so it must not be treated as tenant "bad".
        let action = route_request("badapp.example.com", "/", None, DOMAIN);
        assert_eq!(action, RouteAction::Pass);
    }

    #[test]
    fn test_sign_in_redirects_regardless_of_query() {
        for query in [None, Some("redirect_url=/agency/123")] {
            let action = route_request("app.example.com", "/sign-in", query, DOMAIN);
            assert_eq!(action, RouteAction::Redirect("/agency/sign-in".to_string()));
        }
    }

    #[test]
    fn test_sign_up_redirects_to_sign_in() {
        let action = route_request("app.example.com", "/sign-up", None, DOMAIN);
        assert_eq!(action, RouteAction::Redirect("/agency/sign-in".to_string()));
    }

    #[test]
    fn test_subdomain_wins_over_auth_redirect() {
        // Rule order: a subdomain host rewrites even for /sign-in
        let action = route_request("acme.app.example.com", "/sign-in", None, DOMAIN);
        assert_eq!(action, RouteAction::Rewrite("/acme/sign-in".to_string()));
    }

    #[test]
    fn test_bare_root_on_platform_host_serves_site() {
        assert_eq!(
            route_request("app.example.com", "/", None, DOMAIN),
            RouteAction::Rewrite("/site".to_string())
        );
        assert_eq!(
            route_request("app.example.com", "/site", None, DOMAIN),
            RouteAction::Rewrite("/site".to_string())
        );
    }

    #[test]
    fn test_root_on_other_host_is_not_rewritten() {
        assert_eq!(
            route_request("other.example.net", "/", None, DOMAIN),
            RouteAction::Pass
        );
    }

    #[test]
    fn test_scoped_paths_pass_through_with_query() {
        assert_eq!(
            route_request("app.example.com", "/agency/123", Some("view=all"), DOMAIN),
            RouteAction::Rewrite("/agency/123?view=all".to_string())
        );
        assert_eq!(
            route_request("app.example.com", "/subaccount/456", None, DOMAIN),
            RouteAction::Rewrite("/subaccount/456".to_string())
        );
    }

    #[test]
    fn test_unrelated_path_passes() {
        assert_eq!(
            route_request("app.example.com", "/health", None, DOMAIN),
            RouteAction::Pass
        );
    }

    #[test]
    fn test_missing_platform_domain_disables_subdomain_and_root_rewrites() {
        // Degrades to always-false instead of failing the request
        assert_eq!(
            route_request("acme.app.example.com", "/dashboard", None, None),
            RouteAction::Pass
        );
        assert_eq!(
            route_request("app.example.com", "/", None, None),
            RouteAction::Pass
        );
        // Auth redirect and scoped pass-through still apply
        assert_eq!(
            route_request("app.example.com", "/sign-in", None, None),
            RouteAction::Redirect("/agency/sign-in".to_string())
        );
        assert_eq!(
            route_request("app.example.com", "/agency/1", None, None),
            RouteAction::Rewrite("/agency/1".to_string())
        );
    }

    #[test]
    fn test_empty_platform_domain_behaves_like_missing() {
        assert_eq!(
            route_request("acme.app.example.com", "/x", None, Some("")),
            RouteAction::Pass
        );
    }

    #[test]
    fn test_empty_query_emits_no_separator() {
        let action = route_request("acme.app.example.com", "/a", Some(""), DOMAIN);
        assert_eq!(action, RouteAction::Rewrite("/acme/a".to_string()));
    }
}
