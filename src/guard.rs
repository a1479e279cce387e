//! Route guards.
//!
//! Guards gate navigation on a valid session (and optionally on profile
//! ownership). Navigation itself happens behind the [`Navigator`] trait so
//! the host shell — whatever renders the routes — stays out of this crate.
//! Callers must respect the returned boolean.

use crate::client::Client;
use crate::state::profiles::ProfileKind;

/// Route users are sent to when their session is invalid.
pub const LOGIN_ROUTE: &str = "/auth/login";
/// Route users are sent to when they lack the required profile.
pub const PROFILE_SELECT_ROUTE: &str = "/app/profiles";

/// Route prefixes rendered without the public layout shell.
pub const EXCLUDED_LAYOUT_ROUTES: &[&str] = &["/auth", "/app", "/admin", "/track", "/rate"];

const SESSION_EXPIRED_KEY: &str = "api_responses.auth.global.session_expired";
const ACCESS_DENIED_KEY: &str = "api_responses.auth.global.access_denied";

/// True when `path` is one of the excluded-layout routes or nested under one.
#[must_use]
pub fn is_excluded_layout_route(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    EXCLUDED_LAYOUT_ROUTES
        .iter()
        .any(|excluded| path == *excluded || path.starts_with(&format!("{excluded}/")))
}

/// Navigation seam between the guards and the host shell.
pub trait Navigator: Send + Sync {
    /// The URL (path + query) currently being visited.
    fn current_url(&self) -> String;
    /// Navigate to `to`.
    fn navigate(&self, to: &str);
}

/// Gate a route on a valid session.
///
/// On failure the attempted URL is saved for post-login redirect, a
/// localized session-expired notification is emitted, and navigation goes
/// to `redirect_to`. Returns whether access is allowed.
pub async fn guard_route_to(client: &Client, nav: &dyn Navigator, redirect_to: &str) -> bool {
    if client.check_auth().await {
        return true;
    }

    client.save_fallback_url(&nav.current_url());
    let message = client.i18n.t(SESSION_EXPIRED_KEY).await;
    client.notifications.error(message).await;
    nav.navigate(redirect_to);
    false
}

/// [`guard_route_to`] with the login route as the redirect target.
pub async fn guard_route(client: &Client, nav: &dyn Navigator) -> bool {
    guard_route_to(client, nav, LOGIN_ROUTE).await
}

/// Gate a route on a valid session **and** ownership of a `kind` profile.
///
/// Profile denial emits a localized access-denied notification and sends
/// the user to the profile-selection page.
pub async fn guard_profile(client: &Client, nav: &dyn Navigator, kind: ProfileKind) -> bool {
    if !guard_route(client, nav).await {
        return false;
    }

    match client.ensure_profile(kind).await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(%kind, error = %e, "profile guard denied");
            let message = client
                .i18n
                .t_with(ACCESS_DENIED_KEY, &[("profile", &kind.to_string())])
                .await;
            client.notifications.error(message).await;
            nav.navigate(PROFILE_SELECT_ROUTE);
            false
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
