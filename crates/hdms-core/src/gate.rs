//! Server-side route gate.
//!
//! Decides whether a request path may proceed given the auth token and role
//! cookies. Purely functional: cookies come in through [`CookieStore`].

use serde::Serialize;
use tracing::debug;

use crate::model::Role;
use crate::session::{AUTH_TOKEN_COOKIE, CookieStore, LOGIN_PATH, USER_ROLE_COOKIE, is_public_path};

/// Paths that bypass the gate entirely (prefix match).
pub const ALLOW_LIST: [&str; 7] = [
    "/login",
    "/register",
    "/forgot-password",
    "/favicon.ico",
    "/_next",
    "/static",
    "/api/auth",
];

/// Outcome of gating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum GateDecision {
    Allow,
    Redirect { location: String },
}

impl GateDecision {
    fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
        }
    }

    #[must_use]
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Stateless request gate.
pub struct RouteGate;

impl RouteGate {
    /// Gate `path` using the cookies in `cookies`.
    #[must_use]
    pub fn decide(path: &str, cookies: &impl CookieStore) -> GateDecision {
        let token = cookies.get(AUTH_TOKEN_COOKIE);
        let role = cookies.get(USER_ROLE_COOKIE);
        Self::decide_with(path, token.as_deref(), role.as_deref())
    }

    /// Gate `path` given raw cookie values.
    #[must_use]
    pub fn decide_with(path: &str, token: Option<&str>, role: Option<&str>) -> GateDecision {
        let path = strip_query(path);

        if is_public_path(path) || ALLOW_LIST.iter().any(|prefix| path.starts_with(prefix)) {
            return GateDecision::Allow;
        }

        if token.is_none_or(|t| t.trim().is_empty()) {
            debug!(path, "No auth token, redirecting to login");
            return GateDecision::redirect(LOGIN_PATH);
        }

        let role = role.map(str::trim).filter(|r| !r.is_empty());

        if path == "/" {
            return match role {
                Some(role) => {
                    GateDecision::redirect(format!("/{}/dashboard", role.to_lowercase()))
                }
                None => GateDecision::Allow,
            };
        }

        // Role areas match by prefix, so "/administrator" is still admin-scoped.
        let Some(area) = Role::ALL
            .into_iter()
            .find(|area| path.starts_with(&format!("/{}", area.as_str())))
        else {
            return GateDecision::Allow;
        };

        let role = role.map(str::to_lowercase);
        if role.as_deref() == Some(area.as_str()) {
            GateDecision::Allow
        } else {
            debug!(path, ?role, "Role does not match route area, redirecting to login");
            GateDecision::redirect(LOGIN_PATH)
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CookieJar;

    fn login() -> GateDecision {
        GateDecision::redirect("/login")
    }

    #[test]
    fn test_allow_list_bypasses_auth() {
        for path in [
            "/login",
            "/register",
            "/forgot-password",
            "/favicon.ico",
            "/_next/static/chunk.js",
            "/static/logo.svg",
            "/api/auth/login",
        ] {
            assert_eq!(RouteGate::decide_with(path, None, None), GateDecision::Allow, "{path}");
        }
    }

    #[test]
    fn test_other_api_routes_need_auth() {
        assert_eq!(RouteGate::decide_with("/api/tickets", None, None), login());
    }

    #[test]
    fn test_missing_or_empty_token_redirects() {
        assert_eq!(RouteGate::decide_with("/admin/dashboard", None, Some("admin")), login());
        assert_eq!(RouteGate::decide_with("/admin/dashboard", Some(""), Some("admin")), login());
        assert_eq!(RouteGate::decide_with("/", None, None), login());
    }

    #[test]
    fn test_role_mismatch_redirects() {
        assert_eq!(
            RouteGate::decide_with("/admin/users", Some("tok"), Some("requestor")),
            login()
        );
        assert_eq!(RouteGate::decide_with("/moderator", Some("tok"), None), login());
    }

    #[test]
    fn test_matching_role_allowed() {
        assert_eq!(
            RouteGate::decide_with("/moderator/tickets?page=2", Some("tok"), Some("Moderator")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_role_areas_match_by_prefix() {
        for path in ["/administrator", "/admin-panel/users", "/moderators"] {
            assert_eq!(RouteGate::decide_with(path, Some("tok"), Some("requestor")), login(), "{path}");
        }
        assert_eq!(
            RouteGate::decide_with("/administrator", Some("tok"), Some("ADMIN")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_unscoped_paths_allowed_for_any_role() {
        assert_eq!(
            RouteGate::decide_with("/profile", Some("tok"), Some("requestor")),
            GateDecision::Allow
        );
    }

    #[test]
    fn test_root_redirects_to_role_dashboard() {
        assert_eq!(
            RouteGate::decide_with("/", Some("tok"), Some("assignee")),
            GateDecision::redirect("/assignee/dashboard")
        );
        assert_eq!(RouteGate::decide_with("/", Some("tok"), None), GateDecision::Allow);
    }

    #[test]
    fn test_decide_reads_cookie_store() {
        let jar = CookieJar::from_pairs([
            (AUTH_TOKEN_COOKIE, Some("tok")),
            (USER_ROLE_COOKIE, Some("admin")),
        ]);
        assert!(RouteGate::decide("/admin/dashboard", &jar).is_allow());
        assert_eq!(RouteGate::decide("/assignee/dashboard", &jar), login());
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let json = serde_json::to_value(login()).unwrap();
        assert_eq!(json["decision"], "redirect");
        assert_eq!(json["location"], "/login");
        let json = serde_json::to_value(GateDecision::Allow).unwrap();
        assert_eq!(json["decision"], "allow");
    }
}
