//! Client session state and the inactivity guard.
//!
//! The guard itself is a synchronous state machine driven by two inputs:
//! activity events and periodic checks. Timers live with the caller (see the
//! CLI's guard task), so the machine can be stepped deterministically.
//!
//! Auth state and cookies are held in an explicit [`SessionContext`] with an
//! injected [`CookieStore`]; nothing here touches global state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::DeskError;
use crate::model::Role;

/// Routes on which the guard never runs.
pub const PUBLIC_PATHS: [&str; 3] = ["/login", "/register", "/forgot-password"];
/// Where expired or unauthorized sessions are sent.
pub const LOGIN_PATH: &str = "/login";
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";
pub const USER_ROLE_COOKIE: &str = "user_role";

/// True if `path` is one of the public routes (prefix match).
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

// ============================================================================
// Activity Guard
// ============================================================================

/// User input that counts as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEvent {
    PointerDown,
    PointerMove,
    KeyDown,
    Scroll,
    TouchStart,
}

impl ActivityEvent {
    pub const ALL: [Self; 5] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::KeyDown,
        Self::Scroll,
        Self::TouchStart,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
        }
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityEvent {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pointerdown" | "mousedown" => Ok(Self::PointerDown),
            "pointermove" | "mousemove" => Ok(Self::PointerMove),
            "keydown" => Ok(Self::KeyDown),
            "scroll" => Ok(Self::Scroll),
            "touchstart" => Ok(Self::TouchStart),
            other => Err(DeskError::validation(
                "event",
                format!("unknown activity event '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Active,
    Expired,
    /// Created on a public route; never expires.
    Disabled,
}

/// Emitted once when the inactivity limit is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub idle_for: Duration,
}

/// Inactivity state machine.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    limit: Duration,
    last_activity: Instant,
    state: GuardState,
}

impl SessionGuard {
    #[must_use]
    pub const fn new(limit: Duration, now: Instant) -> Self {
        Self {
            limit,
            last_activity: now,
            state: GuardState::Active,
        }
    }

    /// A guard for `route`, disabled when the route is public.
    #[must_use]
    pub fn for_route(route: &str, limit: Duration, now: Instant) -> Self {
        let mut guard = Self::new(limit, now);
        if is_public_path(route) {
            debug!(route, "Session guard disabled on public route");
            guard.state = GuardState::Disabled;
        }
        guard
    }

    #[must_use]
    pub const fn state(&self) -> GuardState {
        self.state
    }

    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Reset the idle clock. Returns false if the guard no longer listens.
    pub fn record_activity(&mut self, event: ActivityEvent, now: Instant) -> bool {
        if self.state == GuardState::Expired {
            return false;
        }
        // Events can be delivered after a check that used a later instant.
        if now > self.last_activity {
            self.last_activity = now;
        }
        tracing::trace!(%event, "Activity recorded");
        true
    }

    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Time left before expiry; zero once expired.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.state {
            GuardState::Expired => Duration::ZERO,
            _ => self.limit.saturating_sub(self.idle_for(now)),
        }
    }

    /// Periodic check. Returns `Some` exactly once, on the check that first
    /// sees the idle time reach the limit.
    pub fn check(&mut self, now: Instant) -> Option<Expiry> {
        if self.state != GuardState::Active {
            return None;
        }
        let idle_for = self.idle_for(now);
        if idle_for < self.limit {
            return None;
        }
        self.state = GuardState::Expired;
        info!(idle_secs = idle_for.as_secs(), "Session expired after inactivity");
        Some(Expiry { idle_for })
    }
}

// ============================================================================
// Cookies
// ============================================================================

/// A cookie as the route gate and logout see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            expires: None,
        }
    }

    /// An empty cookie that expired at the start of the epoch.
    #[must_use]
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            path: "/".to_string(),
            expires: Some(epoch_expiry()),
        }
    }

    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && self.expires.is_none_or(|expires| expires > now)
    }

    /// Render as a `Set-Cookie` header value.
    #[must_use]
    pub fn header_value(&self) -> String {
        let mut header = format!("{}={}; path={};", self.name, self.value, self.path);
        if let Some(expires) = self.expires {
            header.push_str(&format!(
                " expires={};",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        header
    }
}

fn epoch_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(1, 0).unwrap_or_default()
}

/// Read/write access to the client's cookies.
pub trait CookieStore {
    /// Value of a live, non-empty cookie.
    fn get(&self, name: &str) -> Option<String>;

    fn set(&mut self, cookie: Cookie);

    /// Invalidate a cookie by overwriting it with an already-expired value.
    fn expire(&mut self, name: &str) {
        self.set(Cookie::expired(name));
    }
}

/// In-memory cookie store.
///
/// Liveness is judged against the wall clock unless the jar is pinned to a
/// fixed instant with [`CookieJar::pinned_at`].
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: BTreeMap<String, Cookie>,
    clock: Option<DateTime<Utc>>,
}

impl CookieJar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from `(name, value)` pairs, skipping absent values.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        let mut jar = Self::new();
        for (name, value) in pairs {
            if let Some(value) = value {
                jar.set(Cookie::new(name, value));
            }
        }
        jar
    }

    /// Judge cookie liveness at `now` instead of the wall clock.
    #[must_use]
    pub const fn pinned_at(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    /// Value of `name` if the cookie is live at `now`.
    #[must_use]
    pub fn get_at(&self, name: &str, now: DateTime<Utc>) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|cookie| cookie.is_live_at(now))
            .map(|cookie| cookie.value.clone())
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    /// `Set-Cookie` header values for every cookie, sorted by name.
    #[must_use]
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies.values().map(Cookie::header_value).collect()
    }
}

impl CookieStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.get_at(name, self.clock.unwrap_or_else(Utc::now))
    }

    fn set(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Client-held auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user_id: String,
    pub role: Role,
    pub token: String,
}

/// Result of a forced logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logout {
    pub redirect: &'static str,
}

/// The session a guard protects.
#[derive(Debug, Clone)]
pub struct SessionContext<C: CookieStore> {
    auth: Option<AuthState>,
    cookies: C,
}

impl<C: CookieStore> SessionContext<C> {
    #[must_use]
    pub const fn new(cookies: C) -> Self {
        Self {
            auth: None,
            cookies,
        }
    }

    /// Store auth state and mirror it into the auth and role cookies.
    pub fn login(&mut self, auth: AuthState) {
        self.cookies.set(Cookie::new(AUTH_TOKEN_COOKIE, &auth.token));
        self.cookies
            .set(Cookie::new(USER_ROLE_COOKIE, auth.role.as_str()));
        self.auth = Some(auth);
    }

    #[must_use]
    pub const fn auth(&self) -> Option<&AuthState> {
        self.auth.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    #[must_use]
    pub const fn cookies(&self) -> &C {
        &self.cookies
    }

    pub const fn cookies_mut(&mut self) -> &mut C {
        &mut self.cookies
    }

    #[must_use]
    pub fn into_cookies(self) -> C {
        self.cookies
    }

    /// Clear auth state, invalidate the auth and role cookies and point the
    /// client back at the login page.
    pub fn expire(&mut self) -> Logout {
        self.auth = None;
        self.cookies.expire(AUTH_TOKEN_COOKIE);
        self.cookies.expire(USER_ROLE_COOKIE);
        info!("Session cleared");
        Logout {
            redirect: LOGIN_PATH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: Duration = Duration::from_secs(180);

    #[test]
    fn test_activity_spaced_under_limit_never_expires() {
        let start = Instant::now();
        let mut guard = SessionGuard::new(LIMIT, start);

        for second in 1..=1_000_u64 {
            let now = start + Duration::from_secs(second);
            if second % 179 == 0 {
                guard.record_activity(ActivityEvent::PointerMove, now);
            }
            assert!(guard.check(now).is_none(), "expired at {second}s");
        }
        assert_eq!(guard.state(), GuardState::Active);
    }

    #[test]
    fn test_gap_at_limit_expires_exactly_once() {
        let start = Instant::now();
        let mut guard = SessionGuard::new(LIMIT, start);

        let mut fired = 0;
        for second in 1..=400_u64 {
            if guard.check(start + Duration::from_secs(second)).is_some() {
                fired += 1;
                assert_eq!(second, 180);
            }
        }
        assert_eq!(fired, 1);
        assert_eq!(guard.state(), GuardState::Expired);
    }

    #[test]
    fn test_boundary_activity_just_before_check_wins() {
        let start = Instant::now();
        let mut guard = SessionGuard::new(LIMIT, start);

        let activity = start + LIMIT - Duration::from_millis(1);
        guard.record_activity(ActivityEvent::KeyDown, activity);
        assert!(guard.check(start + LIMIT).is_none());
        assert_eq!(guard.remaining(start + LIMIT), LIMIT - Duration::from_millis(1));
    }

    #[test]
    fn test_out_of_order_activity_does_not_rewind() {
        let start = Instant::now();
        let mut guard = SessionGuard::new(LIMIT, start);
        guard.record_activity(ActivityEvent::Scroll, start + Duration::from_secs(100));
        guard.record_activity(ActivityEvent::Scroll, start + Duration::from_secs(50));
        assert_eq!(
            guard.idle_for(start + Duration::from_secs(110)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_activity_after_expiry_is_ignored() {
        let start = Instant::now();
        let mut guard = SessionGuard::new(LIMIT, start);
        assert!(guard.check(start + LIMIT).is_some());
        assert!(!guard.record_activity(ActivityEvent::TouchStart, start + LIMIT * 2));
        assert!(guard.check(start + LIMIT * 3).is_none());
        assert_eq!(guard.remaining(start + LIMIT), Duration::ZERO);
    }

    #[test]
    fn test_public_routes_disable_guard() {
        let start = Instant::now();
        for route in ["/login", "/register?next=/admin", "/forgot-password/step-2"] {
            let mut guard = SessionGuard::for_route(route, LIMIT, start);
            assert_eq!(guard.state(), GuardState::Disabled);
            assert!(guard.check(start + LIMIT * 10).is_none());
        }
        let guard = SessionGuard::for_route("/moderator/dashboard", LIMIT, start);
        assert_eq!(guard.state(), GuardState::Active);
    }

    #[test]
    fn test_activity_event_parse() {
        assert_eq!(
            "mousedown".parse::<ActivityEvent>().unwrap(),
            ActivityEvent::PointerDown
        );
        assert_eq!(
            "KeyDown".parse::<ActivityEvent>().unwrap(),
            ActivityEvent::KeyDown
        );
        assert!("click".parse::<ActivityEvent>().is_err());
    }

    #[test]
    fn test_expired_cookie_header() {
        let cookie = Cookie::expired(AUTH_TOKEN_COOKIE);
        assert_eq!(
            cookie.header_value(),
            "auth_token=; path=/; expires=Thu, 01 Jan 1970 00:00:01 GMT;"
        );
        assert!(!cookie.is_live_at(Utc::now()));
    }

    #[test]
    fn test_cookie_jar_hides_expired_and_empty() {
        let mut jar = CookieJar::from_pairs([
            (AUTH_TOKEN_COOKIE, Some("abc")),
            (USER_ROLE_COOKIE, Some("")),
            ("other", None),
        ]);
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(jar.get(USER_ROLE_COOKIE), None);
        assert_eq!(jar.get("other"), None);

        jar.expire(AUTH_TOKEN_COOKIE);
        assert_eq!(jar.get(AUTH_TOKEN_COOKIE), None);
        assert!(jar.cookie(AUTH_TOKEN_COOKIE).is_some());
    }

    #[test]
    fn test_cookie_liveness_follows_injected_clock() {
        let noon = DateTime::parse_from_rfc3339("2024-06-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut jar = CookieJar::new();
        jar.set(Cookie {
            expires: Some(noon),
            ..Cookie::new(AUTH_TOKEN_COOKIE, "abc")
        });

        let before = noon - chrono::Duration::seconds(1);
        assert_eq!(jar.get_at(AUTH_TOKEN_COOKIE, before).as_deref(), Some("abc"));
        assert_eq!(jar.get_at(AUTH_TOKEN_COOKIE, noon), None);

        assert_eq!(jar.clone().pinned_at(before).get(AUTH_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(jar.pinned_at(noon).get(AUTH_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_expire_clears_state_and_cookies() {
        let mut ctx = SessionContext::new(CookieJar::new());
        ctx.login(AuthState {
            user_id: "u-1".to_string(),
            role: Role::Moderator,
            token: "tok".to_string(),
        });
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.cookies().get(USER_ROLE_COOKIE).as_deref(), Some("moderator"));

        let logout = ctx.expire();
        assert_eq!(logout.redirect, "/login");
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.cookies().get(AUTH_TOKEN_COOKIE), None);
        assert_eq!(ctx.cookies().get(USER_ROLE_COOKIE), None);
        assert_eq!(
            ctx.cookies().set_cookie_headers(),
            vec![
                "auth_token=; path=/; expires=Thu, 01 Jan 1970 00:00:01 GMT;".to_string(),
                "user_role=; path=/; expires=Thu, 01 Jan 1970 00:00:01 GMT;".to_string(),
            ]
        );
    }
}
