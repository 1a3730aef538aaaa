//! Session store: the four auth cookies and their expiry policy.
//!
//! ARCHITECTURE
//! ============
//! There is no server-side session table. The session lives entirely in
//! client cookies: it is read from the request jar on entry and written back
//! through the response jar on exit, so handlers stay stateless.
//!
//! TRADE-OFFS
//! ==========
//! `refresh_token` outlives the other cookies by the refresh grace window.
//! That leaves a stretch where only the refresh token is present, which is
//! exactly the stale state the route guard repairs with one refresh call.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::config::CookiePolicy;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const USERNAME: &str = "username";
pub const TOKEN_TYPE: &str = "token_type";

/// Every cookie name owned by the session store.
pub const SESSION_COOKIES: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, USERNAME, TOKEN_TYPE];

/// Authenticated state cached in client cookies. Empty strings mean absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No refresh token. An access token on its own still lands here.
    Anonymous,
    /// Refresh token present, access token gone.
    Stale,
    /// Both tokens present.
    Authenticated,
}

impl Session {
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        match (self.access_token.is_empty(), self.refresh_token.is_empty()) {
            (false, false) => AuthState::Authenticated,
            (true, false) => AuthState::Stale,
            _ => AuthState::Anonymous,
        }
    }

    fn fields(&self) -> [(&'static str, &str); 4] {
        [
            (ACCESS_TOKEN, &self.access_token),
            (REFRESH_TOKEN, &self.refresh_token),
            (USERNAME, &self.username),
            (TOKEN_TYPE, &self.token_type),
        ]
    }
}

/// Read whatever subset of the session is present. Never fails.
#[must_use]
pub fn read(jar: &CookieJar) -> Session {
    let value = |name: &str| jar.get(name).map(|c| c.value().to_owned()).unwrap_or_default();
    Session {
        access_token: value(ACCESS_TOKEN),
        refresh_token: value(REFRESH_TOKEN),
        username: value(USERNAME),
        token_type: value(TOKEN_TYPE),
    }
}

/// Write one cookie per non-empty session field.
#[must_use]
pub fn write(jar: CookieJar, session: &Session, policy: &CookiePolicy) -> CookieJar {
    session
        .fields()
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(jar, |jar, (name, value)| {
            jar.add(session_cookie(name, value, max_age_for(name, policy), policy.secure))
        })
}

/// Replace only the access token, as done after a successful refresh.
#[must_use]
pub fn write_access_token(jar: CookieJar, access_token: &str, policy: &CookiePolicy) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN, access_token, policy.ttl, policy.secure))
}

/// Expire all four session cookies. Idempotent: absent cookies still get a
/// removal cookie, which the browser ignores.
#[must_use]
pub fn clear(jar: CookieJar, policy: &CookiePolicy) -> CookieJar {
    SESSION_COOKIES
        .into_iter()
        .fold(jar, |jar, name| jar.add(removal_cookie(name, policy.secure)))
}

fn max_age_for(name: &str, policy: &CookiePolicy) -> Duration {
    if name == REFRESH_TOKEN {
        policy.ttl.saturating_add(policy.refresh_grace)
    } else {
        policy.ttl
    }
}

pub(crate) fn session_cookie(name: &'static str, value: &str, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

pub(crate) fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
