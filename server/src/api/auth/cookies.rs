//! Session and OAuth state cookies

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use kush_observer::Session;

use crate::core::constants::{
    ACCESS_COOKIE_NAME, ID_COOKIE_NAME, OAUTH_STATE_COOKIE_NAME, OAUTH_STATE_TTL_SECS,
    REFRESH_COOKIE_NAME, REFRESH_COOKIE_TTL_DAYS,
};

const SESSION_COOKIES: [&str; 3] = [ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, ID_COOKIE_NAME];

/// Issues and clears the gateway's cookies
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Write the token triple into the jar.
    ///
    /// All three cookies live as long as the refresh token, so an expired
    /// access token still reaches the middleware and can be refreshed once.
    pub fn issue(&self, jar: CookieJar, session: &Session) -> CookieJar {
        let max_age = time::Duration::days(REFRESH_COOKIE_TTL_DAYS);
        jar.add(self.build(ACCESS_COOKIE_NAME, session.access_token.clone(), max_age))
            .add(self.build(REFRESH_COOKIE_NAME, session.refresh_token.clone(), max_age))
            .add(self.build(ID_COOKIE_NAME, session.id_token.clone(), max_age))
    }

    /// Remove all session cookies
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        SESSION_COOKIES.iter().fold(jar, |jar, name| {
            jar.remove(self.build(*name, String::new(), time::Duration::ZERO))
        })
    }

    /// Store the signed OAuth state for the login round trip
    pub fn issue_state(&self, jar: CookieJar, state: String) -> CookieJar {
        jar.add(self.build(
            OAUTH_STATE_COOKIE_NAME,
            state,
            time::Duration::seconds(OAUTH_STATE_TTL_SECS),
        ))
    }

    pub fn clear_state(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.build(OAUTH_STATE_COOKIE_NAME, String::new(), time::Duration::ZERO))
    }

    fn build(&self, name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }
}
