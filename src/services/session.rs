use crate::errors::ServiceError;
use crate::types::internal::{Claims, SessionUser};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use poem::web::cookie::{Cookie, CookieJar, SameSite};
use std::fmt;
use std::time::Duration;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session-token";

const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Issues and validates signed session tokens and builds the cookies that
/// carry them.
pub struct SessionService {
    secret: String,
    cookie_secure: bool,
}

impl SessionService {
    pub fn new(secret: String, cookie_secure: bool) -> Self {
        Self {
            secret,
            cookie_secure,
        }
    }

    /// Sign the session claims into a token with a 24-hour expiry.
    pub fn issue_token(&self, user: &SessionUser) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department.clone(),
            iat: now,
            exp: now + SESSION_TTL_SECONDS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Hash(format!("failed to sign session token: {e}")))
    }

    /// Validate a token and recover the session it carries. Fails closed:
    /// malformed, expired, mis-signed and unknown-role tokens all come back
    /// as "no session" rather than as an error.
    pub fn verify_token(&self, token: &str) -> Option<SessionUser> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                None
            }
        }
    }

    /// Read and verify the session cookie from a request's jar.
    pub fn session_from(&self, jar: &CookieJar) -> Option<SessionUser> {
        let cookie = jar.get(SESSION_COOKIE)?;
        self.verify_token(cookie.value_str())
    }

    /// HTTP-only, SameSite=Lax session cookie holding a signed token.
    pub fn session_cookie(&self, token: String) -> Cookie {
        let mut cookie = Cookie::new_with_str(SESSION_COOKIE, token);
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_secure(self.cookie_secure);
        cookie.set_max_age(Duration::from_secs(SESSION_TTL_SECONDS as u64));
        cookie
    }

    /// Empty, immediately-expired replacement cookie used on logout.
    pub fn logout_cookie(&self) -> Cookie {
        let mut cookie = Cookie::new_with_str(SESSION_COOKIE, "");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_secure(self.cookie_secure);
        cookie.set_max_age(Duration::ZERO);
        cookie
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("secret", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}
