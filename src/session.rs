use crate::config::AppConfig;
use crate::domain::user::driven_ports::UserReader;
use crate::external_connections::ExternalConnectivity;
use crate::{AppState, persistence};
use anyhow::Context;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{error, warn};

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "session";

/// The payload signed into a session token. `sub` is the user's id; the
/// timestamps are seconds since the Unix epoch.
#[derive(Serialize, Deserialize)]
struct SessionClaims {
    sub: i32,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Error)]
#[error("the session token was missing, expired, or had a bad signature")]
pub struct SessionVerifyError(#[from] jsonwebtoken::errors::Error);

/// Mints and checks the signed tokens which stand in for server-side session
/// state. Tokens are HMAC-signed, so anyone can read the user id inside one
/// but only the server can produce a token that verifies.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(config: &AppConfig) -> SessionSigner {
        SessionSigner {
            encoding_key: EncodingKey::from_secret(config.session_signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_signing_key.as_bytes()),
            ttl: config.session_ttl,
        }
    }

    /// Issues a fresh session token for the given user
    pub fn issue(&self, user_id: i32) -> Result<String, anyhow::Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is set before the Unix epoch")?
            .as_secs();
        let claims = SessionClaims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .context("signing a session token")
    }

    /// Verifies a session token, producing the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<i32, SessionVerifyError> {
        let token_data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims.sub)
    }
}

/// The authenticated user attached to a request once it passes [require_login]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

/// Resolves a session cookie value into the user it belongs to. The user row
/// is re-read on every request so a deleted account locks out immediately,
/// outstanding tokens or not. Any failure along the way resolves to None.
pub async fn resolve_session(
    token: Option<&str>,
    signer: &SessionSigner,
    ext_cxn: &mut impl ExternalConnectivity,
    user_read: &impl UserReader,
) -> Option<CurrentUser> {
    let token = token?;
    let user_id = match signer.verify(token) {
        Ok(user_id) => user_id,
        Err(verify_err) => {
            warn!("Rejected a session token: {verify_err}");
            return None;
        }
    };

    let user_lookup = user_read.get_by_id(user_id, &mut *ext_cxn).await;
    match user_lookup {
        Ok(Some(user)) => Some(CurrentUser {
            id: user.id,
            username: user.username,
        }),
        Ok(None) => None,
        Err(port_err) => {
            error!("Could not load the user behind a session: {port_err}");
            None
        }
    }
}

/// Middleware gating the authenticated portion of the site. A request with a
/// valid session proceeds with [CurrentUser] in its extensions; anything else
/// is bounced to the login page.
pub async fn require_login(
    State(shared): AppState,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut ext_cxn = shared.ext_cxn.clone();
    let user_read = persistence::db_user_driven_ports::DbReadUsers {};
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());

    match resolve_session(token, &shared.sessions, &mut ext_cxn, &user_read).await {
        Some(current_user) => {
            request.extensions_mut().insert(current_user);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Builds the cookie which carries a freshly issued session token
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// Builds the cookie removal marker for logging out
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
