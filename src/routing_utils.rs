use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::Serialize;

/// Name of the one-shot cookie carrying a flash message
pub const FLASH_COOKIE: &str = "flash";

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug)]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
}

/// Response type which converts any unanticipated error into a 500 with a
/// [BasicErrorResponse] body. The error itself should already have been logged
/// by the handler; the body never echoes internal details to the client.
#[derive(Debug)]
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request".into(),
            }),
        )
            .into_response()
    }
}

/// Queues a user-facing one-shot message and redirects. The next rendered view
/// consumes the message via [take_flash].
pub fn flash_redirect(jar: CookieJar, message: &str, destination: &str) -> (CookieJar, Redirect) {
    let flash = Cookie::build((FLASH_COOKIE, message.to_owned()))
        .path("/")
        .http_only(true)
        .build();

    (jar.add(flash), Redirect::to(destination))
}

/// Removes and returns the pending flash message, if one was queued
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    let jar = if message.is_some() {
        jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build())
    } else {
        jar
    };

    (jar, message)
}
