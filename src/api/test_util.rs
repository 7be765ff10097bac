use crate::routing_utils::FLASH_COOKIE;
use axum::http::header;
use axum::response::Response;
use axum_extra::extract::cookie::Cookie;

/// Reads the Location header off a redirect response
pub fn location_of(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("the response should be a redirect")
        .to_str()
        .expect("the location header should be valid text")
        .to_owned()
}

/// Pulls the flash message out of a response's Set-Cookie headers, if the
/// response queued one
pub fn flash_message_of(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|header_value| {
            let raw_cookie = header_value.to_str().ok()?;
            let parsed = Cookie::parse_encoded(raw_cookie.to_owned()).ok()?;
            if parsed.name() == FLASH_COOKIE && !parsed.value().is_empty() {
                Some(parsed.value().to_owned())
            } else {
                None
            }
        })
        .next()
}
