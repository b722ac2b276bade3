use axum::http::{header, HeaderMap};

/// Cookie carrying the id of the signed-in user.
pub const USER_ID_COOKIE: &str = "uid";

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn extract_cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}
