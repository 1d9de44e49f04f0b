//! Origin allow-list matching.
//!
//! The referer only has to start with an allowed origin; the first matching
//! entry is echoed back in `Access-Control-Allow-Origin`.

/// Return the first allow-listed origin that prefixes `referer`.
pub fn match_origin<'a>(referer: &str, allowed_origins: &'a [String]) -> Option<&'a str> {
    if referer.is_empty() {
        return None;
    }

    allowed_origins
        .iter()
        .map(String::as_str)
        .find(|origin| !origin.is_empty() && referer.starts_with(origin))
}
