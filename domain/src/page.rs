//! HTML rendering for the single page this service serves.
//!
//! Deliberately template-free: the page is one heading, so a `format!` call
//! keeps the output byte-stable and easy to assert on.

/// Render the visit-count page.
///
/// The heading text is `Your number is: <count>`; the decimal count is
/// bounded by the label's trailing space and the closing tag, so no other
/// digits sit adjacent to it.
pub fn render_count(count: u64) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Your number</title></head>\n<body>\n<h1>Your number is: {count}</h1>\n</body>\n</html>\n"
    )
}

/// Render the page returned alongside a 500 when the store fails. The error
/// detail stays in the logs, not in the response body.
pub fn error_page() -> String {
    "<!DOCTYPE html>\n<html>\n<head><title>Error</title></head>\n<body>\n<h1>Something went wrong</h1>\n</body>\n</html>\n".to_string()
}
