//! Plain HTTP handlers: the page itself and a health check.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Serves the voice page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "ok"
}
