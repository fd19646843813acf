//! Operator control page.
//!
//! A single static page with four press-and-hold drive buttons and the
//! connection status. It talks to the gateway over `/ws`.

use axum::Router;
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::app_state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// `GET /` — Operator control page.
pub async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// Page routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(index_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn page_has_every_control_and_status() {
        for id in ["forward", "backward", "turn_left", "turn_right"] {
            assert!(INDEX_HTML.contains(&format!("data-direction=\"{id}\"")), "{id}");
        }
        for state in ["connecting", "connected", "closed", "errored"] {
            assert!(INDEX_HTML.contains(&format!("id=\"status-{state}\"")), "{state}");
        }
    }
}
