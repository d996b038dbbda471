//! Landing page
//!
//! Static placeholder until the dashboard exists.

use axum::response::Html;
use axum::{routing::get, Router};

const LANDING_PAGE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>EventFlow</title>
    <style>
      body { margin: 0; min-height: 100vh; display: flex; flex-direction: column;
             align-items: center; justify-content: center; padding: 2rem;
             background: #fafafa; font-family: system-ui, sans-serif; }
      h1 { font-size: 1.875rem; font-weight: 600; color: #18181b; margin: 0; }
      p { margin-top: 0.5rem; color: #52525b; }
    </style>
  </head>
  <body>
    <h1>EventFlow</h1>
    <p>Event ingestion and management platform. Dashboard coming soon.</p>
  </body>
</html>
"#;

/// GET /
async fn home() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(home))
}
