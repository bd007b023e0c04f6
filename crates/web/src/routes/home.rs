//! Home page, health probe, and stylesheet.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::{Uri, header},
    response::IntoResponse,
};

use super::UserView;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalUser;

const STYLESHEET: &str = include_str!("../../static/main.css");

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<UserView>,
}

/// Display the home page.
pub async fn home(OptionalUser(user): OptionalUser) -> impl IntoResponse {
    HomeTemplate {
        current_user: user.as_ref().map(UserView::from),
    }
}

/// Fallback for paths no route matches.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the remote API.
pub async fn health() -> &'static str {
    "ok"
}

/// Serve the site stylesheet.
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}
