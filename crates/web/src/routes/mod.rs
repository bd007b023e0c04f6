//! HTTP route handlers for the front-end.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness probe
//! GET  /static/main.css           - Stylesheet
//!
//! # Auth (auth-only: logged-in visitors are sent to /)
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # Account (protected)
//! GET  /dashboard                 - Dashboard
//! GET  /profile                   - Profile
//! GET  /my-profile                - Profile
//!
//! # Professionals
//! GET  /professionals             - Listing
//! GET  /professionals/{username}  - Profile with reviews
//! GET  /professionals/me          - Own profile (protected)
//! GET  /professionals/my-hires    - Own hires (protected)
//! GET  /jobs                      - Own hires (protected)
//! ```

pub mod account;
pub mod auth;
pub mod home;
pub mod professionals;

use axum::{
    Router,
    routing::{get, post},
};

use talent_hub_core::User;

use crate::state::AppState;

/// User display data for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub username: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub profile_pic_url: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            name: user.display_name(),
            email: user.email.clone().unwrap_or_default(),
            phone: user.phone_no.clone().unwrap_or_default(),
            profile_pic_url: user.profile_pic_url.clone(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the professional routes router.
pub fn professional_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(professionals::index))
        .route("/me", get(professionals::me))
        .route("/my-hires", get(professionals::my_hires))
        .route("/{username}", get(professionals::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(account::dashboard))
        .route("/profile", get(account::profile))
        .route("/my-profile", get(account::my_profile))
        .route("/jobs", get(professionals::my_hires))
}

/// Routes that never touch the session: probes and assets.
pub fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(home::health))
        .route("/static/main.css", get(home::stylesheet))
}

/// Create all page routes. These run behind the route guard.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes())
        .nest("/professionals", professional_routes())
        .merge(account_routes())
        .fallback(home::not_found)
}
