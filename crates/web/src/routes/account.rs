//! Account route handlers.
//!
//! These routes are protected; the route guard has already resolved the user.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use super::UserView;
use crate::filters;
use crate::middleware::{RequireLoggedIn, RequireUser};

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<UserView>,
    pub user: UserView,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<UserView>,
    pub user: UserView,
}

/// Display the dashboard.
pub async fn dashboard(RequireUser(user): RequireUser) -> impl IntoResponse {
    let user = UserView::from(&user);
    DashboardTemplate {
        current_user: Some(user.clone()),
        user,
    }
}

/// Display the profile page.
pub async fn profile(RequireUser(user): RequireUser) -> impl IntoResponse {
    profile_page(&user)
}

/// Display the profile page behind the page-level login check.
pub async fn my_profile(_guard: RequireLoggedIn, RequireUser(user): RequireUser) -> impl IntoResponse {
    profile_page(&user)
}

fn profile_page(user: &talent_hub_core::User) -> ProfileTemplate {
    let user = UserView::from(user);
    ProfileTemplate {
        current_user: Some(user.clone()),
        user,
    }
}
