//! Authentication route handlers.
//!
//! Login and registration forms are validated locally before anything is
//! sent to the remote API. Failures re-render the form with status 400 and
//! keep the non-secret fields. The session cookie itself is written by the
//! route guard from the gateway's token store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};

use talent_hub_core::Email;

use super::UserView;
use crate::auth::{Navigation, Registration};
use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::filters;
use crate::middleware::{Auth, RedirectIfLoggedIn};

const MISSING_CREDENTIALS: &str = "Email and password are required";
const MISSING_FIELDS: &str = "All required fields must be filled";
const PASSWORD_MISMATCH: &str = "Passwords do not match";
const INVALID_EMAIL: &str = "Please enter a valid email address";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegisterForm {
    /// Check the form and build the registration payload.
    fn validate(&self) -> Result<Registration, &'static str> {
        if self.email.trim().is_empty() || self.password.is_empty() || self.confirm_password.is_empty()
        {
            return Err(MISSING_FIELDS);
        }
        if self.password != self.confirm_password {
            return Err(PASSWORD_MISMATCH);
        }
        let email = Email::parse(&self.email).map_err(|_| INVALID_EMAIL)?;

        Ok(Registration {
            username: email.to_string(),
            email: email.to_string(),
            password: SecretString::from(self.password.clone()),
            first_name: non_empty(&self.first_name),
            last_name: non_empty(&self.last_name),
            phone_no: non_empty(&self.phone),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<UserView>,
    pub error: Option<String>,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<UserView>,
    pub error: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegisterTemplate {
    fn refill(form: &RegisterForm, error: String) -> Self {
        Self {
            current_user: None,
            error: Some(error),
            email: form.email.trim().to_string(),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            phone: form.phone.clone(),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(_guard: RedirectIfLoggedIn) -> impl IntoResponse {
    LoginTemplate {
        current_user: None,
        error: None,
        email: String::new(),
    }
}

/// Handle login form submission.
pub async fn login(Auth(gateway): Auth, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return login_failed(email, MISSING_CREDENTIALS.to_string());
    }

    let password = SecretString::from(form.password);
    match gateway.login(&email, &password).await {
        Ok(user) => {
            info!(username = %user.username, "User logged in");
            add_breadcrumb("auth", "Logged in");
            Navigation::to_home().into_response()
        }
        Err(e) => {
            warn!(error = %e, status = ?e.status(), "Login failed");
            login_failed(email, e.user_message("Login failed"))
        }
    }
}

fn login_failed(email: String, error: String) -> Response {
    let page = LoginTemplate {
        current_user: None,
        error: Some(error),
        email,
    };
    (StatusCode::BAD_REQUEST, page).into_response()
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(_guard: RedirectIfLoggedIn) -> impl IntoResponse {
    RegisterTemplate {
        current_user: None,
        error: None,
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        phone: String::new(),
    }
}

/// Handle registration form submission.
pub async fn register(Auth(gateway): Auth, Form(form): Form<RegisterForm>) -> Response {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(message) => {
            let page = RegisterTemplate::refill(&form, message.to_string());
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
    };

    match gateway.register(&registration).await {
        Ok(user) => {
            info!(username = %user.username, "User registered");
            add_breadcrumb("auth", "Registered");
            Navigation::to_home().into_response()
        }
        Err(e) => {
            warn!(error = %e, status = ?e.status(), "Registration failed");
            let page = RegisterTemplate::refill(&form, e.user_message("Registration failed"));
            (StatusCode::BAD_REQUEST, page).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
pub async fn logout(Auth(gateway): Auth) -> Response {
    let navigation = gateway.logout().await;
    clear_sentry_user();
    add_breadcrumb("auth", "Logged out");
    navigation.into_response()
}
