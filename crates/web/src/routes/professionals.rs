//! Professional listing, profile, and hire pages.
//!
//! Data comes from the remote API through [`ListingClient`]. A profile that
//! does not exist sends the visitor home; any other upstream failure renders
//! the page with the error message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::warn;

use talent_hub_core::{HireSummary, Professional, ProfessionalProfile, Review, User};

use super::UserView;
use crate::api::{ApiError, HttpTransport, ListingClient};
use crate::auth::{HOME_PATH, LOGIN_PATH, Navigation};
use crate::filters;
use crate::middleware::{Auth, OptionalUser, RequestId, RequireLoggedIn, RequireUser};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Professional display data for templates.
#[derive(Debug, Clone)]
pub struct ProfessionalCard {
    pub username: String,
    pub name: String,
    pub title: String,
    pub skill: String,
    pub location: String,
    pub rate: String,
    pub experience: u32,
    pub is_available: bool,
}

impl From<&Professional> for ProfessionalCard {
    fn from(p: &Professional) -> Self {
        Self {
            username: p.username.clone().unwrap_or_default(),
            name: p
                .name
                .clone()
                .or_else(|| p.username.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            title: p.title.clone(),
            skill: p.skill.clone().unwrap_or_else(|| "Unknown".to_string()),
            location: p.location.clone(),
            rate: p.hourly_rate.to_string(),
            experience: p.experience,
            is_available: p.is_available,
        }
    }
}

/// Full profile display data.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub card: ProfessionalCard,
    pub cover_letter: String,
    pub email: String,
    pub profile_pic_url: Option<String>,
}

impl From<&ProfessionalProfile> for ProfileView {
    fn from(profile: &ProfessionalProfile) -> Self {
        let mut card = ProfessionalCard::from(&profile.professional);
        if let Some(user) = &profile.user {
            card.username.clone_from(&user.username);
            card.name = user.display_name();
        }
        if let Some(skill) = &profile.skill {
            card.skill.clone_from(&skill.name);
        }

        Self {
            card,
            cover_letter: profile.professional.cover_letter.clone().unwrap_or_default(),
            email: profile
                .user
                .as_ref()
                .and_then(|u| u.email.clone())
                .unwrap_or_default(),
            profile_pic_url: profile.user.as_ref().and_then(|u| u.profile_pic_url.clone()),
        }
    }
}

/// Review display data.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub stars: u8,
    pub text: String,
    pub date: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            stars: review.stars(),
            text: review.review.clone().unwrap_or_default(),
            date: review
                .created_at
                .map(|d| d.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Hire display data.
#[derive(Debug, Clone)]
pub struct HireView {
    pub professional_username: String,
    pub title: String,
    pub skill: String,
    pub location: String,
    pub status: String,
    pub is_open: bool,
    pub hours: u32,
    pub amount: String,
    pub start: String,
}

impl From<&HireSummary> for HireView {
    fn from(summary: &HireSummary) -> Self {
        Self {
            professional_username: summary.professional_username.clone(),
            title: summary.professional_title.clone(),
            skill: summary.skill_name.clone(),
            location: summary.professional_location.clone(),
            status: summary.hire.status.label().to_string(),
            is_open: summary.hire.status.is_open(),
            hours: summary.hire.total_hours,
            amount: summary.hire.total_amount.to_string(),
            start: summary
                .hire
                .start_date
                .map(|d| d.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Professional listing template.
#[derive(Template, WebTemplate)]
#[template(path = "professionals/index.html")]
pub struct IndexTemplate {
    pub current_user: Option<UserView>,
    pub professionals: Vec<ProfessionalCard>,
    pub error: Option<String>,
}

/// Professional profile template.
#[derive(Template, WebTemplate)]
#[template(path = "professionals/show.html")]
pub struct ShowTemplate {
    pub current_user: Option<UserView>,
    pub profile: Option<ProfileView>,
    pub reviews: Vec<ReviewView>,
    pub is_own_profile: bool,
    pub error: Option<String>,
}

/// Hires template.
#[derive(Template, WebTemplate)]
#[template(path = "professionals/hires.html")]
pub struct HiresTemplate {
    pub current_user: Option<UserView>,
    pub hires: Vec<HireView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

fn listings(state: &AppState, request_id: &RequestId) -> ListingClient<HttpTransport> {
    state.listings(Some(request_id.as_str()))
}

/// Display all professionals.
pub async fn index(
    State(state): State<AppState>,
    request_id: RequestId,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    let (professionals, error) = match listings(&state, &request_id).professionals().await {
        Ok(list) => (list.iter().map(ProfessionalCard::from).collect(), None),
        Err(e) => {
            warn!(error = %e, "Failed to fetch professionals");
            (Vec::new(), Some(e.user_message("Failed to fetch professionals")))
        }
    };

    IndexTemplate {
        current_user: user.as_ref().map(UserView::from),
        professionals,
        error,
    }
}

/// Display a professional's profile and reviews.
pub async fn show(
    State(state): State<AppState>,
    request_id: RequestId,
    OptionalUser(user): OptionalUser,
    Path(username): Path<String>,
) -> Response {
    let client = listings(&state, &request_id);
    profile_page(&client, &username, user.as_ref()).await
}

/// Display the current user's own professional profile.
pub async fn me(
    State(state): State<AppState>,
    request_id: RequestId,
    _guard: RequireLoggedIn,
    RequireUser(user): RequireUser,
) -> Response {
    let client = listings(&state, &request_id);
    profile_page(&client, &user.username, Some(&user)).await
}

async fn profile_page(
    client: &ListingClient<HttpTransport>,
    username: &str,
    current_user: Option<&User>,
) -> Response {
    let is_own_profile = current_user.is_some_and(|u| u.username == username);
    let current_user = current_user.map(UserView::from);

    match load_profile(client, username).await {
        Ok((profile, reviews)) => ShowTemplate {
            current_user,
            profile: Some(ProfileView::from(&profile)),
            reviews: reviews.iter().map(ReviewView::from).collect(),
            is_own_profile,
            error: None,
        }
        .into_response(),
        Err(e) if e.is_not_found() => Navigation::found(HOME_PATH).into_response(),
        Err(e) => {
            warn!(error = %e, username, "Failed to load professional profile");
            ShowTemplate {
                current_user,
                profile: None,
                reviews: Vec::new(),
                is_own_profile,
                error: Some(e.user_message("Failed to fetch reviews")),
            }
            .into_response()
        }
    }
}

async fn load_profile(
    client: &ListingClient<HttpTransport>,
    username: &str,
) -> Result<(ProfessionalProfile, Vec<Review>), ApiError> {
    let profile = client.professional(username).await?;
    let reviews = client.reviews(profile.professional.id).await?;
    Ok(((*profile).clone(), (*reviews).clone()))
}

/// Display the hires made by the current user.
pub async fn my_hires(
    State(state): State<AppState>,
    request_id: RequestId,
    _guard: RequireLoggedIn,
    RequireUser(user): RequireUser,
    Auth(gateway): Auth,
) -> Response {
    let Some(token) = gateway.token() else {
        return Navigation::found(LOGIN_PATH).into_response();
    };

    let (hires, error) = match listings(&state, &request_id).hires(token.as_secret()).await {
        Ok(hires) => (hires.iter().map(HireView::from).collect(), None),
        Err(e) => {
            warn!(error = %e, "Failed to fetch hires");
            (Vec::new(), Some(e.user_message("Failed to fetch hires")))
        }
    };

    HiresTemplate {
        current_user: Some(UserView::from(&user)),
        hires,
        error,
    }
    .into_response()
}
