//! Records returned by the remote API.
//!
//! Field names follow the API's JSON. Everything that the API may omit is
//! either optional or defaulted, so a sparse payload still renders.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Amount, HireId, HireStatus, ProfessionalId, ReviewId, SkillId, UserId};

/// The authenticated user as returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_no: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic_url: Option<String>,
}

impl User {
    /// Full name when the API has one, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().map(str::trim).unwrap_or_default();
        let last = self.last_name.as_deref().map(str::trim).unwrap_or_default();
        match (first.is_empty(), last.is_empty()) {
            (true, true) => self.username.clone(),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (false, false) => format!("{first} {last}"),
        }
    }
}

/// A skill category a professional offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A professional listing.
///
/// The list endpoint flattens the owning user's name and the skill name into
/// the record; the detail endpoint nests them in [`ProfessionalProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: ProfessionalId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub skill_id: Option<SkillId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub hourly_rate: Amount,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

const fn default_available() -> bool {
    true
}

/// `GET /professionals/{username}` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub professional: Professional,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub skill: Option<Skill>,
}

/// A client's review of a completed hire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: ReviewId,
    #[serde(default)]
    pub hire_id: Option<HireId>,
    #[serde(default)]
    pub professional: Option<ProfessionalId>,
    #[serde(default)]
    pub client: Option<UserId>,
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Review {
    /// Highest rating the API accepts.
    pub const MAX_RATING: u8 = 5;

    /// Rating clamped to the accepted range.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.min(Self::MAX_RATING)
    }
}

/// A hire record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hire {
    #[serde(default)]
    pub id: HireId,
    #[serde(default)]
    pub client_id: Option<UserId>,
    pub professional_id: ProfessionalId,
    #[serde(default)]
    pub status: HireStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_hours: u32,
    #[serde(default)]
    pub total_amount: Amount,
}

/// `GET /hires/` item: a hire joined with the professional it was made with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HireSummary {
    pub hire: Hire,
    pub professional_username: String,
    #[serde(default)]
    pub professional_title: String,
    #[serde(default)]
    pub professional_location: String,
    #[serde(default)]
    pub skill_name: String,
}
