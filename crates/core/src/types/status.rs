//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Lifecycle of a hire between a client and a professional.
///
/// The remote API stores the status as lowercase text. Anything it adds
/// later is kept as [`HireStatus::Other`] rather than failing the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HireStatus {
    #[default]
    Pending,
    Accepted,
    Active,
    Completed,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl HireStatus {
    /// Whether the hire is still in progress from the client's point of view.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted | Self::Active)
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for HireStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
