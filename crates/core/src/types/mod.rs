//! Core types for Talent Hub.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the records exchanged with the remote API.

pub mod email;
pub mod id;
pub mod price;
pub mod records;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Amount;
pub use records::{Hire, HireSummary, Professional, ProfessionalProfile, Review, Skill, User};
pub use status::HireStatus;
