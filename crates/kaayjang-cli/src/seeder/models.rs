//! Seed records used by the reference and bulk seeders.

use chrono::{DateTime, Utc};
use kaayjang_models::ClassId;

/// Seed data for a track, attached to a level by label.
pub struct TrackSeed {
    pub label: &'static str,
    pub level_label: &'static str,
}

/// Seed data for a class, attached to its level and track by label.
pub struct ClassSeed {
    pub code: &'static str,
    pub label: &'static str,
    pub level_label: &'static str,
    pub track_label: &'static str,
}

/// Seed data for a student.
pub struct StudentSeed {
    pub matricule: String,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: DateTime<Utc>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub class_id: ClassId,
}
