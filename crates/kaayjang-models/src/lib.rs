//! # Kaayjang Models
//!
//! Domain models and DTOs for the Kaayjang API.
//!
//! - [`ids`]: Strongly-typed identifiers
//! - [`levels`]: Levels (niveaux)
//! - [`tracks`]: Tracks (filières), each scoped to one level
//! - [`classes`]: Classes, pairing a level with one of its tracks
//! - [`students`]: Students (étudiants), each enrolled in one class
//!
//! Field names on the wire follow the public API (`libelle`, `niveauId`,
//! `dateNaissance`, ...); Rust fields and database columns use English.

pub mod classes;
pub mod ids;
pub mod levels;
pub mod students;
pub mod tracks;

pub use ids::{ClassId, LevelId, StudentId, TrackId};
