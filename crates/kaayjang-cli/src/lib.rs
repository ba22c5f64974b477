//! # Kaayjang CLI
//!
//! Database seeding utilities for Kaayjang development and demos.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use kaayjang_cli::seeder;
//!
//! seeder::seed_reference_data(&pool).await?;
//! seeder::seed_students(&pool, 200).await?;
//! ```

pub mod seeder;
