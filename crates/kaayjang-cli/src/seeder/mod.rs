//! Database seeding for development and demos.
//!
//! - [`reference`]: the fixed levels, tracks, classes and sample students
//! - [`students`]: bulk fake students spread over existing classes
//!
//! Every insert is idempotent on the natural key, so seeding twice is safe.

pub mod models;
pub mod reference;
pub mod students;

use sqlx::PgPool;
use std::time::Instant;

pub use reference::seed_reference_data;
pub use students::seed_students;

/// Deletes every row, children first so no foreign key blocks the delete.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing all data...");

    let mut tx = db.begin().await?;

    for table in ["students", "classes", "tracks", "levels"] {
        let deleted = sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        println!("   ✓ Deleted {} rows from {}", deleted, table);
    }

    tx.commit().await?;

    println!("✅ Cleared all data in {:?}", start_time.elapsed());
    Ok(())
}
