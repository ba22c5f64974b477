//! Bulk student seeding.
//!
//! Generates fake students in parallel and spreads them round-robin over
//! the existing classes.

use chrono::{Duration, TimeZone, Utc};
use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use kaayjang_models::ClassId;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::StudentSeed;

// 7 params per student
const BATCH_SIZE: usize = 800;

/// Span of generated birth dates, counted in days from 2004-01-01.
const BIRTH_DATE_SPAN_DAYS: i64 = 6 * 365;

/// Generates `count` students, numbering matricules from `first_number`.
pub fn generate_students(
    class_ids: &[ClassId],
    count: usize,
    first_number: i64,
) -> Vec<StudentSeed> {
    let Some(earliest) = Utc.with_ymd_and_hms(2004, 1, 1, 0, 0, 0).single() else {
        return Vec::new();
    };
    if class_ids.is_empty() {
        return Vec::new();
    }

    (0..count)
        .into_par_iter()
        .map(|i| {
            let offset: i64 = (0..BIRTH_DATE_SPAN_DAYS).fake();
            StudentSeed {
                matricule: format!("ETU{:06}", first_number + i as i64),
                last_name: LastName().fake(),
                first_name: FirstName().fake(),
                birth_date: earliest + Duration::days(offset),
                phone: Some(PhoneNumber().fake()),
                address: Some(CityName().fake()),
                class_id: class_ids[i % class_ids.len()].clone(),
            }
        })
        .collect()
}

/// Seeds `count` fake students into the existing classes.
///
/// Returns the number of rows actually inserted; matricules that already
/// exist are skipped.
pub async fn seed_students(db: &PgPool, count: usize) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    let class_ids: Vec<ClassId> = sqlx::query_scalar("SELECT id FROM classes ORDER BY code")
        .fetch_all(db)
        .await?;

    if class_ids.is_empty() {
        return Err("No classes found. Run `seed` first.".into());
    }

    println!(
        "🎓 Seeding {} students over {} classes...",
        count,
        class_ids.len()
    );

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(db)
        .await?;

    let students = generate_students(&class_ids, count, existing + 1);
    let inserted = insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Inserts students in batches inside one transaction.
pub async fn insert_students_batch(
    db: &PgPool,
    students: &[StudentSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;
    let mut inserted = 0;

    for chunk in students.chunks(BATCH_SIZE) {
        inserted += insert_students_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO students \
         (matricule, last_name, first_name, birth_date, phone, address, class_id) VALUES ",
    );

    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let base = i * 7;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${})",
            base + 1,
            base + 2,
            base + 3,
            base + 4,
            base + 5,
            base + 6,
            base + 7
        ));
    }

    query.push_str(" ON CONFLICT (matricule) DO NOTHING");

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(&student.matricule)
            .bind(&student.last_name)
            .bind(&student.first_name)
            .bind(student.birth_date)
            .bind(&student.phone)
            .bind(&student.address)
            .bind(&student.class_id);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}
