//! Reference data: the four collège levels, two tracks, two classes and
//! two sample students.
//!
//! Rows are matched on their natural key (`label`, `code`, `matricule`), so
//! existing data is never overwritten.

use chrono::{TimeZone, Utc};
use kaayjang_models::{ClassId, LevelId, TrackId};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use std::time::Instant;

use super::models::{ClassSeed, StudentSeed, TrackSeed};

pub const LEVEL_LABELS: [&str; 4] = ["6ème", "5ème", "4ème", "3ème"];

pub const TRACKS: [TrackSeed; 2] = [
    TrackSeed {
        label: "Lettres",
        level_label: "6ème",
    },
    TrackSeed {
        label: "Sciences",
        level_label: "5ème",
    },
];

pub const CLASSES: [ClassSeed; 2] = [
    ClassSeed {
        code: "6A",
        label: "6ème A",
        level_label: "6ème",
        track_label: "Lettres",
    },
    ClassSeed {
        code: "5B",
        label: "5ème B",
        level_label: "5ème",
        track_label: "Sciences",
    },
];

/// Seeds the reference data inside one transaction.
pub async fn seed_reference_data(db: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding reference data...");

    let mut tx = db.begin().await?;

    let mut levels = HashMap::new();
    for label in LEVEL_LABELS {
        levels.insert(label, upsert_level(&mut tx, label).await?);
    }
    println!("   ✓ {} levels", levels.len());

    let mut tracks = HashMap::new();
    for track in &TRACKS {
        let level_id = levels
            .get(track.level_label)
            .ok_or_else(|| format!("unknown level {}", track.level_label))?;
        tracks.insert(track.label, upsert_track(&mut tx, track.label, level_id).await?);
    }
    println!("   ✓ {} tracks", tracks.len());

    let mut classes = HashMap::new();
    for class in &CLASSES {
        let level_id = levels
            .get(class.level_label)
            .ok_or_else(|| format!("unknown level {}", class.level_label))?;
        let track_id = tracks
            .get(class.track_label)
            .ok_or_else(|| format!("unknown track {}", class.track_label))?;
        classes.insert(
            class.code,
            upsert_class(&mut tx, class, level_id, track_id).await?,
        );
    }
    println!("   ✓ {} classes", classes.len());

    let students = sample_students(&classes)?;
    let mut inserted = 0;
    for student in &students {
        inserted += insert_student(&mut tx, student).await?;
    }
    println!("   ✓ {} new students", inserted);

    tx.commit().await?;

    println!("✅ Reference data seeded in {:?}", start_time.elapsed());
    Ok(())
}

fn sample_students(
    classes: &HashMap<&str, ClassId>,
) -> Result<Vec<StudentSeed>, Box<dyn std::error::Error>> {
    let class = |code: &str| {
        classes
            .get(code)
            .cloned()
            .ok_or_else(|| format!("unknown class {}", code))
    };
    let date = |y: i32, m: u32, d: u32| {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .ok_or_else(|| format!("invalid date {}-{}-{}", y, m, d))
    };

    Ok(vec![
        StudentSeed {
            matricule: "ETU001".to_string(),
            last_name: "Diop".to_string(),
            first_name: "Amadou".to_string(),
            birth_date: date(2008, 3, 15)?,
            phone: Some("77123456789".to_string()),
            address: Some("Dakar, Sénégal".to_string()),
            class_id: class("6A")?,
        },
        StudentSeed {
            matricule: "ETU002".to_string(),
            last_name: "Fall".to_string(),
            first_name: "Fatou".to_string(),
            birth_date: date(2007, 7, 22)?,
            phone: Some("76987654321".to_string()),
            address: Some("Thiès, Sénégal".to_string()),
            class_id: class("5B")?,
        },
    ])
}

async fn upsert_level(
    tx: &mut Transaction<'_, Postgres>,
    label: &str,
) -> Result<LevelId, sqlx::Error> {
    sqlx::query("INSERT INTO levels (label) VALUES ($1) ON CONFLICT (label) DO NOTHING")
        .bind(label)
        .execute(&mut **tx)
        .await?;

    sqlx::query_scalar("SELECT id FROM levels WHERE label = $1")
        .bind(label)
        .fetch_one(&mut **tx)
        .await
}

async fn upsert_track(
    tx: &mut Transaction<'_, Postgres>,
    label: &str,
    level_id: &LevelId,
) -> Result<TrackId, sqlx::Error> {
    sqlx::query(
        "INSERT INTO tracks (label, level_id) VALUES ($1, $2) ON CONFLICT (label) DO NOTHING",
    )
    .bind(label)
    .bind(level_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query_scalar("SELECT id FROM tracks WHERE label = $1")
        .bind(label)
        .fetch_one(&mut **tx)
        .await
}

async fn upsert_class(
    tx: &mut Transaction<'_, Postgres>,
    class: &ClassSeed,
    level_id: &LevelId,
    track_id: &TrackId,
) -> Result<ClassId, sqlx::Error> {
    sqlx::query(
        "INSERT INTO classes (code, label, level_id, track_id)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (code) DO NOTHING",
    )
    .bind(class.code)
    .bind(class.label)
    .bind(level_id)
    .bind(track_id)
    .execute(&mut **tx)
    .await?;

    sqlx::query_scalar("SELECT id FROM classes WHERE code = $1")
        .bind(class.code)
        .fetch_one(&mut **tx)
        .await
}

async fn insert_student(
    tx: &mut Transaction<'_, Postgres>,
    student: &StudentSeed,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO students
             (matricule, last_name, first_name, birth_date, phone, address, class_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (matricule) DO NOTHING",
    )
    .bind(&student.matricule)
    .bind(&student.last_name)
    .bind(&student.first_name)
    .bind(student.birth_date)
    .bind(&student.phone)
    .bind(&student.address)
    .bind(&student.class_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}
