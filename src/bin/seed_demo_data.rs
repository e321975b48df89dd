//! Seed synthetic demo data
//!
//! Usage: cargo run --bin seed_demo_data -- [username] [days]
//!
//! Creates a demo user with a profile, daily logs with plausible variability
//! over the trailing window, and matching meal entries, so the forecasting
//! and evaluation tools have something to work with.

use std::path::PathBuf;

use chrono::{Duration, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use healthtrack::db::{self, Database};
use healthtrack::models::{
    ActivityLevel, DailyLog, DailyLogUpsert, Gender, MealEntry, MealEntryCreate, MealType, Mood,
    Profile, ProfileSet, User,
};

fn get_database_path() -> PathBuf {
    std::env::var("HEALTHTRACK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            std::fs::create_dir_all(&path).ok();
            path.push("healthtrack.db");
            path
        })
}

/// Gaussian sample via Box-Muller
fn gauss(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    mean + sd * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn pick_mood(rng: &mut StdRng) -> Mood {
    // Weighted roughly towards the middle of the scale
    match rng.gen_range(0..100) {
        0..=4 => Mood::Excellent,
        5..=24 => Mood::Good,
        25..=64 => Mood::Okay,
        65..=89 => Mood::Bad,
        _ => Mood::Terrible,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let username = args.get(1).map(|s| s.as_str()).unwrap_or("demo");
    let days: i64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(90);

    let db_path = get_database_path();
    println!("Database: {}", db_path.display());

    let database = Database::new(&db_path)?;
    database.with_conn(|conn| db::migrations::run_migrations(conn))?;

    let mut rng = StdRng::seed_from_u64(42);
    let today = Local::now().date_naive();

    database.with_conn(|conn| {
        let user = User::get_or_create(conn, username)?;

        Profile::set(
            conn,
            user.id,
            &ProfileSet {
                age: 30,
                height_cm: 175.0,
                weight_kg: 70.0,
                target_weight_kg: Some(68.0),
                gender: Gender::Male,
                activity_level: ActivityLevel::Moderate,
            },
        )?;
        println!("Profile set for user {}", username);

        let mut created = 0;
        let mut skipped = 0;
        // Weight drifts slowly; everything else is day-to-day noise
        let mut weight = 71.5;

        for i in 1..=days {
            let date = (today - Duration::days(i)).format("%Y-%m-%d").to_string();

            if DailyLog::get_by_date(conn, user.id, &date)?.is_some() {
                skipped += 1;
                continue;
            }

            weight += gauss(&mut rng, -0.01, 0.08);

            let steps = gauss(&mut rng, 7000.0, 2500.0).max(0.0) as i64;
            let calories = gauss(&mut rng, 2200.0, 300.0).max(1200.0);
            let exercise = gauss(&mut rng, 30.0, 20.0).max(0.0);
            let sleep = gauss(&mut rng, 7.0, 1.2).clamp(0.0, 12.0);
            let heart_rate = gauss(&mut rng, 70.0, 8.0).clamp(40.0, 180.0) as i64;

            DailyLog::upsert(
                conn,
                user.id,
                &DailyLogUpsert {
                    date: date.clone(),
                    calories_intake: Some((calories * 10.0).round() / 10.0),
                    protein_g: Some((rng.gen_range(50.0f64..120.0) * 10.0).round() / 10.0),
                    carbs_g: Some((rng.gen_range(150.0f64..350.0) * 10.0).round() / 10.0),
                    fats_g: Some((rng.gen_range(40.0f64..100.0) * 10.0).round() / 10.0),
                    water_intake_l: Some((rng.gen_range(1.0f64..3.0) * 100.0).round() / 100.0),
                    steps: Some(steps),
                    exercise_duration_min: Some((exercise * 10.0).round() / 10.0),
                    exercise_type: Some(if exercise < 30.0 {
                        "walking".to_string()
                    } else {
                        "running".to_string()
                    }),
                    sleep_hours: Some((sleep * 100.0).round() / 100.0),
                    weight_kg: Some((weight * 100.0).round() / 100.0),
                    heart_rate: Some(heart_rate),
                    blood_pressure_sys: None,
                    blood_pressure_dia: None,
                    mood: Some(pick_mood(&mut rng)),
                    notes: Some("Synthetic generated log for evaluation".to_string()),
                },
            )?;

            // Split the day's calories across three meals
            for (meal_type, share, hour) in [
                (MealType::Breakfast, 0.25, 8),
                (MealType::Lunch, 0.35, 13),
                (MealType::Dinner, 0.40, 19),
            ] {
                MealEntry::create(
                    conn,
                    user.id,
                    &MealEntryCreate {
                        meal_type,
                        calories: (calories * share * 10.0).round() / 10.0,
                        water_ml: rng.gen_range(200.0..500.0_f64).round(),
                        protein_g: rng.gen_range(10.0..45.0_f64).round(),
                        carbs_g: rng.gen_range(30.0..120.0_f64).round(),
                        fat_g: rng.gen_range(10.0..40.0_f64).round(),
                        fiber_g: rng.gen_range(2.0..12.0_f64).round(),
                        notes: None,
                        created_at: Some(format!("{} {:02}:00:00", date, hour)),
                    },
                )?;
            }

            created += 1;
        }

        println!(
            "Created {} logs ({} meals), skipped {} existing logs for user {}",
            created,
            created * 3,
            skipped,
            username
        );
        Ok(())
    })?;

    Ok(())
}
