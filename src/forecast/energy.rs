//! Energy-balance weight and BMI projection
//!
//! Estimates expenditure from profile demographics (Mifflin-St Jeor BMR and
//! an activity multiplier), compares it against observed average intake, and
//! linearly projects weight and BMI at (surplus / 7700) kg per day. This is a
//! straight-line extrapolation of one instantaneous rate; it will diverge for
//! long horizons and makes no attempt to detect trend changes.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::metrics::round_to;
use crate::models::{date_part, DailyLog, Gender, MealEntry, Profile};

/// Energy equivalent of one kilogram of body mass (kcal)
pub const KCAL_PER_KG: f64 = 7700.0;

/// Projected weight/BMI trajectory over a horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightBmiProjection {
    pub dates: Vec<String>,
    pub weight: Vec<f64>,
    pub height: Vec<f64>,
    pub bmi: Vec<f64>,
}

/// Basal metabolic rate via Mifflin-St Jeor
pub fn mifflin_st_jeor_bmr(weight_kg: f64, height_cm: f64, age: i64, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    match gender {
        Gender::Female => base - 161.0,
        _ => base + 5.0,
    }
}

/// Total daily energy expenditure from a profile
pub fn tdee(profile: &Profile) -> f64 {
    let bmr = mifflin_st_jeor_bmr(
        profile.weight_kg,
        profile.height_cm,
        profile.age,
        profile.gender,
    );
    bmr * profile.activity_level.multiplier()
}

/// Average daily caloric intake over a window.
///
/// Prefers per-meal entries aggregated by calendar date and averaged across
/// dates with at least one entry. With no meal entries, falls back to the
/// daily-log calorie field (missing treated as 0) averaged across all logs in
/// the window. `None` when neither source has data.
pub fn average_daily_calories(meals: &[MealEntry], logs: &[DailyLog]) -> Option<f64> {
    let mut calories_by_date: BTreeMap<&str, f64> = BTreeMap::new();
    for meal in meals {
        *calories_by_date.entry(date_part(&meal.created_at)).or_insert(0.0) += meal.calories;
    }

    if !calories_by_date.is_empty() {
        let total: f64 = calories_by_date.values().sum();
        return Some(total / calories_by_date.len() as f64);
    }

    if logs.is_empty() {
        return None;
    }

    let total: f64 = logs.iter().map(|l| l.calories_intake.unwrap_or(0.0)).sum();
    Some(total / logs.len() as f64)
}

/// Project weight and BMI for the next `predict_days` days
pub fn project_weight_bmi(
    profile: &Profile,
    avg_daily_calories: f64,
    today: NaiveDate,
    predict_days: u32,
) -> WeightBmiProjection {
    let daily_surplus = avg_daily_calories - tdee(profile);
    let kg_per_day = daily_surplus / KCAL_PER_KG;

    let base_weight = profile.weight_kg;
    let height_cm = profile.height_cm;
    let height_m = height_cm / 100.0;

    let mut dates = Vec::with_capacity(predict_days as usize);
    let mut weight = Vec::with_capacity(predict_days as usize);
    let mut height = Vec::with_capacity(predict_days as usize);
    let mut bmi = Vec::with_capacity(predict_days as usize);

    for offset in 1..=predict_days as i64 {
        let date = today + Duration::days(offset);
        dates.push(date.format("%m-%d").to_string());

        let w = base_weight + kg_per_day * offset as f64;
        weight.push(round_to(w, 2));
        height.push(round_to(height_cm, 1));
        let b = if height_m > 0.0 { w / (height_m * height_m) } else { 0.0 };
        bmi.push(round_to(b, 2));
    }

    WeightBmiProjection { dates, weight, height, bmi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, MealType, Mood};

    fn profile(weight_kg: f64, gender: Gender, activity: ActivityLevel) -> Profile {
        Profile {
            id: 1,
            user_id: 1,
            age: 30,
            height_cm: 175.0,
            weight_kg,
            target_weight_kg: None,
            gender,
            activity_level: activity,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn meal(created_at: &str, calories: f64) -> MealEntry {
        MealEntry {
            id: 0,
            user_id: 1,
            meal_type: MealType::Lunch,
            calories,
            water_ml: 0.0,
            protein_g: 0.0,
            carbs_g: 0.0,
            fat_g: 0.0,
            fiber_g: 0.0,
            notes: None,
            created_at: created_at.to_string(),
        }
    }

    fn log_with_calories(date: &str, calories: Option<f64>) -> DailyLog {
        DailyLog {
            id: 0,
            user_id: 1,
            date: date.to_string(),
            calories_intake: calories,
            protein_g: None,
            carbs_g: None,
            fats_g: None,
            water_intake_l: None,
            steps: None,
            exercise_duration_min: None,
            exercise_type: None,
            sleep_hours: None,
            weight_kg: None,
            heart_rate: None,
            blood_pressure_sys: None,
            blood_pressure_dia: None,
            mood: Mood::Okay,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bmr_male_reference() {
        // 10*70 + 6.25*175 - 5*30 + 5 = 1648.75
        let bmr = mifflin_st_jeor_bmr(70.0, 175.0, 30, Gender::Male);
        assert!((bmr - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_female_constant() {
        let male = mifflin_st_jeor_bmr(60.0, 165.0, 25, Gender::Male);
        let female = mifflin_st_jeor_bmr(60.0, 165.0, 25, Gender::Female);
        assert!((male - female - 166.0).abs() < 1e-9);
    }

    #[test]
    fn test_tdee_moderate() {
        let p = profile(70.0, Gender::Male, ActivityLevel::Moderate);
        assert!((tdee(&p) - 1648.75 * 1.55).abs() < 1e-9);
    }

    #[test]
    fn test_average_prefers_meals_grouped_by_date() {
        let meals = vec![
            meal("2026-03-01 08:00:00", 400.0),
            meal("2026-03-01 12:30:00", 700.0),
            meal("2026-03-02 19:00:00", 900.0),
        ];
        // Logs would average differently; they must be ignored here
        let logs = vec![log_with_calories("2026-03-01", Some(9999.0))];

        let avg = average_daily_calories(&meals, &logs).unwrap();
        assert!((avg - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_falls_back_to_logs() {
        let logs = vec![
            log_with_calories("2026-03-01", Some(2000.0)),
            log_with_calories("2026-03-02", None), // missing counts as 0
            log_with_calories("2026-03-03", Some(1000.0)),
        ];

        let avg = average_daily_calories(&[], &logs).unwrap();
        assert!((avg - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_none_without_data() {
        assert!(average_daily_calories(&[], &[]).is_none());
    }

    #[test]
    fn test_projection_reference_scenario() {
        // 70kg male, 175cm, age 30, moderate activity, 2500 kcal/day intake:
        // TDEE = 1648.75 * 1.55 = 2555.5625, rate = (2500 - TDEE)/7700
        let p = profile(70.0, Gender::Male, ActivityLevel::Moderate);
        let proj = project_weight_bmi(&p, 2500.0, day(2026, 3, 1), 14);

        assert_eq!(proj.dates.len(), 14);
        assert_eq!(proj.weight[13], 69.9);
        assert_eq!(proj.bmi[13], 22.82);
        assert_eq!(proj.height[13], 175.0);
    }

    #[test]
    fn test_projection_balanced_intake_holds_weight() {
        let p = profile(70.0, Gender::Male, ActivityLevel::Moderate);
        let balanced = tdee(&p);
        let proj = project_weight_bmi(&p, balanced, day(2026, 3, 1), 30);

        for w in proj.weight {
            assert_eq!(w, 70.0);
        }
    }

    #[test]
    fn test_projection_date_labels() {
        let p = profile(70.0, Gender::Male, ActivityLevel::Moderate);
        let proj = project_weight_bmi(&p, 2500.0, day(2026, 2, 27), 3);
        assert_eq!(proj.dates, vec!["02-28", "03-01", "03-02"]);
    }
}
