//! Model performance evaluation CLI
//!
//! Usage: cargo run --bin evaluate_model -- [--user NAME] [--metric NAME|all] [--days N] [--plot]
//!
//! Back-tests the forecaster for every qualifying user, prints per-metric
//! results, and writes the full result set to model_evaluation_results.json.

use std::path::PathBuf;

use serde::Serialize;

use healthtrack::db::{self, Database};
use healthtrack::models::{DailyLog, Metric, User, DEFAULT_EVAL_METRICS};
use healthtrack::tools::charts;
use healthtrack::tools::evaluation::{self, UserEvaluation};
use healthtrack::forecast::OverallSummary;

const PAST_DAYS: u32 = 30;
const PREDICT_DAYS: u32 = 14;
const OUTPUT_FILE: &str = "model_evaluation_results.json";

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
            path.push("healthtrack.db");
            path
        })
}

struct Args {
    user: Option<String>,
    metric: String,
    days: u32,
    plot: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        user: None,
        metric: "all".to_string(),
        days: 7,
        plot: false,
    };

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--user" => {
                i += 1;
                args.user = Some(argv.get(i).ok_or("--user requires a value")?.clone());
            }
            "--metric" => {
                i += 1;
                args.metric = argv.get(i).ok_or("--metric requires a value")?.clone();
            }
            "--days" => {
                i += 1;
                args.days = argv
                    .get(i)
                    .ok_or("--days requires a value")?
                    .parse()
                    .map_err(|_| "--days must be a number".to_string())?;
            }
            "--plot" => args.plot = true,
            "--help" | "-h" => {
                println!(
                    "Usage: evaluate_model [--user NAME] [--metric NAME|all] [--days N] [--plot]"
                );
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(args)
}

/// Full result set written to the JSON artifact
#[derive(Debug, Serialize)]
struct EvaluationArtifact {
    users_evaluated: usize,
    users_skipped: usize,
    test_days: u32,
    metrics: Vec<String>,
    results: Vec<UserResult>,
}

#[derive(Debug, Serialize)]
struct UserResult {
    username: String,
    log_count: i64,
    evaluation: UserEvaluation,
    summary: OverallSummary,
}

fn print_user_result(result: &UserResult) {
    for (name, eval) in &result.evaluation.metrics {
        match (&eval.regression, &eval.direction_classification) {
            (None, None) => {
                println!("  {}: insufficient data", name);
                continue;
            }
            (reg, cls) => {
                println!("  {}:", name);
                if let Some(reg) = reg {
                    println!("    MAE: {:.2}", reg.mae);
                    println!("    RMSE: {:.2}", reg.rmse);
                    println!("    R2: {:.4}", reg.r2);
                    println!("    MAPE: {:.2}%", reg.mape);
                }
                if let Some(cls) = cls {
                    println!(
                        "    Direction: accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
                        cls.accuracy, cls.precision, cls.recall, cls.f1
                    );
                }
            }
        }
    }

    match &result.evaluation.weight_bmi {
        Some(report) => println!(
            "  Weight/BMI projection: MAE {:.2} kg, RMSE {:.2} kg",
            report.mae, report.rmse
        ),
        None => println!("  Weight/BMI projection: no overlapping weight logs"),
    }

    let summary = &result.summary;
    println!("  Overall: {} metric(s) evaluated", summary.metrics_evaluated);
    if let Some(ref reg) = summary.regression {
        println!(
            "    Avg MAE: {}   Avg RMSE: {}",
            reg.avg_mae.map_or("-".to_string(), |v| format!("{:.2}", v)),
            reg.avg_rmse.map_or("-".to_string(), |v| format!("{:.2}", v)),
        );
    }
    if let Some(ref cls) = summary.classification {
        println!(
            "    Avg accuracy: {}   Avg F1: {}",
            cls.avg_accuracy.map_or("-".to_string(), |v| format!("{:.4}", v)),
            cls.avg_f1.map_or("-".to_string(), |v| format!("{:.4}", v)),
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: evaluate_model [--user NAME] [--metric NAME|all] [--days N] [--plot]");
            std::process::exit(2);
        }
    };

    let metrics: Vec<Metric> = if args.metric.eq_ignore_ascii_case("all") {
        DEFAULT_EVAL_METRICS.to_vec()
    } else {
        match Metric::from_str(&args.metric) {
            Some(metric) => vec![metric],
            None => {
                eprintln!("Unknown metric: {}", args.metric);
                std::process::exit(2);
            }
        }
    };

    let db_path = get_database_path();
    println!("Database: {}", db_path.display());

    let database = Database::new(&db_path)?;
    database.with_conn(|conn| db::migrations::run_migrations(conn))?;

    println!("\n=== Model Performance Evaluation ===");

    let users = database.with_conn(|conn| {
        if let Some(ref username) = args.user {
            Ok(User::get_by_username(conn, username)?.into_iter().collect())
        } else {
            User::list(conn)
        }
    })?;

    if users.is_empty() {
        match args.user {
            Some(username) => eprintln!("User \"{}\" not found", username),
            None => eprintln!("No users in the database"),
        }
        std::process::exit(1);
    }

    // Below this many total logs a user cannot produce a meaningful backtest
    let min_logs = (args.days + 7) as i64;

    let mut artifact = EvaluationArtifact {
        users_evaluated: 0,
        users_skipped: 0,
        test_days: args.days,
        metrics: metrics.iter().map(|m| m.as_str().to_string()).collect(),
        results: Vec::new(),
    };

    for user in &users {
        println!("\nEvaluating user: {}", user.username);

        let log_count =
            database.with_conn(|conn| DailyLog::count_for_user(conn, user.id))?;
        if log_count < min_logs {
            println!(
                "  Skipping {}: insufficient data (need at least {} logs, has {})",
                user.username, min_logs, log_count
            );
            artifact.users_skipped += 1;
            continue;
        }

        let evaluation = evaluation::evaluate_user(
            &database,
            &user.username,
            &metrics,
            PAST_DAYS,
            args.days,
            PREDICT_DAYS,
        )?;

        let summary = evaluation::evaluate_overall(
            &database,
            &user.username,
            &metrics,
            PAST_DAYS,
            args.days,
            PREDICT_DAYS,
        )?;

        let result = UserResult {
            username: user.username.clone(),
            log_count,
            evaluation,
            summary,
        };
        print_user_result(&result);

        if args.plot {
            for &metric in &metrics {
                let out_path = format!(
                    "evaluation_charts/{}_{}.png",
                    user.username,
                    metric.as_str()
                );
                match evaluation::save_metric_chart(
                    &database,
                    &user.username,
                    metric,
                    PAST_DAYS,
                    args.days,
                    &out_path,
                ) {
                    Ok(Some(chart)) => println!("  Chart saved: {}", chart.file_path),
                    Ok(None) => {}
                    Err(e) => eprintln!("  Chart failed for {}: {}", metric.as_str(), e),
                }
            }

            let out_path = format!("evaluation_charts/{}_overall.png", user.username);
            match charts::generate_overall_chart(&result.summary, &out_path, 1200, 500) {
                Ok(chart) => println!("  Chart saved: {}", chart.file_path),
                Err(e) => eprintln!("  Overall chart failed: {}", e),
            }
        }

        artifact.users_evaluated += 1;
        artifact.results.push(result);
    }

    println!("\n=== Evaluation Summary ===");
    println!("Users evaluated: {}", artifact.users_evaluated);
    println!("Users skipped:   {}", artifact.users_skipped);

    let json = serde_json::to_string_pretty(&artifact)?;
    std::fs::write(OUTPUT_FILE, json)?;
    println!("\nResults saved to: {}", OUTPUT_FILE);

    Ok(())
}
