//! Forecasting and evaluation core
//!
//! Pure computations over already-fetched records: series extraction, the
//! least-squares trend model, the energy-balance weight projection, and the
//! regression/direction evaluation pipeline. Nothing in this module touches
//! the database; callers pass explicit slices and parameters.

pub mod energy;
pub mod evaluate;
pub mod linear;
pub mod metrics;
pub mod predict;
pub mod series;

pub use energy::{
    average_daily_calories, mifflin_st_jeor_bmr, project_weight_bmi, tdee, WeightBmiProjection,
    KCAL_PER_KG,
};
pub use evaluate::{
    aggregate_evaluations, evaluate_direction_series, evaluate_regression_series,
    evaluate_weight_projection, prediction_series, ClassificationAverages, DirectionReport,
    MetricEvaluation, OverallSummary, RegressionAverages, RegressionReport, WeightErrorReport,
};
pub use linear::{LinearModel, MIN_TRAINING_SAMPLES};
pub use predict::{forecast_series, MetricForecast};
pub use series::{extract_series, TrainingSample};
