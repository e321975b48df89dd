//! Forecast quality metrics
//!
//! Regression error scores and the binary direction-classification scores
//! derived from them. Every undefined ratio (zero variance, no positive
//! labels) falls back to 0.0 instead of failing.

/// Round to a number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Coefficient of determination; 0.0 when the actuals carry no variance
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mean = actual.iter().sum::<f64>() / n;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Root-mean-squared error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64;
    mse.sqrt()
}

/// Mean absolute percentage error. A zero actual value would make the ratio
/// unbounded, so the whole score degrades to 0.0 instead.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() || actual.iter().any(|&a| a == 0.0) {
        return 0.0;
    }
    let mape = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum::<f64>()
        / actual.len() as f64
        * 100.0;
    if mape.is_nan() || mape.is_infinite() {
        0.0
    } else {
        mape
    }
}

/// Binarize values against a reference: 1 when strictly above it, else 0
pub fn binarize(values: &[f64], reference: f64) -> Vec<u8> {
    values
        .iter()
        .map(|&v| if v > reference { 1 } else { 0 })
        .collect()
}

/// Fraction of matching labels
pub fn accuracy_score(actual: &[u8], predicted: &[u8]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    correct as f64 / actual.len() as f64
}

fn confusion_counts(actual: &[u8], predicted: &[u8]) -> (f64, f64, f64) {
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut fne = 0.0;
    for (&a, &p) in actual.iter().zip(predicted) {
        match (a, p) {
            (1, 1) => tp += 1.0,
            (0, 1) => fp += 1.0,
            (1, 0) => fne += 1.0,
            _ => {}
        }
    }
    (tp, fp, fne)
}

/// Precision over the positive class; 0.0 with no positive predictions
pub fn precision_score(actual: &[u8], predicted: &[u8]) -> f64 {
    let (tp, fp, _) = confusion_counts(actual, predicted);
    if tp + fp == 0.0 {
        return 0.0;
    }
    tp / (tp + fp)
}

/// Recall over the positive class; 0.0 with no positive actuals
pub fn recall_score(actual: &[u8], predicted: &[u8]) -> f64 {
    let (tp, _, fne) = confusion_counts(actual, predicted);
    if tp + fne == 0.0 {
        return 0.0;
    }
    tp / (tp + fne)
}

/// Harmonic mean of precision and recall; 0.0 when both are zero
pub fn f1_score(actual: &[u8], predicted: &[u8]) -> f64 {
    let precision = precision_score(actual, predicted);
    let recall = recall_score(actual, predicted);
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(2.34567, 2), 2.35);
        assert_eq!(round_to(2.34467, 3), 2.345);
        assert_eq!(round_to(-0.00722, 4), -0.0072);
    }

    #[test]
    fn test_r2_perfect_fit() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&actual, &actual), 1.0);
    }

    #[test]
    fn test_r2_zero_variance_actuals() {
        let actual = [5.0, 5.0, 5.0];
        let predicted = [4.0, 5.0, 6.0];
        assert_eq!(r2_score(&actual, &predicted), 0.0);
    }

    #[test]
    fn test_mae_rmse() {
        let actual = [2.0, 4.0, 6.0];
        let predicted = [1.0, 4.0, 8.0];
        assert!((mean_absolute_error(&actual, &predicted) - 1.0).abs() < 1e-9);
        let expected_rmse = (5.0f64 / 3.0).sqrt();
        assert!((root_mean_squared_error(&actual, &predicted) - expected_rmse).abs() < 1e-9);
    }

    #[test]
    fn test_mape_guards_zero_actuals() {
        assert_eq!(mean_absolute_percentage_error(&[0.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_eq!(mean_absolute_percentage_error(&[], &[]), 0.0);

        let mape = mean_absolute_percentage_error(&[100.0, 200.0], &[110.0, 180.0]);
        assert!((mape - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_binarize_strictly_above() {
        assert_eq!(binarize(&[1.0, 2.0, 3.0], 2.0), vec![0, 0, 1]);
    }

    #[test]
    fn test_binarize_is_pure_roundtrip() {
        // Re-binarizing the same values against the same reference reproduces
        // the labels exactly
        let values = [3.1, 2.9, 3.0, 3.5];
        let first = binarize(&values, 3.0);
        let second = binarize(&values, 3.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classification_scores() {
        let actual = [1, 0, 1, 1];
        let predicted = [1, 1, 1, 0];
        assert_eq!(accuracy_score(&actual, &predicted), 0.5);
        assert!((precision_score(&actual, &predicted) - 2.0 / 3.0).abs() < 1e-9);
        assert!((recall_score(&actual, &predicted) - 2.0 / 3.0).abs() < 1e-9);
        assert!((f1_score(&actual, &predicted) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_classification_zero_division_is_zero() {
        // No positive predictions and no positive actuals
        let actual = [0, 0, 0];
        let predicted = [0, 0, 0];
        assert_eq!(precision_score(&actual, &predicted), 0.0);
        assert_eq!(recall_score(&actual, &predicted), 0.0);
        assert_eq!(f1_score(&actual, &predicted), 0.0);
        assert_eq!(accuracy_score(&actual, &predicted), 1.0);
    }
}
