//! Evaluation metrics for binary predictions.

use std::collections::BTreeSet;

/// Fraction of predictions equal to the true label. `0.0` for no samples.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Per-class F1 averaged with weights equal to each class's true support.
///
/// Classes that only appear in `y_pred` have zero support and do not
/// contribute. A class with no true or predicted positives scores zero.
pub fn weighted_f1(y_true: &[u8], y_pred: &[u8]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }

    let classes: BTreeSet<u8> = y_true.iter().chain(y_pred).copied().collect();
    let mut total = 0.0;

    for class in classes {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == class, p == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let support = tp + fn_;
        let denominator = 2 * tp + fp + fn_;
        let f1 = if denominator == 0 {
            0.0
        } else {
            2.0 * tp as f64 / denominator as f64
        };
        total += f1 * support as f64;
    }

    total / y_true.len() as f64
}
