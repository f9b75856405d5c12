//! Binary linear classifiers over tf-idf rows.
//!
//! Both models are trained with full-batch gradient descent from a zero
//! start, so a fit is fully determined by its inputs and hyperparameters.
//! Rows are mostly zeros; fitting walks a sparse view of them.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};

/// Contract shared by every persisted classifier.
pub trait Classifier: Send + Sync {
    /// Fit on `rows` with labels in {0, 1}.
    fn fit(&mut self, rows: &[&[f64]], labels: &[u8]) -> Result<()>;

    /// Predicted class for one row.
    fn predict(&self, row: &[f64]) -> u8;

    /// Class probabilities `[p(0), p(1)]`, or `None` when the model has no
    /// calibrated probability output.
    fn predict_proba(&self, row: &[f64]) -> Option<[f64; 2]>;

    /// Number of input columns the model was fit on.
    fn n_features(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Gradient descent hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 penalty strength.
    pub l2: f64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 0.5,
            l2: 1e-4,
        }
    }
}

/// Which classifier the trainer fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    #[default]
    LogisticRegression,
    LinearSvm,
}

impl ClassifierKind {
    /// Build an unfitted model of this kind.
    pub fn build(self, params: LinearParams) -> TrainedModel {
        match self {
            ClassifierKind::LogisticRegression => {
                TrainedModel::LogisticRegression(LogisticRegression::new(params))
            }
            ClassifierKind::LinearSvm => TrainedModel::LinearSvm(LinearSvm::new(params)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassifierKind::LogisticRegression => "logistic_regression",
            ClassifierKind::LinearSvm => "linear_svm",
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights and bias of a linear decision function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearModel {
    fn decision(&self, row: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(row)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }

    /// Run `epochs` full-batch steps. `loss_grad(margin_input, label)` returns
    /// d(loss)/d(decision) for one sample.
    fn descend<F>(&mut self, rows: &[&[f64]], labels: &[u8], params: &LinearParams, loss_grad: F)
    where
        F: Fn(f64, u8) -> f64,
    {
        let n_features = self.weights.len();
        let n = rows.len() as f64;
        let sparse: Vec<Vec<(usize, f64)>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, x)| **x != 0.0)
                    .map(|(j, x)| (j, *x))
                    .collect()
            })
            .collect();

        let mut grad_w = vec![0.0; n_features];
        for _ in 0..params.epochs {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for (row, &label) in sparse.iter().zip(labels) {
                let z = row.iter().map(|&(j, x)| self.weights[j] * x).sum::<f64>() + self.bias;
                let g = loss_grad(z, label);
                if g == 0.0 {
                    continue;
                }
                for &(j, x) in row {
                    grad_w[j] += g * x;
                }
                grad_b += g;
            }

            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= params.learning_rate * (g / n + params.l2 * *w);
            }
            self.bias -= params.learning_rate * grad_b / n;
        }
    }
}

fn validate(rows: &[&[f64]], labels: &[u8]) -> Result<usize> {
    if rows.is_empty() {
        return Err(TrainingError::InsufficientData {
            min_samples: 1,
            actual: 0,
        }
        .into());
    }
    if rows.len() != labels.len() {
        return Err(TrainingError::Fit(format!(
            "{} rows but {} labels",
            rows.len(),
            labels.len()
        ))
        .into());
    }
    let width = rows[0].len();
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(TrainingError::Fit(format!(
            "inconsistent row width: expected {width}, found {}",
            row.len()
        ))
        .into());
    }
    if let Some(label) = labels.iter().find(|&&l| l > 1) {
        return Err(TrainingError::Fit(format!("label {label} is not binary")).into());
    }
    Ok(width)
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// L2-regularized logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    model: LinearModel,
    params: LinearParams,
}

impl LogisticRegression {
    pub fn new(params: LinearParams) -> Self {
        Self {
            model: LinearModel::default(),
            params,
        }
    }

    /// Probability of the positive class.
    pub fn positive_probability(&self, row: &[f64]) -> f64 {
        sigmoid(self.model.decision(row))
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LinearParams::default())
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, rows: &[&[f64]], labels: &[u8]) -> Result<()> {
        let width = validate(rows, labels)?;
        self.model = LinearModel {
            weights: vec![0.0; width],
            bias: 0.0,
        };
        let params = self.params;
        self.model
            .descend(rows, labels, &params, |z, y| sigmoid(z) - f64::from(y));
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.positive_probability(row) >= 0.5)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<[f64; 2]> {
        let p = self.positive_probability(row);
        Some([1.0 - p, p])
    }

    fn n_features(&self) -> usize {
        self.model.weights.len()
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}

/// Linear support vector machine trained on the hinge loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvm {
    model: LinearModel,
    params: LinearParams,
}

impl LinearSvm {
    pub fn new(params: LinearParams) -> Self {
        Self {
            model: LinearModel::default(),
            params,
        }
    }

    /// Signed distance-like score; positive means class 1.
    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.model.decision(row)
    }
}

impl Default for LinearSvm {
    fn default() -> Self {
        Self::new(LinearParams::default())
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, rows: &[&[f64]], labels: &[u8]) -> Result<()> {
        let width = validate(rows, labels)?;
        self.model = LinearModel {
            weights: vec![0.0; width],
            bias: 0.0,
        };
        let params = self.params;
        self.model.descend(rows, labels, &params, |z, y| {
            let y = if y == 1 { 1.0 } else { -1.0 };
            if y * z < 1.0 { -y } else { 0.0 }
        });
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.decision_function(row) >= 0.0)
    }

    fn predict_proba(&self, _row: &[f64]) -> Option<[f64; 2]> {
        None
    }

    fn n_features(&self) -> usize {
        self.model.weights.len()
    }

    fn name(&self) -> &'static str {
        "linear_svm"
    }
}

/// A fitted classifier as persisted in the model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    LinearSvm(LinearSvm),
}

impl TrainedModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(model) => model,
            TrainedModel::LinearSvm(model) => model,
        }
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            TrainedModel::LogisticRegression(_) => ClassifierKind::LogisticRegression,
            TrainedModel::LinearSvm(_) => ClassifierKind::LinearSvm,
        }
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, rows: &[&[f64]], labels: &[u8]) -> Result<()> {
        match self {
            TrainedModel::LogisticRegression(model) => model.fit(rows, labels),
            TrainedModel::LinearSvm(model) => model.fit(rows, labels),
        }
    }

    fn predict(&self, row: &[f64]) -> u8 {
        self.inner().predict(row)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<[f64; 2]> {
        self.inner().predict_proba(row)
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_data() -> (Vec<Vec<f64>>, Vec<u8>) {
        let rows = vec![
            vec![1.0, 0.0, 0.1],
            vec![0.9, 0.1, 0.0],
            vec![0.8, 0.0, 0.2],
            vec![0.0, 1.0, 0.1],
            vec![0.1, 0.9, 0.0],
            vec![0.0, 0.8, 0.2],
        ];
        let labels = vec![1, 1, 1, 0, 0, 0];
        (rows, labels)
    }

    fn as_slices(rows: &[Vec<f64>]) -> Vec<&[f64]> {
        rows.iter().map(Vec::as_slice).collect()
    }

    #[test]
    fn test_logistic_regression_separates_toy_data() {
        let (rows, labels) = toy_data();
        let mut model = LogisticRegression::default();
        model.fit(&as_slices(&rows), &labels).unwrap();

        assert_eq!(model.n_features(), 3);
        for (row, &label) in rows.iter().zip(&labels) {
            assert_eq!(model.predict(row), label);
        }

        let proba = model.predict_proba(&[1.0, 0.0, 0.0]).unwrap();
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn test_linear_svm_has_no_probabilities() {
        let (rows, labels) = toy_data();
        let mut model = LinearSvm::default();
        model.fit(&as_slices(&rows), &labels).unwrap();

        for (row, &label) in rows.iter().zip(&labels) {
            assert_eq!(model.predict(row), label);
        }
        assert!(model.predict_proba(&rows[0]).is_none());
        assert!(model.decision_function(&rows[0]) > 0.0);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (rows, labels) = toy_data();
        let mut a = ClassifierKind::LogisticRegression.build(LinearParams::default());
        let mut b = ClassifierKind::LogisticRegression.build(LinearParams::default());
        a.fit(&as_slices(&rows), &labels).unwrap();
        b.fit(&as_slices(&rows), &labels).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.kind(), ClassifierKind::LogisticRegression);
        assert_eq!(a.name(), "logistic_regression");
    }

    #[test]
    fn test_fit_validates_input() {
        let mut model = LogisticRegression::default();

        let rows: [&[f64]; 2] = [&[1.0], &[0.0]];
        let ragged: [&[f64]; 2] = [&[1.0], &[0.0, 1.0]];

        assert!(model.fit(&[], &[]).is_err());
        assert!(model.fit(&rows, &[1]).is_err());
        assert!(model.fit(&ragged, &[1, 0]).is_err());
        assert!(model.fit(&rows, &[2, 0]).is_err());
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(!sigmoid(-1000.0).is_nan());
    }
}
