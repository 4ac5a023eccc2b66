//! Multinomial logistic regression trained by full-batch gradient descent.

use crate::error::ClassifierError;

use super::tfidf::SparseVector;

/// Solver settings for [`SoftmaxRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    /// Inverse L2 penalty strength.
    pub regularization: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Convergence threshold on the largest gradient component.
    pub tolerance: f64,
}

/// Linear scores per class, turned into probabilities by softmax.
#[derive(Debug, Clone)]
pub struct SoftmaxRegression {
    /// `weights[class][feature]`.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    n_features: usize,
    iterations: usize,
    converged: bool,
}

impl SoftmaxRegression {
    /// Fit on sparse samples with class indices in `0..n_classes`.
    ///
    /// Minimises mean cross-entropy plus `||W||² / (2·C·n)`; the intercepts
    /// are not penalised. Starts from all-zero parameters so the result is
    /// fully determined by the inputs.
    pub fn fit(
        samples: &[SparseVector],
        targets: &[usize],
        n_classes: usize,
        n_features: usize,
        params: &SolverParams,
    ) -> Self {
        let mut model = Self {
            weights: vec![vec![0.0; n_features]; n_classes],
            bias: vec![0.0; n_classes],
            n_features,
            iterations: 0,
            converged: false,
        };
        if samples.is_empty() || n_classes == 0 {
            return model;
        }

        let n = samples.len() as f64;
        let penalty = 1.0 / (params.regularization * n);

        for iter in 0..params.max_iter {
            let mut grad_w: Vec<Vec<f64>> = model
                .weights
                .iter()
                .map(|row| row.iter().map(|w| w * penalty).collect())
                .collect();
            let mut grad_b = vec![0.0; n_classes];

            for (x, &y) in samples.iter().zip(targets) {
                let mut probs = model.raw_scores(x);
                softmax_in_place(&mut probs);
                for (class, p) in probs.iter().enumerate() {
                    let observed = if class == y { 1.0 } else { 0.0 };
                    let delta = (p - observed) / n;
                    grad_b[class] += delta;
                    for &(j, v) in x {
                        grad_w[class][j] += delta * v;
                    }
                }
            }

            let max_grad = grad_w
                .iter()
                .flatten()
                .chain(grad_b.iter())
                .fold(0.0_f64, |acc, g| acc.max(g.abs()));

            for (row, grad_row) in model.weights.iter_mut().zip(&grad_w) {
                for (w, g) in row.iter_mut().zip(grad_row) {
                    *w -= params.learning_rate * g;
                }
            }
            for (b, g) in model.bias.iter_mut().zip(&grad_b) {
                *b -= params.learning_rate * g;
            }

            model.iterations = iter + 1;
            if max_grad < params.tolerance {
                model.converged = true;
                break;
            }
        }

        tracing::debug!(
            iterations = model.iterations,
            converged = model.converged,
            "Softmax regression fitted"
        );
        model
    }

    /// Class probabilities for one sample, in class-index order.
    pub fn predict_proba(&self, x: &[(usize, f64)]) -> Result<Vec<f64>, ClassifierError> {
        if let Some(&(j, _)) = x.iter().find(|(j, _)| *j >= self.n_features) {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.n_features,
                found: j,
            });
        }
        let mut scores = self.raw_scores(x);
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::NonFinite);
        }
        softmax_in_place(&mut scores);
        if scores.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::NonFinite);
        }
        Ok(scores)
    }

    pub fn n_classes(&self) -> usize {
        self.bias.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    fn raw_scores(&self, x: &[(usize, f64)]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| b + x.iter().map(|&(j, v)| row[j] * v).sum::<f64>())
            .collect()
    }
}

fn softmax_in_place(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        total += *s;
    }
    for s in scores.iter_mut() {
        *s /= total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SolverParams {
        SolverParams {
            regularization: 1.0,
            learning_rate: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }

    /// Two separable classes on two features.
    fn toy() -> (Vec<SparseVector>, Vec<usize>) {
        let samples = vec![
            vec![(0, 1.0)],
            vec![(0, 0.9), (1, 0.1)],
            vec![(1, 1.0)],
            vec![(0, 0.1), (1, 0.9)],
        ];
        (samples, vec![0, 0, 1, 1])
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let mut s = vec![1.0, 2.0, 3.0];
        softmax_in_place(&mut s);
        assert!((s.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(s[2] > s[1] && s[1] > s[0]);
    }

    #[test]
    fn test_softmax_handles_large_scores() {
        let mut s = vec![1000.0, 1000.0];
        softmax_in_place(&mut s);
        assert!((s[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fit_separates_toy_classes() {
        let (samples, targets) = toy();
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &params());
        let p0 = model.predict_proba(&[(0, 1.0)]).unwrap();
        let p1 = model.predict_proba(&[(1, 1.0)]).unwrap();
        assert!(p0[0] > 0.5);
        assert!(p1[1] > 0.5);
    }

    #[test]
    fn test_fit_converges_on_toy_data() {
        let (samples, targets) = toy();
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &params());
        assert!(model.converged());
        assert!(model.iterations() < 1000);
    }

    #[test]
    fn test_iteration_cap_respected() {
        let (samples, targets) = toy();
        let capped = SolverParams {
            max_iter: 3,
            tolerance: 0.0,
            ..params()
        };
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &capped);
        assert_eq!(model.iterations(), 3);
        assert!(!model.converged());
    }

    #[test]
    fn test_empty_features_yield_prior() {
        let (samples, targets) = toy();
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &params());
        let p = model.predict_proba(&[]).unwrap();
        // Balanced classes give a near-uniform prior.
        assert!((p[0] - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_dimension_mismatch() {
        let (samples, targets) = toy();
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &params());
        let err = model.predict_proba(&[(5, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::DimensionMismatch {
                expected: 2,
                found: 5
            }
        );
    }

    #[test]
    fn test_non_finite_input() {
        let (samples, targets) = toy();
        let model = SoftmaxRegression::fit(&samples, &targets, 2, 2, &params());
        let err = model.predict_proba(&[(0, f64::NAN)]).unwrap_err();
        assert_eq!(err, ClassifierError::NonFinite);
    }

    #[test]
    fn test_fit_without_samples() {
        let model = SoftmaxRegression::fit(&[], &[], 3, 4, &params());
        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_features(), 4);
        assert_eq!(model.iterations(), 0);
        let p = model.predict_proba(&[]).unwrap();
        assert!(p.iter().all(|x| (x - 1.0 / 3.0).abs() < 1e-12));
    }
}
