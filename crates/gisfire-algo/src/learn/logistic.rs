//! L2-regularised logistic regression fitted with L-BFGS.
//!
//! Minimises
//!
//! ```text
//! ½‖θ‖² + C · Σᵢ log(1 + exp(-yᵢ · θᵀ[xᵢ, 1]))      yᵢ ∈ {-1, +1}
//! ```
//!
//! where θ holds the coefficients followed by the intercept, so the
//! intercept is penalised like any other weight.

use anyhow::{anyhow, bail, Result};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use tracing::debug;

/// Inverse regularisation strength.
pub const C: f64 = 1.0;
const MAX_ITERATIONS: u64 = 1_000;
const HISTORY: usize = 7;

/// `log(1 + exp(-m))` without overflow.
fn log_loss(margin: f64) -> f64 {
    if margin > 0.0 {
        (-margin).exp().ln_1p()
    } else {
        -margin + margin.exp().ln_1p()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

struct LogisticProblem<'a> {
    x: &'a [Vec<f64>],
    /// ±1
    y: Vec<f64>,
    c: f64,
}

impl LogisticProblem<'_> {
    fn score(theta: &[f64], row: &[f64]) -> f64 {
        let (weights, intercept) = theta.split_at(row.len());
        row.iter().zip(weights).map(|(x, w)| x * w).sum::<f64>() + intercept[0]
    }
}

impl CostFunction for LogisticProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let penalty = 0.5 * theta.iter().map(|t| t * t).sum::<f64>();
        let loss: f64 = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(row, y)| log_loss(y * Self::score(theta, row)))
            .sum();
        Ok(penalty + self.c * loss)
    }
}

impl Gradient for LogisticProblem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let mut grad = theta.clone();
        let n = theta.len() - 1;
        for (row, y) in self.x.iter().zip(&self.y) {
            // d/dz log(1 + exp(-y z)) = -y σ(-y z)
            let g = -y * sigmoid(-y * Self::score(theta, row)) * self.c;
            for (gi, xi) in grad[..n].iter_mut().zip(row) {
                *gi += g * xi;
            }
            grad[n] += g;
        }
        Ok(grad)
    }
}

/// Fitted binary classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    /// Fit with the default regularisation [`C`].
    pub fn fit(x: &[Vec<f64>], y: &[bool]) -> Result<Self> {
        Self::fit_with(x, y, C)
    }

    pub fn fit_with(x: &[Vec<f64>], y: &[bool], c: f64) -> Result<Self> {
        if x.is_empty() {
            bail!("cannot fit a logistic regression on zero samples");
        }
        if x.len() != y.len() {
            bail!("{} samples but {} labels", x.len(), y.len());
        }
        let features = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != features) {
            bail!("ragged samples: {} vs {} features", row.len(), features);
        }

        let problem = LogisticProblem {
            x,
            y: y.iter().map(|&fire| if fire { 1.0 } else { -1.0 }).collect(),
            c,
        };
        let solver = LBFGS::new(MoreThuenteLineSearch::new(), HISTORY)
            .with_tolerance_grad(1e-6)?
            .with_tolerance_cost(1e-12)?;
        let result = Executor::new(problem, solver)
            .configure(|state| state.param(vec![0.0; features + 1]).max_iters(MAX_ITERATIONS))
            .run()
            .map_err(|e| anyhow!("logistic regression failed: {e}"))?;

        let state = result.state();
        debug!(
            iterations = state.get_iter(),
            cost = state.get_best_cost(),
            "logistic regression converged"
        );
        let mut theta = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| anyhow!("solver returned no parameters"))?;
        let intercept = theta.pop().unwrap_or_default();
        Ok(Self {
            coefficients: theta,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Probability of fire.
    pub fn probability(&self, row: &[f64]) -> f64 {
        let z: f64 = row
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }

    /// Class predictions at the 0.5 threshold.
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<bool> {
        x.iter().map(|row| self.probability(row) > 0.5).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_loss_is_stable_for_large_margins() {
        assert!((log_loss(0.0) - std::f64::consts::LN_2).abs() < 1e-12);
        assert!(log_loss(800.0).is_finite());
        assert!((log_loss(-800.0) - 800.0).abs() < 1e-9);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let x = vec![vec![1.0, -2.0], vec![0.5, 0.3], vec![-1.5, 2.0]];
        let problem = LogisticProblem {
            x: &x,
            y: vec![1.0, -1.0, 1.0],
            c: 1.0,
        };
        let theta = vec![0.3, -0.2, 0.1];
        let grad = problem.gradient(&theta).unwrap();
        let eps = 1e-6;
        for i in 0..theta.len() {
            let mut plus = theta.clone();
            plus[i] += eps;
            let mut minus = theta.clone();
            minus[i] -= eps;
            let numeric =
                (problem.cost(&plus).unwrap() - problem.cost(&minus).unwrap()) / (2.0 * eps);
            assert!((numeric - grad[i]).abs() < 1e-6, "component {i}");
        }
    }

    #[test]
    fn separable_points_are_classified() {
        let x: Vec<Vec<f64>> = [-3.0, -2.0, -1.5, -1.0, 1.0, 1.5, 2.0, 3.0]
            .iter()
            .map(|v| vec![*v])
            .collect();
        let y = vec![false, false, false, false, true, true, true, true];
        let model = LogisticRegression::fit(&x, &y).unwrap();
        assert!(model.coefficients()[0] > 0.0);
        assert_eq!(model.predict(&x), y);
        assert!(model.intercept().abs() < 1e-3);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(LogisticRegression::fit(&[], &[]).is_err());
    }
}
