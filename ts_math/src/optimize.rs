//! Derivative-free minimisation (Nelder–Mead simplex)

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelderMeadOptions {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Stop when the spread of objective values across the simplex falls below this
    pub tolerance: f64,
    /// Initial step applied to each coordinate when building the simplex
    pub initial_step: f64,
}

impl Default for NelderMeadOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Outcome of a minimisation
#[derive(Debug, Clone, Serialize)]
pub struct Minimum {
    /// Best point found
    pub point: Vec<f64>,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before the iteration cap
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `objective` starting from `start`.
///
/// The objective may return `f64::INFINITY` for infeasible points; the start
/// point itself must evaluate to a finite value.
pub fn nelder_mead<F>(objective: F, start: &[f64], options: NelderMeadOptions) -> Result<Minimum>
where
    F: Fn(&[f64]) -> f64,
{
    let n = start.len();
    let start_value = objective(start);
    if !start_value.is_finite() {
        return Err(MathError::InvalidInput(
            "Objective is not finite at the starting point".to_string(),
        ));
    }
    if n == 0 {
        return Ok(Minimum {
            point: Vec::new(),
            value: start_value,
            iterations: 0,
            converged: true,
        });
    }

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.to_vec(), start_value));
    for i in 0..n {
        let mut vertex = start.to_vec();
        let step = if vertex[i].abs() > 1e-8 {
            options.initial_step * vertex[i].abs()
        } else {
            options.initial_step
        };
        vertex[i] += step;
        let value = objective(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = simplex[0].1;
        let worst = simplex[n].1;
        if worst.is_finite() && (worst - best).abs() <= options.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|(v, _)| v[j]).sum::<f64>() / n as f64)
            .collect();
        let worst_point = simplex[n].0.clone();
        let towards = |coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(worst_point.iter())
                .map(|(c, w)| c + coef * (c - w))
                .collect()
        };

        let reflected = towards(REFLECTION);
        let reflected_value = objective(&reflected);

        if reflected_value < simplex[0].1 {
            let expanded = towards(EXPANSION);
            let expanded_value = objective(&expanded);
            simplex[n] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < simplex[n - 1].1 {
            simplex[n] = (reflected, reflected_value);
            continue;
        }

        let contracted = towards(-CONTRACTION);
        let contracted_value = objective(&contracted);
        if contracted_value < simplex[n].1 {
            simplex[n] = (contracted, contracted_value);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for (vertex, value) in simplex.iter_mut().skip(1) {
            for (x, a) in vertex.iter_mut().zip(anchor.iter()) {
                *x = a + SHRINK * (*x - a);
            }
            *value = objective(vertex);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (point, value) = simplex.swap_remove(0);

    Ok(Minimum {
        point,
        value,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimises_shifted_quadratic() {
        let objective = |x: &[f64]| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2);
        let min = nelder_mead(objective, &[0.0, 0.0], NelderMeadOptions::default()).unwrap();

        assert!(min.converged);
        assert_relative_eq!(min.point[0], 3.0, epsilon = 1e-3);
        assert_relative_eq!(min.point[1], -1.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_infeasible_region() {
        // Minimum of x^2 restricted to x >= 1
        let objective = |x: &[f64]| if x[0] < 1.0 { f64::INFINITY } else { x[0] * x[0] };
        let min = nelder_mead(objective, &[2.0], NelderMeadOptions::default()).unwrap();

        assert!(min.point[0] >= 1.0);
        assert!(min.value < 1.1);
    }

    #[test]
    fn iteration_cap_is_honoured() {
        let objective = |x: &[f64]| (x[0] - 100.0).powi(2);
        let options = NelderMeadOptions {
            max_iterations: 3,
            ..NelderMeadOptions::default()
        };
        let min = nelder_mead(objective, &[0.0], options).unwrap();
        assert!(min.iterations <= 3);
        assert!(!min.converged);
    }

    #[test]
    fn rejects_infeasible_start() {
        let objective = |_: &[f64]| f64::INFINITY;
        assert!(nelder_mead(objective, &[0.0], NelderMeadOptions::default()).is_err());
    }
}
