//! Testing utilities useful for debugging and smoke testing residual models.
//!
//! [`check_derivatives`] is recommended for every new residual. It compares
//! the analytical Jacobians from [`calc_diff`](ResidualModel::calc_diff) with
//! the finite difference approximation in random points.

#![allow(unused)]

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::core::{DataCollectorEmpty, ResidualModel, State};
use crate::derivatives::{NumDiff, NumDiffError};

/// Samples a control vector with standard normal entries.
pub fn random_control<R: Rng + ?Sized>(nu: usize, rng: &mut R) -> DVector<f64> {
    DVector::from_iterator(nu, (0..nu).map(|_| rng.sample(StandardNormal)))
}

/// Samples a state vector with standard normal entries.
///
/// Only meaningful for states that are vector spaces.
pub fn random_state<S, R>(state: &S, rng: &mut R) -> DVector<f64>
where
    S: State + ?Sized,
    R: Rng + ?Sized,
{
    DVector::from_iterator(state.nx(), (0..state.nx()).map(|_| rng.sample(StandardNormal)))
}

/// Maximal absolute deviation between analytical and approximated Jacobians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativesDeviation {
    /// Deviation of the Jacobian with respect to the state.
    pub rx: f64,
    /// Deviation of the Jacobian with respect to the control.
    pub ru: f64,
}

impl DerivativesDeviation {
    /// Test if both deviations are within the tolerance `eps`.
    pub fn is_within(&self, eps: f64) -> bool {
        self.rx <= eps && self.ru <= eps
    }
}

/// Compares the analytical Jacobians of the residual with finite differences
/// in the point `(x, u)`.
///
/// The state must be a vector space (`nx == ndx`), otherwise the Jacobian with
/// respect to the state is not compared and its deviation is reported as
/// zero.
pub fn check_derivatives<M>(
    model: &M,
    x: &DVector<f64>,
    u: &DVector<f64>,
) -> Result<DerivativesDeviation, NumDiffError>
where
    M: ResidualModel<Scalar = f64>,
{
    let mut data = model.create_data(DataCollectorEmpty::shared());
    model.calc(&mut data, x, u)?;
    model.calc_diff(&mut data, x, u)?;

    let mut scratch = model.create_data(DataCollectorEmpty::shared());
    let mut x = x.clone_owned();
    let mut u = u.clone_owned();
    let num_diff = NumDiff::new(model, &mut scratch, &mut x, &mut u)?;

    let rx = if model.state().nx() == model.state().ndx() {
        max_abs_diff(&data.rx, num_diff.rx())
    } else {
        0.0
    };
    let ru = max_abs_diff(&data.ru, num_diff.ru());

    Ok(DerivativesDeviation { rx, ru })
}

fn max_abs_diff(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi).abs())
        .fold(0.0, f64::max)
}
