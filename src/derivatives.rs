//! Tools for verifying derivatives of residual models.
//!
//! Analytical Jacobians written by hand are easy to get wrong. The
//! [`NumDiff`] approximates them by forward finite differences of
//! [`calc`](ResidualModel::calc) so that they can be compared.

use getset::{CopyGetters, Setters};
use log::trace;
use nalgebra::{convert, storage::StorageMut, DMatrix, Dynamic, RealField, Vector};
use num_traits::{One, Zero};
use thiserror::Error;

use crate::core::{ResidualData, ResidualError, ResidualModel, State};

/// Square root of double precision machine epsilon. This value is a standard
/// constant for epsilons in approximating first-order derivate-based concepts.
pub const EPSILON_SQRT: f64 = 0.000000014901161193847656;

/// Error when approximating the Jacobian matrices.
#[derive(Debug, Error)]
pub enum NumDiffError {
    /// Error that occurred when evaluating the residual.
    #[error("{0}")]
    Residual(#[from] ResidualError),
}

/// Options for [`NumDiff`].
#[derive(Debug, Clone, CopyGetters, Setters)]
#[getset(get_copy = "pub", set = "pub")]
pub struct NumDiffOptions<T: RealField + Copy> {
    /// Relative disturbance used for the finite differences. Default:
    /// `sqrt(EPSILON)`.
    disturbance: T,
}

impl<T: RealField + Copy> Default for NumDiffOptions<T> {
    fn default() -> Self {
        Self {
            disturbance: convert(EPSILON_SQRT),
        }
    }
}

/// Jacobians of a residual approximated by finite differences.
///
/// The state is treated as a vector space, that is, it is disturbed by plain
/// addition in each coordinate of `x`.
#[derive(Debug)]
pub struct NumDiff<T: RealField + Copy> {
    options: NumDiffOptions<T>,
    rx: DMatrix<T>,
    ru: DMatrix<T>,
}

impl<T: RealField + Copy> NumDiff<T> {
    /// Initializes the Jacobians with zeros and default options.
    pub fn zeros<M>(model: &M) -> Self
    where
        M: ResidualModel<Scalar = T>,
    {
        Self::with_options(model, NumDiffOptions::default())
    }

    /// Initializes the Jacobians with zeros and given options.
    pub fn with_options<M>(model: &M, options: NumDiffOptions<T>) -> Self
    where
        M: ResidualModel<Scalar = T>,
    {
        Self {
            options,
            rx: DMatrix::zeros(model.nr(), model.state().nx()),
            ru: DMatrix::zeros(model.nr(), model.nu()),
        }
    }

    /// Approximate the Jacobians of the residual in given point. See
    /// [`compute`](NumDiff::compute) for more details.
    pub fn new<M, Sx, Su>(
        model: &M,
        data: &mut ResidualData<T>,
        x: &mut Vector<T, Dynamic, Sx>,
        u: &mut Vector<T, Dynamic, Su>,
    ) -> Result<Self, NumDiffError>
    where
        M: ResidualModel<Scalar = T>,
        Sx: StorageMut<T, Dynamic>,
        Su: StorageMut<T, Dynamic>,
    {
        let mut num_diff = Self::zeros(model);
        num_diff.compute(model, data, x, u)?;
        Ok(num_diff)
    }

    /// Approximate the Jacobians of the residual in given point.
    ///
    /// The data are used as scratch space. After this method ends, they hold
    /// the residual in `(x, u)`. The parameters `x` and `u` are mutable to
    /// allow temporary mutations avoiding unnecessary allocations, but their
    /// content is exactly the same as before.
    pub fn compute<M, Sx, Su>(
        &mut self,
        model: &M,
        data: &mut ResidualData<T>,
        x: &mut Vector<T, Dynamic, Sx>,
        u: &mut Vector<T, Dynamic, Su>,
    ) -> Result<&mut Self, NumDiffError>
    where
        M: ResidualModel<Scalar = T>,
        Sx: StorageMut<T, Dynamic>,
        Su: StorageMut<T, Dynamic>,
    {
        if u.len() != model.nu() {
            return Err(ResidualError::InvalidControlDimension {
                expected: model.nu(),
            }
            .into());
        }

        if self.rx.ncols() != x.len() {
            self.rx = DMatrix::zeros(model.nr(), x.len());
        }

        let eps = self.options.disturbance;

        model.calc(data, &*x, &*u)?;
        let r0 = data.r.clone();

        for (j, mut col) in self.rx.column_iter_mut().enumerate() {
            let xj = x[j];
            x[j] = xj + step_size(eps, xj);
            // Rounding may change the step actually taken.
            let step = x[j] - xj;

            let result = model.calc(data, &*x, &*u);

            // Restore the original value before propagating the error.
            x[j] = xj;
            result?;

            col.copy_from(&data.r);
            col -= &r0;
            col /= step;
        }

        for (j, mut col) in self.ru.column_iter_mut().enumerate() {
            let uj = u[j];
            u[j] = uj + step_size(eps, uj);
            let step = u[j] - uj;

            let result = model.calc(data, &*x, &*u);

            u[j] = uj;
            result?;

            col.copy_from(&data.r);
            col -= &r0;
            col /= step;
        }

        data.r.copy_from(&r0);

        trace!("numdiff: |Rx| = {}, |Ru| = {}", self.rx.norm(), self.ru.norm());
        Ok(self)
    }

    /// Gets the options.
    pub fn options(&self) -> &NumDiffOptions<T> {
        &self.options
    }

    /// Jacobian with respect to the state.
    pub fn rx(&self) -> &DMatrix<T> {
        &self.rx
    }

    /// Jacobian with respect to the control.
    pub fn ru(&self) -> &DMatrix<T> {
        &self.ru
    }
}

// The step is scaled by the magnitude of the value to keep enough good digits
// in F(x + step) - F(x) for large values.
fn step_size<T: RealField + Copy>(eps: T, value: T) -> T {
    let step = eps * value.abs().max(One::one());

    if Zero::is_zero(&step) {
        eps
    } else {
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataCollectorEmpty, ResidualBase, StateVector};
    use crate::residual::ResidualModelControl;

    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use nalgebra::{dmatrix, dvector, storage::Storage};

    // r = [x0 * u0, u1^2 + x1]
    struct Bilinear {
        base: ResidualBase<StateVector>,
    }

    impl Bilinear {
        fn new() -> Self {
            Self {
                base: ResidualBase::new(Arc::new(StateVector::new(2)), 2, 2, true, false, true),
            }
        }
    }

    impl ResidualModel for Bilinear {
        type Scalar = f64;
        type State = StateVector;

        fn base(&self) -> &ResidualBase<StateVector> {
            &self.base
        }

        fn calc<Sx, Su>(
            &self,
            data: &mut ResidualData<f64>,
            x: &Vector<f64, Dynamic, Sx>,
            u: &Vector<f64, Dynamic, Su>,
        ) -> Result<(), ResidualError>
        where
            Sx: Storage<f64, Dynamic>,
            Su: Storage<f64, Dynamic>,
        {
            data.r[0] = x[0] * u[0];
            data.r[1] = u[1] * u[1] + x[1];
            Ok(())
        }

        fn calc_diff<Sx, Su>(
            &self,
            _data: &mut ResidualData<f64>,
            _x: &Vector<f64, Dynamic, Sx>,
            _u: &Vector<f64, Dynamic, Su>,
        ) -> Result<(), ResidualError>
        where
            Sx: Storage<f64, Dynamic>,
            Su: Storage<f64, Dynamic>,
        {
            Ok(())
        }
    }

    #[test]
    fn bilinear_jacobians() {
        let model = Bilinear::new();
        let mut data = model.create_data(DataCollectorEmpty::shared());
        let mut x = dvector![2.0, -1.0];
        let mut u = dvector![3.0, 0.5];

        let num_diff = NumDiff::new(&model, &mut data, &mut x, &mut u).unwrap();

        assert_abs_diff_eq!(num_diff.rx(), &dmatrix![3.0, 0.0; 0.0, 1.0], epsilon = 10e-6);
        assert_abs_diff_eq!(num_diff.ru(), &dmatrix![2.0, 0.0; 0.0, 1.0], epsilon = 10e-6);

        // Inputs are restored and data hold the residual in the point.
        assert_eq!(x, dvector![2.0, -1.0]);
        assert_eq!(u, dvector![3.0, 0.5]);
        assert_abs_diff_eq!(data.r, dvector![6.0, -0.75]);
    }

    #[test]
    fn control_residual_jacobians() {
        let model =
            ResidualModelControl::new(Arc::new(StateVector::new(6)), dvector![1.0, -2.0, 0.5])
                .unwrap();
        let mut data = model.create_data(DataCollectorEmpty::shared());
        let mut x = dvector![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let mut u = dvector![100.0, 0.0, -3.0];

        let num_diff = NumDiff::new(&model, &mut data, &mut x, &mut u).unwrap();

        assert_abs_diff_eq!(num_diff.ru(), &DMatrix::identity(3, 3), epsilon = 10e-6);
        assert_abs_diff_eq!(num_diff.rx(), &DMatrix::zeros(3, 6), epsilon = 10e-6);
    }

    #[test]
    fn residual_error_is_propagated() {
        let model =
            ResidualModelControl::new(Arc::new(StateVector::new(4)), dvector![1.0, 2.0]).unwrap();
        let mut data = model.create_data(DataCollectorEmpty::shared());
        let mut x = dvector![0.0, 0.0, 0.0, 0.0];
        let mut u = dvector![1.0, 2.0, 3.0];

        let err = NumDiff::new(&model, &mut data, &mut x, &mut u).unwrap_err();

        assert!(matches!(
            err,
            NumDiffError::Residual(ResidualError::InvalidControlDimension { expected: 2 })
        ));
    }

    #[test]
    fn large_values_use_realized_step() {
        let model =
            ResidualModelControl::<f64, _>::with_dim(Arc::new(StateVector::new(4)), 2).unwrap();
        let mut data = model.create_data(DataCollectorEmpty::shared());
        let mut x = dvector![0.0, 0.0, 0.0, 0.0];
        let mut u = dvector![1.0e8 + 0.3, -7.5e7];

        let num_diff = NumDiff::new(&model, &mut data, &mut x, &mut u).unwrap();

        // With zero reference the residual differences are exactly the steps taken.
        assert_eq!(num_diff.ru(), &DMatrix::identity(2, 2));
        assert_eq!(u, dvector![1.0e8 + 0.3, -7.5e7]);
    }

    #[test]
    fn custom_disturbance() {
        let model = Bilinear::new();
        let mut options = NumDiffOptions::<f64>::default();
        options.set_disturbance(1e-4);

        let mut num_diff = NumDiff::with_options(&model, options);
        assert_eq!(num_diff.options().disturbance(), 1e-4);

        let mut data = model.create_data(DataCollectorEmpty::shared());
        let mut x = dvector![1.0, 1.0];
        let mut u = dvector![1.0, 1.0];
        num_diff.compute(&model, &mut data, &mut x, &mut u).unwrap();

        // Forward difference of u1^2 has an error of the size of the step.
        assert_abs_diff_eq!(num_diff.ru()[(1, 1)], 2.0, epsilon = 2e-4);
    }
}
