//! Abstractions for defining residual models.
//!
//! # Defining a residual
//!
//! A residual is any type that implements the [`ResidualModel`] trait. The
//! metadata common to all residuals (the state, dimensions and which parts of
//! the input the residual depends on) are stored in [`ResidualBase`] that is
//! returned by [`base`](ResidualModel::base). The only required evaluation
//! methods are [`calc`](ResidualModel::calc) and
//! [`calc_diff`](ResidualModel::calc_diff).
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use residuum::nalgebra as na;
//! use residuum::prelude::*;
//! use na::{storage::Storage, Dynamic, Vector};
//!
//! // Residual that measures the first control input.
//! struct FirstControl {
//!     base: ResidualBase<StateVector>,
//! }
//!
//! impl ResidualModel for FirstControl {
//!     // The numeric type. Usually f64 or f32.
//!     type Scalar = f64;
//!     type State = StateVector;
//!
//!     fn base(&self) -> &ResidualBase<StateVector> {
//!         &self.base
//!     }
//!
//!     fn calc<Sx, Su>(
//!         &self,
//!         data: &mut ResidualData<f64>,
//!         _x: &Vector<f64, Dynamic, Sx>,
//!         u: &Vector<f64, Dynamic, Su>,
//!     ) -> Result<(), ResidualError>
//!     where
//!         Sx: Storage<f64, Dynamic>,
//!         Su: Storage<f64, Dynamic>,
//!     {
//!         data.r[0] = u[0];
//!         Ok(())
//!     }
//!
//!     fn calc_diff<Sx, Su>(
//!         &self,
//!         data: &mut ResidualData<f64>,
//!         _x: &Vector<f64, Dynamic, Sx>,
//!         _u: &Vector<f64, Dynamic, Su>,
//!     ) -> Result<(), ResidualError>
//!     where
//!         Sx: Storage<f64, Dynamic>,
//!         Su: Storage<f64, Dynamic>,
//!     {
//!         data.ru[(0, 0)] = 1.0;
//!         Ok(())
//!     }
//! }
//!
//! let state = Arc::new(StateVector::new(4));
//! let residual = FirstControl {
//!     base: ResidualBase::new(state, 1, 2, false, false, true),
//! };
//!
//! let mut data = residual.create_data(DataCollectorEmpty::shared());
//! let x = na::dvector![0.0, 0.0, 0.0, 0.0];
//! let u = na::dvector![3.0, -1.0];
//! residual.calc(&mut data, &x, &u).unwrap();
//!
//! assert_eq!(data.r[0], 3.0);
//! ```

use std::sync::Arc;

use getset::{CopyGetters, Getters};
use nalgebra::{storage::Storage, Dynamic, RealField, Vector};

use super::{
    base::ResidualError,
    data::{DataCollector, ResidualData},
    state::State,
};

/// Metadata shared by all residual models.
#[derive(Debug, Getters, CopyGetters)]
pub struct ResidualBase<S> {
    /// State of the system the residual is defined for.
    #[getset(get = "pub")]
    state: Arc<S>,
    /// Dimension of the residual vector.
    #[getset(get_copy = "pub")]
    nr: usize,
    /// Dimension of the control vector.
    #[getset(get_copy = "pub")]
    nu: usize,
    /// Whether the residual depends on the configuration part of the state.
    #[getset(get_copy = "pub")]
    q_dependent: bool,
    /// Whether the residual depends on the velocity part of the state.
    #[getset(get_copy = "pub")]
    v_dependent: bool,
    /// Whether the residual depends on the control.
    #[getset(get_copy = "pub")]
    u_dependent: bool,
}

impl<S> ResidualBase<S> {
    /// Initializes the metadata.
    pub fn new(
        state: Arc<S>,
        nr: usize,
        nu: usize,
        q_dependent: bool,
        v_dependent: bool,
        u_dependent: bool,
    ) -> Self {
        Self {
            state,
            nr,
            nu,
            q_dependent,
            v_dependent,
            u_dependent,
        }
    }
}

impl<S> Clone for ResidualBase<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            nr: self.nr,
            nu: self.nu,
            q_dependent: self.q_dependent,
            v_dependent: self.v_dependent,
            u_dependent: self.u_dependent,
        }
    }
}

/// The trait for residual models.
///
/// A model is immutable during evaluation. All the results are written into a
/// [`ResidualData`] created by [`create_data`](ResidualModel::create_data),
/// one per evaluation context (e.g., a node of a trajectory).
pub trait ResidualModel {
    /// Type of the scalar, usually f32 or f64.
    type Scalar: RealField + Copy;

    /// Type of the state.
    type State: State;

    /// Get the metadata of the residual.
    fn base(&self) -> &ResidualBase<Self::State>;

    /// Get the state of the system.
    fn state(&self) -> &Arc<Self::State> {
        self.base().state()
    }

    /// Dimension of the residual vector.
    fn nr(&self) -> usize {
        self.base().nr()
    }

    /// Dimension of the control vector.
    fn nu(&self) -> usize {
        self.base().nu()
    }

    /// Whether the residual depends on the configuration.
    fn q_dependent(&self) -> bool {
        self.base().q_dependent()
    }

    /// Whether the residual depends on the velocity.
    fn v_dependent(&self) -> bool {
        self.base().v_dependent()
    }

    /// Whether the residual depends on the control.
    fn u_dependent(&self) -> bool {
        self.base().u_dependent()
    }

    /// Compute the residual vector for given state and control.
    fn calc<Sx, Su>(
        &self,
        data: &mut ResidualData<Self::Scalar>,
        x: &Vector<Self::Scalar, Dynamic, Sx>,
        u: &Vector<Self::Scalar, Dynamic, Su>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<Self::Scalar, Dynamic>,
        Su: Storage<Self::Scalar, Dynamic>;

    /// Compute the residual vector for nodes without control, such as the
    /// terminal node. If not overridden, the data are left untouched.
    fn calc_terminal<Sx>(
        &self,
        _data: &mut ResidualData<Self::Scalar>,
        _x: &Vector<Self::Scalar, Dynamic, Sx>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<Self::Scalar, Dynamic>,
    {
        Ok(())
    }

    /// Compute the Jacobians of the residual for given state and control.
    ///
    /// The implementations _can_ assume that [`calc`](ResidualModel::calc)
    /// was called with the same arguments before.
    fn calc_diff<Sx, Su>(
        &self,
        data: &mut ResidualData<Self::Scalar>,
        x: &Vector<Self::Scalar, Dynamic, Sx>,
        u: &Vector<Self::Scalar, Dynamic, Su>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<Self::Scalar, Dynamic>,
        Su: Storage<Self::Scalar, Dynamic>;

    /// Compute the Jacobians of the residual for nodes without control. If
    /// not overridden, the data are left untouched.
    fn calc_diff_terminal<Sx>(
        &self,
        _data: &mut ResidualData<Self::Scalar>,
        _x: &Vector<Self::Scalar, Dynamic, Sx>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<Self::Scalar, Dynamic>,
    {
        Ok(())
    }

    /// Create the data for one evaluation context. If not overridden, all
    /// buffers are zero.
    fn create_data(&self, collector: Arc<dyn DataCollector>) -> ResidualData<Self::Scalar> {
        ResidualData::new(self, collector)
    }
}
