//! Control residual.
//!
//! The residual penalizes the deviation of the control from a reference,
//! that is
//!
//! ```text
//! r(x, u) = u - u_ref
//! ```
//!
//! It is typically used for regularizing control effort. The residual does
//! not depend on the state and its Jacobian with respect to the control is
//! the identity matrix. Since the Jacobian is constant, it is set once when
//! the data are created and never recomputed.
//!
//! **Important:** Systems without controls (i.e., autonomous systems) are
//! rejected at construction.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use residuum::nalgebra as na;
//! use residuum::prelude::*;
//!
//! let state = Arc::new(StateVector::new(6));
//! let residual = ResidualModelControl::new(state, na::dvector![1.0, 2.0, 3.0]).unwrap();
//!
//! let mut data = residual.create_data(DataCollectorEmpty::shared());
//! let x = na::DVector::zeros(6);
//! let u = na::dvector![0.0, 0.0, 0.0];
//!
//! residual.calc(&mut data, &x, &u).unwrap();
//! residual.calc_diff(&mut data, &x, &u).unwrap();
//!
//! assert_eq!(data.r, na::dvector![-1.0, -2.0, -3.0]);
//! assert_eq!(data.ru, na::DMatrix::identity(3, 3));
//! ```

use std::fmt;
use std::sync::Arc;

use approx::relative_eq;
use log::{debug, trace};
use nalgebra::{
    convert, convert_unchecked, storage::Storage, DMatrix, DVector, Dynamic, RealField, Vector,
};
use num_traits::{One, Zero};

use crate::core::{
    DataCollector, ResidualBase, ResidualData, ResidualError, ResidualModel, State,
};

/// Control residual. See [module](self) documentation for more details.
#[derive(Debug)]
pub struct ResidualModelControl<T: RealField + Copy, S: State> {
    base: ResidualBase<S>,
    uref: DVector<T>,
}

impl<T: RealField + Copy, S: State> ResidualModelControl<T, S> {
    /// Initializes the residual with given reference. The dimension of the
    /// control is the dimension of the reference.
    pub fn new(state: Arc<S>, uref: DVector<T>) -> Result<Self, ResidualError> {
        let nu = uref.len();

        if nu == 0 {
            return Err(ResidualError::Autonomous);
        }

        debug!("control residual with reference: nu = {}", nu);

        Ok(Self {
            base: ResidualBase::new(state, nu, nu, false, false, true),
            uref,
        })
    }

    /// Initializes the residual with given control dimension and zero
    /// reference.
    pub fn with_dim(state: Arc<S>, nu: usize) -> Result<Self, ResidualError> {
        Self::new(state, DVector::zeros(nu))
    }

    /// Initializes the residual with zero reference. The dimension of the
    /// control is the velocity dimension (`nv`) of the state.
    pub fn from_state(state: Arc<S>) -> Result<Self, ResidualError> {
        let nv = state.nv();
        Self::with_dim(state, nv)
    }

    /// Gets the control reference.
    pub fn reference(&self) -> &DVector<T> {
        &self.uref
    }

    /// Sets the control reference.
    ///
    /// The reference must have the control dimension of the residual,
    /// otherwise the current reference is kept and an error is returned.
    pub fn set_reference(&mut self, uref: DVector<T>) -> Result<(), ResidualError> {
        let nu = self.base.nu();

        if uref.len() != nu {
            return Err(ResidualError::InvalidReferenceDimension {
                provided: uref.len(),
                expected: nu,
            });
        }

        debug!("control residual reference updated: nu = {}", nu);
        self.uref = uref;
        Ok(())
    }

    /// Converts the residual to another scalar type. The state is shared with
    /// the original residual.
    ///
    /// The reference is converted through double precision.
    pub fn cast<U: RealField + Copy>(&self) -> ResidualModelControl<U, S> {
        ResidualModelControl {
            base: self.base.clone(),
            uref: self.uref.map(|ui| convert(convert_unchecked::<T, f64>(ui))),
        }
    }
}

impl<T: RealField + Copy, S: State> Clone for ResidualModelControl<T, S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            uref: self.uref.clone(),
        }
    }
}

impl<T: RealField + Copy, S: State> ResidualModel for ResidualModelControl<T, S> {
    type Scalar = T;
    type State = S;

    fn base(&self) -> &ResidualBase<S> {
        &self.base
    }

    fn calc<Sx, Su>(
        &self,
        data: &mut ResidualData<T>,
        _x: &Vector<T, Dynamic, Sx>,
        u: &Vector<T, Dynamic, Su>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<T, Dynamic>,
        Su: Storage<T, Dynamic>,
    {
        let nu = self.base.nu();

        if u.len() != nu {
            return Err(ResidualError::InvalidControlDimension { expected: nu });
        }

        if data.r.len() != self.base.nr() {
            return Err(ResidualError::InvalidDataDimension {
                provided: data.r.len(),
                expected: self.base.nr(),
            });
        }

        data.r.copy_from(u);
        data.r -= &self.uref;

        trace!("control residual: r = {:?}", data.r.as_slice());
        Ok(())
    }

    fn calc_terminal<Sx>(
        &self,
        data: &mut ResidualData<T>,
        _x: &Vector<T, Dynamic, Sx>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<T, Dynamic>,
    {
        if data.r.len() != self.base.nr() {
            return Err(ResidualError::InvalidDataDimension {
                provided: data.r.len(),
                expected: self.base.nr(),
            });
        }

        data.r.fill(Zero::zero());
        Ok(())
    }

    fn calc_diff<Sx, Su>(
        &self,
        data: &mut ResidualData<T>,
        _x: &Vector<T, Dynamic, Sx>,
        _u: &Vector<T, Dynamic, Su>,
    ) -> Result<(), ResidualError>
    where
        Sx: Storage<T, Dynamic>,
        Su: Storage<T, Dynamic>,
    {
        // The Jacobian is constant and was set in create_data.
        let nu = self.base.nu();
        debug_assert!(
            data.ru.shape() == (nu, nu) && relative_eq!(data.ru, DMatrix::identity(nu, nu)),
            "Ru has wrong value"
        );
        Ok(())
    }

    fn create_data(&self, collector: Arc<dyn DataCollector>) -> ResidualData<T> {
        let mut data = ResidualData::new(self, collector);
        data.ru.fill_diagonal(One::one());

        debug!(
            "control residual data created: nr = {}, nu = {}",
            self.base.nr(),
            self.base.nu()
        );
        data
    }
}

impl<T: RealField + Copy, S: State> fmt::Display for ResidualModelControl<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResidualModelControl")
    }
}
