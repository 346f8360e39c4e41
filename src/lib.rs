#![allow(clippy::many_single_char_names)]
#![warn(missing_docs)]

//! # Residuum
//!
//! Scalar-generic residual models for trajectory optimization and optimal
//! control.
//!
//! A residual is a vector-valued function `r(x, u)` of the state `x` and the
//! control `u` at a node of a trajectory. The enclosing cost framework
//! penalizes its magnitude (e.g., by a weighted squared norm) and a solver
//! (DDP, FDDP, ...) needs its value and its Jacobians `Rx` and `Ru` at every
//! node in every iteration.
//!
//! ## Model and data
//!
//! Every residual is split into two parts:
//!
//! * the *model* (any type implementing [`ResidualModel`]) holds the
//!   parameters of the residual (e.g., a reference) and is immutable during
//!   evaluation,
//! * the *data* ([`ResidualData`]) hold the buffers for the residual vector
//!   and the Jacobians and are created by the model, one per evaluation
//!   context.
//!
//! One model can therefore be evaluated concurrently at many nodes, each with
//! its own data, without any locking.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use residuum::nalgebra as na;
//! use residuum::prelude::*;
//!
//! let state = Arc::new(StateVector::new(4));
//! let residual = ResidualModelControl::new(state, na::dvector![1.0, -1.0]).unwrap();
//!
//! // One data per node.
//! let mut datas: Vec<_> = (0..8)
//!     .map(|_| residual.create_data(DataCollectorEmpty::shared()))
//!     .collect();
//!
//! let x = na::DVector::zeros(4);
//! let u = na::dvector![1.0, 1.0];
//!
//! thread::scope(|s| {
//!     for data in datas.iter_mut() {
//!         let (residual, x, u) = (&residual, &x, &u);
//!         s.spawn(move || {
//!             residual.calc(data, x, u).unwrap();
//!             residual.calc_diff(data, x, u).unwrap();
//!         });
//!     }
//! });
//!
//! for data in datas.iter() {
//!     assert_eq!(data.r, na::dvector![0.0, 2.0]);
//! }
//! ```
//!
//! ## Residuals
//!
//! * [Control](residual::control) -- Deviation of the control from a
//!   reference, used for regularizing control effort.
//!
//! ## Derivatives
//!
//! Jacobians of residuals are computed analytically. The
//! [derivatives](crate::derivatives) module offers finite difference
//! approximations to verify them.
//!
//! ## License
//!
//! Licensed under MIT.

mod core;
pub mod derivatives;
pub mod residual;

pub use self::core::*;
pub use residual::ResidualModelControl;

#[cfg(feature = "testing")]
pub mod testing;

#[cfg(not(feature = "testing"))]
pub(crate) mod testing;

pub use nalgebra;

/// Prelude of the most used types and traits.
pub mod prelude {
    pub use crate::core::{
        DataCollector, DataCollectorEmpty, ResidualBase, ResidualData, ResidualError,
        ResidualModel, State, StateVector,
    };
    pub use crate::residual::ResidualModelControl;
}
