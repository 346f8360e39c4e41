//! Core abstractions and types for residuals.
//!
//! *Users* are mainly interested in the implemented residual models in the
//! [residual](crate::residual) module and in the [`ResidualData`] they write
//! into.
//!
//! Residual *developers* are interested in implementing the [`ResidualModel`]
//! trait and using the tools in the [derivatives](crate::derivatives) module
//! to verify their derivatives.

mod base;
mod data;
mod residual;
mod state;

pub use base::*;
pub use data::*;
pub use residual::*;
pub use state::*;
