//! The collection of implemented residual models.

pub mod control;

pub use control::ResidualModelControl;
