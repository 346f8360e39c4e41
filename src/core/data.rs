//! Per-evaluation data of residual models.

use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector, RealField};

use super::residual::ResidualModel;
use super::state::State;

/// Opaque context shared by all the data objects evaluated at the same node.
///
/// Residuals that need quantities computed elsewhere (e.g., by the dynamics)
/// get them from the collector. Residual models in this crate pass it through
/// without interpretation.
pub trait DataCollector: fmt::Debug + Send + Sync {}

/// Collector without any content.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataCollectorEmpty;

impl DataCollectorEmpty {
    /// Creates a handle to an empty collector.
    pub fn shared() -> Arc<dyn DataCollector> {
        Arc::new(Self)
    }
}

impl DataCollector for DataCollectorEmpty {}

/// Buffers for a residual evaluated at one node.
///
/// A data object is created by [`ResidualModel::create_data`] and is meant to
/// be owned by exactly one evaluation context. The model is only read during
/// evaluation, so many data objects can be evaluated concurrently with the
/// same model.
#[derive(Debug, Clone)]
pub struct ResidualData<T: RealField + Copy> {
    /// Residual vector.
    pub r: DVector<T>,
    /// Jacobian of the residual with respect to the state.
    pub rx: DMatrix<T>,
    /// Jacobian of the residual with respect to the control.
    pub ru: DMatrix<T>,
    collector: Arc<dyn DataCollector>,
}

impl<T: RealField + Copy> ResidualData<T> {
    /// Allocates zeroed buffers sized for given model.
    pub fn new<M>(model: &M, collector: Arc<dyn DataCollector>) -> Self
    where
        M: ResidualModel<Scalar = T> + ?Sized,
    {
        let nr = model.nr();
        let ndx = model.state().ndx();
        let nu = model.nu();

        Self {
            r: DVector::zeros(nr),
            rx: DMatrix::zeros(nr, ndx),
            ru: DMatrix::zeros(nr, nu),
            collector,
        }
    }

    /// Gets the collector this data is bound to.
    pub fn collector(&self) -> &Arc<dyn DataCollector> {
        &self.collector
    }
}
