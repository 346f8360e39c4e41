//! State abstraction consumed by residual models.
//!
//! Residuals only need to know the sizes of the state: the dimension of its
//! representation (`nx`), the dimension of its tangent space (`ndx`) and the
//! split into configuration (`nq`) and velocity (`nv`) parts. The velocity
//! dimension is the default number of controls of a fully actuated system.
//!
//! ```rust
//! use residuum::{State, StateVector};
//!
//! let state = StateVector::new(6);
//!
//! assert_eq!(state.nx(), 6);
//! assert_eq!(state.ndx(), 6);
//! assert_eq!(state.nv(), 3);
//! ```

use getset::CopyGetters;

/// The trait for state representations.
///
/// Manifold operations (integration, difference) are the business of the
/// state implementation and are not required by residual models.
pub trait State {
    /// Dimension of the state representation.
    fn nx(&self) -> usize;

    /// Dimension of the tangent space of the state.
    fn ndx(&self) -> usize;

    /// Dimension of the configuration part.
    fn nq(&self) -> usize;

    /// Dimension of the velocity part of the tangent space.
    fn nv(&self) -> usize;
}

/// Euclidean state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct StateVector {
    /// Dimension of the state vector.
    nx: usize,
    /// Dimension of the tangent space.
    ndx: usize,
    /// Dimension of the configuration part.
    nq: usize,
    /// Dimension of the velocity part.
    nv: usize,
}

impl StateVector {
    /// Creates a vector state of given dimension. The tangent space has the
    /// same dimension and both configuration and velocity take one half of
    /// it.
    pub fn new(nx: usize) -> Self {
        Self {
            nx,
            ndx: nx,
            nq: nx / 2,
            nv: nx / 2,
        }
    }

    /// Creates a state with explicit configuration and velocity dimensions.
    pub fn with_parts(nq: usize, nv: usize) -> Self {
        Self {
            nx: nq + nv,
            ndx: 2 * nv,
            nq,
            nv,
        }
    }
}

// Getters generated by getset are inherent, so these calls do not recurse.
impl State for StateVector {
    fn nx(&self) -> usize {
        self.nx()
    }

    fn ndx(&self) -> usize {
        self.ndx()
    }

    fn nq(&self) -> usize {
        self.nq()
    }

    fn nv(&self) -> usize {
        self.nv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_state_halves_tangent() {
        let state = StateVector::new(7);

        assert_eq!(State::nx(&state), 7);
        assert_eq!(State::ndx(&state), 7);
        assert_eq!(State::nq(&state), 3);
        assert_eq!(State::nv(&state), 3);
    }

    #[test]
    fn state_with_parts() {
        let state = StateVector::with_parts(7, 6);

        assert_eq!(State::nx(&state), 13);
        assert_eq!(State::ndx(&state), 12);
        assert_eq!(State::nv(&state), 6);
    }
}
