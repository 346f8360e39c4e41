use thiserror::Error;

/// Error encountered while constructing or evaluating a residual.
///
/// All variants are invalid-argument conditions: they are caused by the
/// caller passing inconsistent dimensions and are reported before any data is
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResidualError {
    /// The control dimension is zero, which means that the system is
    /// autonomous and a control residual makes no sense for it.
    #[error(
        "invalid argument: it seems to be an autonomous system, if so, don't add this residual function"
    )]
    Autonomous,
    /// The control vector does not have the dimension of the residual model.
    #[error("invalid argument: u has wrong dimension (it should be {expected})")]
    InvalidControlDimension {
        /// Control dimension of the model.
        expected: usize,
    },
    /// The reference vector does not have the dimension of the residual
    /// model.
    #[error(
        "invalid argument: the control reference has wrong dimension ({provided} provided - it should be {expected})"
    )]
    InvalidReferenceDimension {
        /// Length of the given reference.
        provided: usize,
        /// Control dimension of the model.
        expected: usize,
    },
    /// The data object was not created for a model of this residual
    /// dimension.
    #[error("invalid argument: data has wrong residual dimension ({provided} provided - it should be {expected})")]
    InvalidDataDimension {
        /// Residual length of the given data.
        provided: usize,
        /// Residual dimension of the model.
        expected: usize,
    },
}

impl ResidualError {
    /// Returns `true` if the error is caused by an invalid argument passed by
    /// the caller. This holds for every variant.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ResidualError::Autonomous
                | ResidualError::InvalidControlDimension { .. }
                | ResidualError::InvalidReferenceDimension { .. }
                | ResidualError::InvalidDataDimension { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_report_dimensions() {
        let err = ResidualError::InvalidReferenceDimension {
            provided: 2,
            expected: 3,
        };
        assert_eq!(
            err.to_string(),
            "invalid argument: the control reference has wrong dimension (2 provided - it should be 3)"
        );

        let err = ResidualError::InvalidControlDimension { expected: 4 };
        assert_eq!(
            err.to_string(),
            "invalid argument: u has wrong dimension (it should be 4)"
        );
    }

    #[test]
    fn autonomous_message() {
        let message = ResidualError::Autonomous.to_string();
        assert!(message.contains("autonomous system"));
        assert!(ResidualError::Autonomous.is_invalid_argument());
    }
}
