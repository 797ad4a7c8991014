use thiserror::Error;

/// Errors reported at the boundary of the pooling ops.
///
/// Every precondition is checked once before the kernel runs, so a value of
/// this type always means the inputs were rejected and nothing was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("Shape mismatch in operation '{operation}': expected {expected}, got {got}")]
    ShapeMismatch {
        operation: String,
        expected: String,
        got: String,
    },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape {
        operation: String,
        reason: String,
        shape: Option<Vec<usize>>,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error(
        "Batch index {batch_index} of region {region} out of range in operation '{operation}' (batch size {batch_size})"
    )]
    BatchIndexOutOfRange {
        operation: String,
        region: usize,
        batch_index: i32,
        batch_size: usize,
    },

    #[error(
        "Index overflow in operation '{operation}': {elements} elements cannot be addressed by i32 indices"
    )]
    IndexOverflow { operation: String, elements: usize },
}

impl TensorError {
    /// Create a shape mismatch error with context
    pub fn shape_mismatch(operation: &str, expected: &str, got: &str) -> Self {
        Self::ShapeMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Create an invalid shape error with operation context
    pub fn invalid_shape(operation: &str, expected: &str, got: &str) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: format!("Expected {}, got {}", expected, got),
            shape: None,
        }
    }

    /// Create an invalid shape error that records the offending dimensions
    pub fn invalid_shape_dims(operation: &str, reason: &str, dims: &[usize]) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: reason.to_string(),
            shape: Some(dims.to_vec()),
        }
    }

    /// Create an invalid argument error with operation context
    pub fn invalid_argument_op(operation: &str, reason: &str) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn batch_index_out_of_range(
        operation: &str,
        region: usize,
        batch_index: i32,
        batch_size: usize,
    ) -> Self {
        Self::BatchIndexOutOfRange {
            operation: operation.to_string(),
            region,
            batch_index,
            batch_size,
        }
    }

    pub fn index_overflow(operation: &str, elements: usize) -> Self {
        Self::IndexOverflow {
            operation: operation.to_string(),
            elements,
        }
    }

    /// Name of the operation that rejected its inputs
    pub fn operation(&self) -> &str {
        match self {
            Self::ShapeMismatch { operation, .. }
            | Self::InvalidShape { operation, .. }
            | Self::InvalidArgument { operation, .. }
            | Self::BatchIndexOutOfRange { operation, .. }
            | Self::IndexOverflow { operation, .. } => operation,
        }
    }
}

/// Result type for tensor operations
pub type Result<T> = std::result::Result<T, TensorError>;
