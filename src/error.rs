use thiserror::Error;

/// Failures of the speed-profile pipeline.
///
/// Every variant is a caller-input problem; nothing here is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("trajectory has {len} sample(s), at least 2 are needed to estimate speed")]
    EmptyInput { len: usize },

    #[error("trajectory has no pair of consecutive valid samples")]
    NoValidPairs,
}

impl ProfileError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ProfileError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export label must not be empty")]
    EmptyLabel,

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a compute-then-export run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    #[error(
        "frame is {actual_width}x{actual_height}, background is {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("invalid motion parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
