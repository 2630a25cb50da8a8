//! Error type shared by every stage of a benchmark run.

use thiserror::Error;

/// Everything that can go wrong while configuring or running a benchmark.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A configuration value is missing or out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file is not valid TOML for [`BenchConfig`](crate::config::BenchConfig).
    #[error("failed to parse configuration")]
    Toml(#[from] toml::de::Error),

    /// Reading configuration or writing a report failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// An array could not be built or reshaped.
    #[error("array shape error")]
    Shape(#[from] ndarray::ShapeError),

    /// The destination array does not fit the source array.
    #[error("shape mismatch: a {input:?} source needs a {expected:?} destination, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the source grid.
        input: [usize; 2],
        /// Destination shape the source requires.
        expected: [usize; 3],
        /// Destination shape that was supplied.
        actual: [usize; 3],
    },

    /// No registered method has this id.
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    /// A method's setup or process step failed.
    #[error("method `{id}` failed")]
    Method {
        /// Id of the failing method.
        id: &'static str,
        /// What went wrong inside the method.
        #[source]
        cause: Box<BenchError>,
    },

    /// The method filter is not a valid regular expression.
    #[error("invalid method filter")]
    Filter(#[from] regex::Error),

    /// A worker pool could not be created.
    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The report could not be serialized.
    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),

    /// At least one method produced output that disagrees with the reference rule.
    #[error("{failed} method(s) produced output that disagrees with the reference")]
    Verification {
        /// Number of methods whose output was wrong.
        failed: usize,
    },
}

impl BenchError {
    /// Wraps `self` as the failure of method `id`.
    pub fn in_method(self, id: &'static str) -> Self {
        Self::Method {
            id,
            cause: Box::new(self),
        }
    }

    /// Returns `true` if this error comes from configuration rather than from running.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::Toml(_) | Self::Filter(_) | Self::UnknownMethod(_) => true,
            Self::Method { cause, .. } => cause.is_config(),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = BenchError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BenchConfig;

    #[test]
    fn method_errors_keep_their_cause() {
        let err = BenchError::Config("bad".into()).in_method("clip");
        assert_eq!(err.to_string(), "method `clip` failed");
        assert!(err.is_config());
        let cause = std::error::Error::source(&err).unwrap();
        assert_eq!(cause.to_string(), "configuration error: bad");
    }

    #[test]
    fn wrapped_causes_are_printed_once() {
        let err = BenchConfig::from_toml("[runner]\nprobe = []\n").unwrap_err();
        let cause = std::error::Error::source(&err).unwrap().to_string();
        assert_eq!(err.to_string(), "failed to parse configuration");

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches(cause.as_str()).count(), 1);
    }

    #[test]
    fn runtime_errors_are_not_config() {
        let err = BenchError::Verification { failed: 2 };
        assert!(!err.is_config());
        assert!(err.to_string().starts_with("2 method(s)"));
    }
}
