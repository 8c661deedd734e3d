//! Error types shared by the retirement planning crates
//!
//! [`EqretError`] is the library-level error. Build-time problems with the
//! inputs are [`EqretError::Configuration`]; a solver backend that cannot be
//! invoked is [`EqretError::SolverUnavailable`]. Infeasible or unbounded
//! solver outcomes are *not* errors at solve time: they are reported as a
//! termination condition, and only turn into [`EqretError::NoSolution`] when
//! a caller asks to extract results from them.
//!
//! # Example
//!
//! ```ignore
//! use eqret_core::{EqretError, EqretResult};
//!
//! fn run(problem: &Problem) -> EqretResult<()> {
//!     let model = build_model(problem)?;
//!     let report = solve(&model)?;
//!     let output = extract(&model, &report)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for model construction, solving and extraction.
#[derive(Error, Debug)]
pub enum EqretError {
    /// Missing or malformed parameter for a required index
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested solver backend is unknown or was not compiled in
    #[error("Solver unavailable: {0}")]
    SolverUnavailable(String),

    /// Results were requested from a solve that did not terminate optimally
    #[error("No solution available (termination condition: {0})")]
    NoSolution(String),

    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Internal inconsistency between a model and its results
    #[error("{0}")]
    Other(String),
}

impl EqretError {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        EqretError::Configuration(msg.into())
    }

    /// True for errors raised while validating inputs at build time.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EqretError::Configuration(_))
    }
}

/// Convenience type alias for Results using EqretError.
pub type EqretResult<T> = Result<T, EqretError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EqretError::config("HISTGEN missing for plant 3");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("plant 3"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_no_solution_display() {
        let err = EqretError::NoSolution("infeasible".into());
        assert_eq!(
            err.to_string(),
            "No solution available (termination condition: infeasible)"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EqretError = io_err.into();
        assert!(matches!(err, EqretError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> EqretResult<()> {
            Err(EqretError::SolverUnavailable("highs".into()))
        }

        fn outer() -> EqretResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(EqretError::SolverUnavailable(_))));
    }
}
