//! Error types for the validation gate
//!
//! These cover malformed input the gate refuses to analyze. Problems found
//! *in* the generated code are reported as issues, never as errors.

/// Validation gate failures
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A file in the batch has an empty path
    #[error("file at index {index} has an empty path")]
    EmptyPath { index: usize },

    /// A file contains binary data
    #[error("file '{path}' contains binary content")]
    BinaryContent { path: String },
}
