// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain errors shared by the preamble scanner and filename escaper.

use thiserror::Error;

/// Failure to locate a usable pause point in a source file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ScanError(pub String);

impl ScanError {
    pub fn multiple_end_preamble_markers() -> Self {
        Self("File contains multiple \\fastrecompileendpreamble lines".to_string())
    }

    pub fn no_marker() -> Self {
        Self(
            "File contains neither \\fastrecompileendpreamble nor \\begin{document} line"
                .to_string(),
        )
    }
}

/// A filename was rejected by the TeX-input escaper because it cannot be
/// made safe for embedding in a `\input{...}` argument.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscapeError {
    #[error("filename must not start with '~' (would expand to home directory): {0}")]
    LeadingTilde(String),
    #[error("filename must not start with '|' (would trigger pipe input): {0}")]
    LeadingPipe(String),
    #[error("filename must not contain '$' (would trigger kpathsea variable expansion): {0}")]
    DollarSign(String),
    #[error("filename must not contain '\"': {0}")]
    DoubleQuote(String),
}
