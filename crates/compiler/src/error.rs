// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the compiler instances.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("source lacks a usable pause point: {0}")]
    NoPreamble(#[from] fr_core::ScanError),

    #[error("invalid filename: {0}")]
    InvalidFilename(#[from] fr_core::EscapeError),

    #[error("preamble changed between enter() and finish()")]
    PreambleChanged,

    #[error("finish() called more than once on this instance")]
    AlreadyFinished,

    #[error("failed to read source file {path}: {source}")]
    ReadSource { path: PathBuf, source: io::Error },

    #[error("failed to spawn engine {executable}: {source}")]
    Spawn { executable: String, source: io::Error },

    #[error("I/O error communicating with engine: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    TempDir(#[from] fr_tempdir::TempDirError),
}
