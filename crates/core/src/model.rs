// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core data types shared across the compiler and daemon crates.

use std::path::PathBuf;

/// The portion of a TeX source above the pause point.
///
/// Two preambles are equal iff their byte-line sequences are equal.
/// `implicit = false` means the user placed an explicit end-of-preamble
/// marker; `implicit = true` means the daemon pauses at `\begin{document}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub lines: Vec<Vec<u8>>,
    pub implicit: bool,
}

/// Which Compiler Instance variant a daemon run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerMode {
    /// Engine writes directly to the real output directory.
    Direct,
    /// Engine writes to an owned temp directory, mirrored out on success.
    Staged,
}

/// Precompiled-format mode selection for one compiler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// No format file is used; the preamble is paid for on every run.
    NotUsed,
    /// This run's job is to produce `jobname.fmt`.
    Precompile,
    /// This run preloads a previously produced `jobname.fmt`.
    Use,
}

/// Kind of filesystem change delivered by the external watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Created,
    Modified,
    Moved,
}

/// One raw event from the file-change watcher, before coalescing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
    /// Whether this path is on the preamble-watch list (vs. body-watch).
    pub preamble_watch: bool,
}
