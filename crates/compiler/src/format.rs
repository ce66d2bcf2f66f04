// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Format Precompiler (spec §4.G): a direct Compiler Instance variant that
//! produces `<jobname>.fmt` instead of a finished document.

use std::path::Path;

use fr_pipe::PipeWriter;

use crate::cmdline::EngineConfig;
use crate::direct::DirectCompiler;
use crate::error::CompilerError;

/// Build the `.fmt` file for `cfg.jobname` in `cfg.output_directory` (the
/// daemon's format-temp-dir, distinct from per-run staging). On success,
/// `<output_directory>/<jobname>.fmt` exists.
pub struct FormatPrecompiler {
    inner: DirectCompiler,
}

impl FormatPrecompiler {
    pub fn enter(cfg: &EngineConfig, filename: &Path) -> Result<Self, CompilerError> {
        debug_assert_eq!(cfg.format_mode, fr_core::FormatMode::Precompile);
        let inner = DirectCompiler::enter(cfg, filename, true, None)?;
        Ok(Self { inner })
    }

    /// Run the format build to completion. Unlike [`DirectCompiler::finish`]
    /// for other format modes, no resume line is sent and no compiling
    /// callback fires — the engine simply runs to the end of `--ini` mode.
    pub fn finish(&mut self, output: &PipeWriter) -> Result<bool, CompilerError> {
        self.inner.finish(|| {}, output)
    }

    pub fn exit(self) {
        self.inner.exit();
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
