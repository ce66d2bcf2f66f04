// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiler Instance, staged variant (spec §4.F).
//!
//! Wraps [`DirectCompiler`] against a private temp directory so the engine
//! never writes partial artifacts straight into the user's real output
//! directory while parked.

use std::path::{Path, PathBuf};

use fr_tempdir::{TempDirHandle, TempDirRegistry};

use crate::cmdline::EngineConfig;
use crate::direct::DirectCompiler;
use crate::error::CompilerError;

/// Auxiliary-file extensions mirrored in by copy when the real output
/// directory's path cannot safely go into `TEXINPUTS` (spec §4.F step 2).
/// Sub-aux files (e.g. ones `\include` produces per chapter) are not in
/// this list — a known limitation carried from the source project.
const COPY_FALLBACK_EXTENSIONS: &[&str] = &[
    "aux", "bcf", "fls", "idx", "ind", "lof", "lot", "out", "toc", "blg", "ilg", "xdv",
];

/// The character that separates entries in `TEXINPUTS`-style search-path
/// environment variables: `:` on Unix, `;` on Windows. Distinct from
/// [`std::path::MAIN_SEPARATOR`], which separates path *components*.
#[cfg(unix)]
const PATH_LIST_SEPARATOR: char = ':';
#[cfg(windows)]
const PATH_LIST_SEPARATOR: char = ';';

pub struct StagedCompiler {
    inner: DirectCompiler,
    temp_dir: TempDirHandle,
    real_output_directory: PathBuf,
}

impl StagedCompiler {
    /// `extra_env` is merged in verbatim, e.g. the daemon's `TEXFORMATS`
    /// override when parking a Use-mode instance.
    pub fn enter(
        registry: &TempDirRegistry,
        cfg: &EngineConfig,
        filename: &Path,
        close_stdin: bool,
        extra_env: Option<&[(String, String)]>,
    ) -> Result<Self, CompilerError> {
        let temp_dir = registry.create()?;
        let temp_path = temp_dir.path().to_path_buf();

        let mut env = if path_contains_separator(&cfg.output_directory) {
            tracing::warn!(
                output_directory = %cfg.output_directory.display(),
                "output directory contains the platform path separator; falling back to copying auxiliary files"
            );
            copy_known_aux_files(&cfg.output_directory, &temp_path, &cfg.jobname);
            Vec::new()
        } else {
            let texinputs = std::env::var("TEXINPUTS").unwrap_or_default();
            vec![(
                "TEXINPUTS".to_string(),
                format!("{}{PATH_LIST_SEPARATOR}{texinputs}", cfg.output_directory.display()),
            )]
        };
        if let Some(extra) = extra_env {
            env.extend(extra.iter().cloned());
        }
        let env = if env.is_empty() { None } else { Some(env) };

        let mut staged_cfg = cfg.clone();
        staged_cfg.output_directory = temp_path;
        staged_cfg.pause_at_begin_document_end = true;

        // `temp_dir` drops (removing the directory) if this fails.
        let inner = DirectCompiler::enter(&staged_cfg, filename, close_stdin, env.as_deref())?;

        Ok(Self {
            inner,
            temp_dir,
            real_output_directory: cfg.output_directory.clone(),
        })
    }

    pub fn finish(
        &mut self,
        compiling_callback: impl FnOnce(),
        output: &fr_pipe::PipeWriter,
    ) -> Result<bool, CompilerError> {
        let ok = self.inner.finish(compiling_callback, output)?;
        if ok {
            mirror_outputs(self.temp_dir.path(), &self.real_output_directory);
        }
        Ok(ok)
    }

    pub fn exit(self) {
        self.inner.exit();
        // self.temp_dir drops here, removing the directory.
    }
}

fn path_contains_separator(path: &Path) -> bool {
    path.display().to_string().contains(PATH_LIST_SEPARATOR)
}

fn copy_known_aux_files(real_output_directory: &Path, temp_dir: &Path, jobname: &str) {
    for extension in COPY_FALLBACK_EXTENSIONS {
        let src = real_output_directory.join(format!("{jobname}.{extension}"));
        let dst = temp_dir.join(format!("{jobname}.{extension}"));
        match std::fs::copy(&src, &dst) {
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::debug!(%err, src = %src.display(), "failed to copy auxiliary file into staged directory")
            }
        }
    }
}

/// Mirror every regular file produced in the temp directory into the real
/// output directory, preserving mtime. Subdirectories are not mirrored
/// (spec §4.F: "known limitation"). Best-effort: spec §7 classifies
/// `MirrorFailure` as logged, not fatal, so a failure on one file is warned
/// and the rest of the mirror still proceeds rather than failing the tick.
fn mirror_outputs(temp_dir: &Path, real_output_directory: &Path) {
    let entries = match std::fs::read_dir(temp_dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(%err, temp_dir = %temp_dir.display(), "failed to read staged output directory for mirroring");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(%err, "failed to read a staged output directory entry");
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                tracing::warn!(%err, path = %entry.path().display(), "failed to stat staged output file");
                continue;
            }
        };
        if !file_type.is_file() {
            continue;
        }

        let dest = real_output_directory.join(entry.file_name());
        if let Err(err) = std::fs::copy(entry.path(), &dest) {
            tracing::warn!(%err, destination = %dest.display(), "failed to mirror staged output file");
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                if let Ok(dest_file) = std::fs::File::options().write(true).open(&dest) {
                    let _ = dest_file.set_modified(modified);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "staged_tests.rs"]
mod tests;
