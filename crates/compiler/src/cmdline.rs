// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine command-line construction (spec §6).

use std::path::Path;

use fr_core::{escape_filename_for_input, EscapeError, FormatMode, Preamble};

/// The companion package version this daemon was built against. Embedded in
/// the bootstrap expression so a mismatched `fastrecompile.sty` fails loudly
/// at compile time rather than misbehaving silently.
const COMPANION_PACKAGE_VERSION: &str = "0.5.0";

/// Static per-run parameters needed to build one engine invocation. Held
/// separately from [`fr_core::model::CompilerMode`] because a Staged run
/// constructs one of these for its *inner* Direct instance, pointed at the
/// temp directory rather than the real output directory.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub executable: String,
    pub jobname: String,
    pub output_directory: std::path::PathBuf,
    pub shell_escape: bool,
    pub eight_bit: bool,
    pub recorder: bool,
    pub extra_args: Vec<String>,
    pub extra_commands: Vec<String>,
    pub format_mode: FormatMode,
    /// Safe default is `false` (pause before the begin-document hooks run).
    /// The Staged wrapper forces this to `true`.
    pub pause_at_begin_document_end: bool,
}

/// Build the full argv for one engine invocation, per spec §6.
pub fn build_command_line(
    cfg: &EngineConfig,
    preamble: &Preamble,
    filename: &Path,
) -> Result<Vec<String>, EscapeError> {
    let compiling_filename = bootstrap_or_filename(cfg, preamble, filename)?;

    let mut command = vec![cfg.executable.clone()];
    if cfg.format_mode == FormatMode::Precompile {
        command.push("--ini".to_string());
    }
    command.push(format!("--jobname={}", cfg.jobname));
    command.push(format!(
        "--output-directory={}",
        cfg.output_directory.display()
    ));
    if cfg.shell_escape {
        command.push("--shell-escape".to_string());
    }
    if cfg.eight_bit {
        command.push("--8bit".to_string());
    }
    if cfg.recorder {
        command.push("--recorder".to_string());
    }
    command.extend(cfg.extra_args.iter().cloned());

    match cfg.format_mode {
        FormatMode::Precompile => command.push(format!("&{}", cfg.executable)),
        FormatMode::Use => command.push(format!("&{}", cfg.jobname)),
        FormatMode::NotUsed => {}
    }

    command.push(compiling_filename);
    command.extend(cfg.extra_commands.iter().cloned());

    Ok(command)
}

/// The last positional token before `extra_commands`: the user's raw
/// filename in Use mode (the format file already carries the preamble, so
/// there is nothing left to bootstrap), otherwise the bootstrap expression.
fn bootstrap_or_filename(
    cfg: &EngineConfig,
    preamble: &Preamble,
    filename: &Path,
) -> Result<String, EscapeError> {
    if cfg.format_mode == FormatMode::Use {
        return Ok(filename.display().to_string());
    }

    let escaped_outdir = escape_filename_for_input(&cfg.output_directory.display().to_string())?;
    let escaped_filename = escape_filename_for_input(&filename.display().to_string())?;

    let mut expr = format!(
        r"\RequirePackage{{fastrecompile}}\edef\fastrecompileoutputdir{{{escaped_outdir}/}}\fastrecompilecheckversion{{{COMPANION_PACKAGE_VERSION}}}"
    );

    if preamble.implicit {
        if cfg.pause_at_begin_document_end {
            expr.push_str(r"\fastrecompilesetimplicitpreambleii");
        } else {
            expr.push_str(r"\fastrecompilesetimplicitpreamble");
        }
    }

    if cfg.format_mode == FormatMode::Precompile {
        expr.push_str(&format!(
            r"\csname @@input\endcsname{{mylatexformat.ltx}}{{{escaped_filename}}}"
        ));
    } else {
        expr.push_str(&format!(r"\input{{{escaped_filename}}}"));
    }

    Ok(expr)
}

#[cfg(test)]
#[path = "cmdline_tests.rs"]
mod tests;
