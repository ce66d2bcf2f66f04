// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI surface and validated configuration (spec §6).

use std::path::PathBuf;

use clap::Parser;
use fr_core::CompilerMode;
use thiserror::Error;

/// Raw command-line arguments, matching spec §6 field-for-field.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fastrecompile",
    about = "Fast incremental recompilation daemon for a TeX engine"
)]
pub struct Cli {
    /// The executable to run, such as pdflatex.
    pub executable: String,

    /// The filename to compile.
    pub filename: PathBuf,

    #[arg(long)]
    pub jobname: Option<String>,

    #[arg(long = "output-directory")]
    pub output_directory: Option<PathBuf>,

    #[arg(long = "temp-output-directory", action = clap::ArgAction::SetTrue)]
    temp_output_directory: bool,
    #[arg(
        long = "no-temp-output-directory",
        action = clap::ArgAction::SetTrue,
        conflicts_with = "temp_output_directory"
    )]
    no_temp_output_directory: bool,

    /// Hard cap on consecutive rerun-heuristic passes within one tick.
    #[arg(long = "auto-rerun", default_value_t = 5)]
    pub auto_rerun: u32,

    #[arg(long = "shell-escape")]
    pub shell_escape: bool,

    #[arg(long = "8bit")]
    pub eight_bit: bool,

    #[arg(long)]
    pub recorder: bool,

    #[arg(long = "extra-args")]
    pub extra_args: Vec<String>,

    #[arg(long = "extra-watch")]
    pub extra_watch: Vec<PathBuf>,

    #[arg(long = "extra-watch-preamble")]
    pub extra_watch_preamble: Vec<PathBuf>,

    /// Debounce delay after the first file-change event, in seconds.
    #[arg(long = "extra-delay", default_value_t = 0.05)]
    pub extra_delay: f64,

    #[arg(long = "close-stdin", action = clap::ArgAction::SetTrue)]
    close_stdin: bool,
    #[arg(
        long = "no-close-stdin",
        action = clap::ArgAction::SetTrue,
        conflicts_with = "close_stdin"
    )]
    no_close_stdin: bool,

    #[arg(long = "show-time", action = clap::ArgAction::SetTrue)]
    show_time: bool,
    #[arg(
        long = "no-show-time",
        action = clap::ArgAction::SetTrue,
        conflicts_with = "show_time"
    )]
    no_show_time: bool,

    #[arg(long = "copy-output")]
    pub copy_output: Option<PathBuf>,

    #[arg(long = "copy-log")]
    pub copy_log: Option<PathBuf>,

    #[arg(long = "num-separation-lines", default_value_t = 5)]
    pub num_separation_lines: u32,

    #[arg(long = "compiling-cmd")]
    pub compiling_cmd: Option<String>,

    #[arg(long = "success-cmd")]
    pub success_cmd: Option<String>,

    #[arg(long = "failure-cmd")]
    pub failure_cmd: Option<String>,

    /// Seconds between polls of a manual polling watcher; 0 selects the
    /// OS-native watcher.
    #[arg(long = "polling-duration", default_value_t = 0.0)]
    pub polling_duration: f64,

    #[arg(long = "precompile-preamble")]
    pub precompile_preamble: bool,
}

impl Cli {
    pub fn temp_output_directory(&self) -> bool {
        !self.no_temp_output_directory
    }

    pub fn close_stdin(&self) -> bool {
        !self.no_close_stdin
    }

    pub fn show_time(&self) -> bool {
        !self.no_show_time
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--copy-output must not equal the generated PDF path {0}")]
    CopyOutputCollision(PathBuf),
    #[error("--copy-log must not equal the generated log path {0}")]
    CopyLogCollision(PathBuf),
    #[error("source file {0} does not exist")]
    SourceNotFound(PathBuf),
    #[error("filename {0} cannot be used in a TeX \\input argument: {1}")]
    InvalidFilename(PathBuf, fr_core::EscapeError),
}

/// Config validated once at startup (spec §6: "`--copy-output`/`--copy-log`
/// must not equal the real generated path").
#[derive(Debug, Clone)]
pub struct Config {
    pub executable: String,
    pub filename: PathBuf,
    pub jobname: String,
    pub output_directory: PathBuf,
    pub mode: CompilerMode,
    pub auto_rerun: u32,
    pub shell_escape: bool,
    pub eight_bit: bool,
    pub recorder: bool,
    pub extra_args: Vec<String>,
    pub extra_watch: Vec<PathBuf>,
    pub extra_watch_preamble: Vec<PathBuf>,
    pub extra_delay: f64,
    pub close_stdin: bool,
    pub show_time: bool,
    pub copy_output: Option<PathBuf>,
    pub copy_log: Option<PathBuf>,
    pub num_separation_lines: u32,
    pub compiling_cmd: Option<String>,
    pub success_cmd: Option<String>,
    pub failure_cmd: Option<String>,
    pub polling_duration: f64,
    pub precompile_preamble: bool,
    pub generated_pdf_path: PathBuf,
    pub generated_log_path: PathBuf,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if !cli.filename.exists() {
            return Err(ConfigError::SourceNotFound(cli.filename));
        }
        if let Err(err) = fr_core::escape_filename_for_input(&cli.filename.display().to_string()) {
            return Err(ConfigError::InvalidFilename(cli.filename, err));
        }

        let jobname = cli.jobname.clone().unwrap_or_else(|| {
            cli.filename
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| cli.filename.display().to_string())
        });
        let output_directory = cli.output_directory.clone().unwrap_or_else(|| PathBuf::from("."));

        let generated_pdf_path = output_directory.join(format!("{jobname}.pdf"));
        let generated_log_path = output_directory.join(format!("{jobname}.log"));

        if cli.copy_output.as_ref() == Some(&generated_pdf_path) {
            return Err(ConfigError::CopyOutputCollision(generated_pdf_path));
        }
        if cli.copy_log.as_ref() == Some(&generated_log_path) {
            return Err(ConfigError::CopyLogCollision(generated_log_path));
        }

        Ok(Self {
            executable: cli.executable.clone(),
            filename: cli.filename.clone(),
            jobname,
            output_directory,
            mode: if cli.temp_output_directory() {
                CompilerMode::Staged
            } else {
                CompilerMode::Direct
            },
            auto_rerun: cli.auto_rerun,
            shell_escape: cli.shell_escape,
            eight_bit: cli.eight_bit,
            recorder: cli.recorder,
            extra_args: cli.extra_args.clone(),
            extra_watch: cli.extra_watch.clone(),
            extra_watch_preamble: cli.extra_watch_preamble.clone(),
            extra_delay: cli.extra_delay,
            close_stdin: cli.close_stdin(),
            show_time: cli.show_time(),
            copy_output: cli.copy_output.clone(),
            copy_log: cli.copy_log.clone(),
            num_separation_lines: cli.num_separation_lines,
            compiling_cmd: cli.compiling_cmd.clone(),
            success_cmd: cli.success_cmd.clone(),
            failure_cmd: cli.failure_cmd.clone(),
            polling_duration: cli.polling_duration,
            precompile_preamble: cli.precompile_preamble,
            generated_pdf_path,
            generated_log_path,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
