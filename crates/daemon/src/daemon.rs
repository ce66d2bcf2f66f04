// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compilation Daemon (spec §4.H): the orchestrator that owns at most one
//! parked Compiler Instance and drives it through one `recompile()` per
//! watcher tick.

use std::path::PathBuf;
use std::time::Instant;

use fr_compiler::{CompilerError, DirectCompiler, EngineConfig, FormatPrecompiler, StagedCompiler};
use fr_core::FormatMode;
use fr_pipe::{pipe, PipeReader, PipeWriter};
use fr_tempdir::TempDirRegistry;

use crate::config::Config;

/// Either Compiler Instance variant the daemon can park, picked once at
/// construction from `config.mode` and held for the daemon's lifetime.
enum Parked {
    Direct(DirectCompiler),
    Staged(StagedCompiler),
}

impl Parked {
    fn finish(
        &mut self,
        callback: impl FnOnce(),
        output: &PipeWriter,
    ) -> Result<bool, CompilerError> {
        match self {
            Parked::Direct(c) => c.finish(callback, output),
            Parked::Staged(c) => c.finish(callback, output),
        }
    }

    fn exit(self) {
        match self {
            Parked::Direct(c) => c.exit(),
            Parked::Staged(c) => c.exit(),
        }
    }
}

/// Runs shell commands configured via `--compiling-cmd`/`--success-cmd`/
/// `--failure-cmd`, matching the reference daemon's `subprocess.run(...,
/// shell=True, check=True)` calls.
fn run_shell_hook(cmd: &Option<String>) {
    let Some(cmd) = cmd else { return };
    let status = if cfg!(windows) {
        std::process::Command::new("cmd").args(["/C", cmd]).status()
    } else {
        std::process::Command::new("sh").args(["-c", cmd]).status()
    };
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!(%status, command = %cmd, "hook command exited non-zero"),
        Err(err) => tracing::warn!(%err, command = %cmd, "failed to spawn hook command"),
    }
}

pub struct CompilationDaemon {
    config: Config,
    format_temp_dir: Option<fr_tempdir::TempDirHandle>,
    staging_registry: Option<TempDirRegistry>,
    parked: Option<Parked>,
    output: Option<PipeReader>,
    start_time: Option<Instant>,
}

impl CompilationDaemon {
    pub fn new(config: Config, staging_registry: Option<TempDirRegistry>) -> Self {
        Self {
            config,
            format_temp_dir: None,
            staging_registry,
            parked: None,
            output: None,
            start_time: None,
        }
    }

    /// spec §4.H `enter()`: set up the format-temp-dir if precompiling, then
    /// quietly attempt to park the first instance.
    pub fn enter(&mut self) -> Result<(), CompilerError> {
        if self.config.precompile_preamble {
            let registry = TempDirRegistry::open()?;
            self.format_temp_dir = Some(registry.create()?);
        }
        self.prepare_parked_quiet();
        Ok(())
    }

    fn base_engine_config(&self, format_mode: FormatMode) -> EngineConfig {
        EngineConfig {
            executable: self.config.executable.clone(),
            jobname: self.config.jobname.clone(),
            output_directory: self.config.output_directory.clone(),
            shell_escape: self.config.shell_escape,
            eight_bit: self.config.eight_bit,
            recorder: self.config.recorder,
            extra_args: self.config.extra_args.clone(),
            extra_commands: Vec::new(),
            format_mode,
            pause_at_begin_document_end: false,
        }
    }

    fn texformats_env(&self) -> Option<Vec<(String, String)>> {
        let dir = self.format_temp_dir.as_ref()?;
        let existing = std::env::var("TEXFORMATS").unwrap_or_default();
        let sep = if cfg!(windows) { ';' } else { ':' };
        Some(vec![(
            "TEXFORMATS".to_string(),
            format!("{}{sep}{existing}", dir.path().display()),
        )])
    }

    fn fmt_path(&self) -> Option<PathBuf> {
        self.format_temp_dir
            .as_ref()
            .map(|dir| dir.path().join(format!("{}.fmt", self.config.jobname)))
    }

    /// Build a format if `--precompile-preamble` is set and the `.fmt` file
    /// is missing (spec §4.H invariant 2). Returns `false` if the build was
    /// attempted and failed (or the source has no preamble).
    fn ensure_format(&mut self) -> bool {
        let Some(fmt_path) = self.fmt_path() else {
            return true;
        };
        if fmt_path.exists() {
            return true;
        }
        let Some(format_dir) = self.format_temp_dir.as_ref() else {
            return true;
        };

        let mut cfg = self.base_engine_config(FormatMode::Precompile);
        cfg.output_directory = format_dir.path().to_path_buf();

        let mut precompiler = match FormatPrecompiler::enter(&cfg, &self.config.filename) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(%err, "format precompile failed to start");
                return false;
            }
        };

        let (writer, _reader) = pipe();
        let ok = match precompiler.finish(&writer) {
            Ok(ok) => ok,
            Err(err) => {
                tracing::warn!(%err, "format precompile failed");
                precompiler.exit();
                return false;
            }
        };
        precompiler.exit();
        ok
    }

    /// Park a new instance, swallowing a NoPreamble failure (spec §4.H
    /// `_prepare_compiler(quiet=true)`).
    fn prepare_parked_quiet(&mut self) {
        let use_format = self.config.precompile_preamble && self.fmt_path().is_some_and(|p| p.exists());
        let format_mode = if use_format { FormatMode::Use } else { FormatMode::NotUsed };
        let cfg = self.base_engine_config(format_mode);
        let env = if use_format { self.texformats_env() } else { None };

        let result = if self.config.mode == fr_core::CompilerMode::Staged {
            let registry = match self.staging_registry.as_ref() {
                Some(r) => r,
                None => return,
            };
            StagedCompiler::enter(
                registry,
                &cfg,
                &self.config.filename,
                self.config.close_stdin,
                env.as_deref(),
            )
            .map(Parked::Staged)
        } else {
            DirectCompiler::enter(&cfg, &self.config.filename, self.config.close_stdin, env.as_deref())
                .map(Parked::Direct)
        };

        match result {
            Ok(parked) => self.parked = Some(parked),
            Err(CompilerError::NoPreamble(_)) => self.parked = None,
            Err(err) => {
                tracing::warn!(%err, "failed to park compiler instance");
                self.parked = None;
            }
        }
    }

    /// Park a new instance, reporting a NoPreamble failure into `output`.
    fn prepare_parked_reporting(&mut self, output: &PipeWriter) -> bool {
        self.prepare_parked_quiet();
        if self.parked.is_none() {
            let _ = output.write_all(b"! no usable pause point in source file.\n");
            return false;
        }
        true
    }

    /// spec §4.H `recompile()`.
    pub fn recompile(&mut self, recompile_preamble: bool) -> bool {
        self.start_time = Some(Instant::now());
        let (writer, reader) = pipe();
        self.output = Some(reader);
        let ok = self.recompile_inner(recompile_preamble, &writer, self.config.auto_rerun);
        writer.close();
        self.prepare_parked_quiet();
        ok
    }

    /// Take the current tick's output pipe reader (spec §4.H invariant 4:
    /// reads on the previous tick's pipe see EOF once this is called again).
    pub fn take_output(&mut self) -> Option<PipeReader> {
        self.output.take()
    }

    fn recompile_inner(&mut self, recompile_preamble: bool, writer: &PipeWriter, reruns_left: u32) -> bool {
        if recompile_preamble {
            let _ = writer.write_all(
                format!("Some preamble-watch file changed, recompiling.{}", separation(self.config.num_separation_lines))
                    .as_bytes(),
            );
            if let Some(parked) = self.parked.take() {
                parked.exit();
            }
            if self.config.precompile_preamble {
                if let Some(fmt_path) = self.fmt_path() {
                    let _ = std::fs::remove_file(fmt_path);
                }
                if !self.ensure_format() {
                    return false;
                }
            }
            self.prepare_parked_quiet();
            return self.recompile_non_preamble(writer, reruns_left);
        }
        self.recompile_non_preamble(writer, reruns_left)
    }

    fn recompile_non_preamble(&mut self, writer: &PipeWriter, reruns_left: u32) -> bool {
        if self.parked.is_none() && !self.prepare_parked_reporting(writer) {
            return false;
        }
        let Some(mut parked) = self.parked.take() else {
            return false;
        };

        let compiling_cmd = self.config.compiling_cmd.clone();
        let callback = move || run_shell_hook(&compiling_cmd);

        let result = parked.finish(callback, writer);
        match result {
            Ok(returncode_zero) => {
                if self.config.show_time {
                    if let Some(start) = self.start_time {
                        let _ = writer.write_all(format!("Time taken: {:.3}s\n", start.elapsed().as_secs_f64()).as_bytes());
                    }
                }

                let pdf_exists = self.config.generated_pdf_path.exists();

                if let Some(dest) = &self.config.copy_output {
                    if let Err(err) = std::fs::copy(&self.config.generated_pdf_path, dest) {
                        if err.kind() != std::io::ErrorKind::NotFound {
                            tracing::warn!(%err, "failed to copy generated PDF");
                        }
                    }
                }
                if let Some(dest) = &self.config.copy_log {
                    if let Err(err) = std::fs::copy(&self.config.generated_log_path, dest) {
                        tracing::warn!(%err, "failed to copy generated log");
                    }
                }

                let log_bytes = std::fs::read(&self.config.generated_log_path).unwrap_or_default();
                if fr_compiler::rerun::needs_rerun(&log_bytes) && reruns_left > 0 {
                    let _ = writer
                        .write_all(format!("Rerunning.{}", separation(self.config.num_separation_lines)).as_bytes());
                    parked.exit();
                    self.prepare_parked_quiet();
                    return self.recompile_non_preamble(writer, reruns_left - 1);
                }

                let success = returncode_zero && pdf_exists;
                if success {
                    run_shell_hook(&self.config.success_cmd);
                } else {
                    run_shell_hook(&self.config.failure_cmd);
                }
                parked.exit();
                success
            }
            Err(CompilerError::PreambleChanged) => {
                let _ =
                    writer.write_all(format!("Preamble changed, recompiling.{}", separation(self.config.num_separation_lines)).as_bytes());
                parked.exit();
                self.recompile_inner(true, writer, reruns_left)
            }
            Err(CompilerError::NoPreamble(err)) => {
                let _ = writer.write_all(format!("! {err}.\n").as_bytes());
                parked.exit();
                false
            }
            Err(err) => {
                tracing::warn!(%err, "compiler instance failed");
                let _ = writer.write_all(format!("! {err}.\n").as_bytes());
                parked.exit();
                false
            }
        }
    }

    /// spec §4.H `exit()`: dispose the parked instance and release the
    /// format-temp-dir; never fails.
    pub fn exit(self) {
        if let Some(parked) = self.parked {
            parked.exit();
        }
        // self.format_temp_dir drops here, removing the directory.
    }
}

fn separation(lines: u32) -> String {
    "\n".repeat(lines as usize)
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
