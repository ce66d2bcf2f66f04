// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiler Instance, direct variant (spec §4.E) and the Format Precompiler
//! (§4.G), which is the same state machine run with `FormatMode::Precompile`.

use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use fr_core::{extract_preamble, FormatMode, Preamble};
use fr_pipe::{pipe, PipeReader, PipeWriter};

use crate::cmdline::{build_command_line, EngineConfig};
use crate::error::CompilerError;

/// Bound on `exit()`'s wait for the subprocess to die after being killed.
/// Spec §5 suggests 1s; exceeding it is logged, not propagated.
const KILL_WAIT_TIMEOUT: Duration = Duration::from_secs(1);
const KILL_WAIT_POLL: Duration = Duration::from_millis(10);

/// How many bytes the stdout pump reads per syscall. Spec §9 permits
/// chunked reads over the reference's byte-at-a-time loop as long as
/// partial lines are still forwarded promptly; we never buffer a chunk
/// past its own read.
const PUMP_CHUNK_SIZE: usize = 4096;

/// A spawned engine parked just past its preamble, waiting for `finish()`
/// to resume and complete the compile.
///
/// State machine (spec §4.E): `enter()` produces a `Parked` instance (or
/// fails with [`CompilerError::NoPreamble`] before any subprocess starts);
/// `finish()` consumes it into `Running` then `Completed` or
/// `PreambleChanged`; `exit()` is valid from any state and moves it to
/// disposed.
#[derive(Debug)]
pub struct DirectCompiler {
    child: Child,
    stdin: Option<ChildStdin>,
    internal_reader: Option<PipeReader>,
    pump: Option<JoinHandle<()>>,
    preamble_at_start: Preamble,
    filename: PathBuf,
    format_mode: FormatMode,
    close_stdin: bool,
    finished: bool,
}

impl DirectCompiler {
    /// Spawn the engine parked just past the preamble.
    ///
    /// Fails with [`CompilerError::NoPreamble`] if the source file cannot
    /// be scanned, without starting a subprocess. Fails with
    /// [`CompilerError::InvalidFilename`] if the filename cannot be made
    /// safe for a TeX command line, likewise before spawning.
    pub fn enter(
        cfg: &EngineConfig,
        filename: &Path,
        close_stdin: bool,
        env: Option<&[(String, String)]>,
    ) -> Result<Self, CompilerError> {
        let bytes = std::fs::read(filename).map_err(|source| CompilerError::ReadSource {
            path: filename.to_path_buf(),
            source,
        })?;
        let preamble = extract_preamble(&bytes)?;

        let argv = build_command_line(cfg, &preamble, filename)?;

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        if let Some(vars) = env {
            command.envs(vars.iter().cloned());
        }

        let mut child = command.spawn().map_err(|source| CompilerError::Spawn {
            executable: cfg.executable.clone(),
            source,
        })?;

        let stdin = child.stdin.take();
        let mut stdout = child.stdout.take().expect("stdout was piped");

        let (internal_writer, internal_reader) = pipe();
        let pump = thread::spawn(move || pump_stdout(&mut stdout, &internal_writer));

        Ok(Self {
            child,
            stdin,
            internal_reader: Some(internal_reader),
            pump: Some(pump),
            preamble_at_start: preamble,
            filename: filename.to_path_buf(),
            format_mode: cfg.format_mode,
            close_stdin,
            finished: false,
        })
    }

    /// Resume the parked engine and run it to completion. Returns whether
    /// the subprocess exited with status 0. Must be called at most once.
    pub fn finish(
        &mut self,
        compiling_callback: impl FnOnce(),
        output: &PipeWriter,
    ) -> Result<bool, CompilerError> {
        if self.finished {
            return Err(CompilerError::AlreadyFinished);
        }
        self.finished = true;

        let bytes = std::fs::read(&self.filename).map_err(|source| CompilerError::ReadSource {
            path: self.filename.clone(),
            source,
        })?;
        let preamble_now = extract_preamble(&bytes)?;
        if preamble_now != self.preamble_at_start {
            return Err(CompilerError::PreambleChanged);
        }

        if self.format_mode == FormatMode::Precompile {
            self.stdin.take();
            drain_internal_to_output(self.internal_reader.as_mut().expect("present"), output);
            let status = self.child.wait()?;
            return Ok(status.success());
        }

        if let Some(stdin) = self.stdin.as_mut() {
            let mut line = self.filename.display().to_string().into_bytes();
            line.push(b'\n');
            match stdin.write_all(&line).and_then(|()| stdin.flush()) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                Err(err) => return Err(CompilerError::Io(err)),
            }
        }
        if self.close_stdin {
            self.stdin.take();
        }

        compiling_callback();

        drain_internal_to_output(self.internal_reader.as_mut().expect("present"), output);
        let status = self.child.wait()?;
        Ok(status.success())
    }

    /// Unconditionally tear down the subprocess. Never fails: a stuck
    /// subprocess or a pump thread panic is logged as a resource-leak
    /// warning, not propagated.
    pub fn exit(mut self) {
        if let Err(err) = self.child.kill() {
            if err.kind() != ErrorKind::InvalidInput {
                tracing::warn!(%err, "failed to signal engine subprocess");
            }
        }

        let deadline = Instant::now() + KILL_WAIT_TIMEOUT;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() < deadline => thread::sleep(KILL_WAIT_POLL),
                Ok(None) => {
                    tracing::warn!("engine subprocess did not exit within kill timeout; possible resource leak");
                    break;
                }
                Err(err) => {
                    tracing::warn!(%err, "error waiting for engine subprocess to exit");
                    break;
                }
            }
        }

        self.stdin.take();
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }

    /// The preamble observed at `enter()`, for callers that need to compare
    /// across instances (e.g. the daemon's "exactly one child" bookkeeping).
    pub fn preamble_at_start(&self) -> &Preamble {
        &self.preamble_at_start
    }
}

fn pump_stdout(stdout: &mut impl Read, writer: &PipeWriter) {
    let mut buf = [0u8; PUMP_CHUNK_SIZE];
    loop {
        match stdout.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if writer.write_all(&buf[..n]).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
    writer.close();
}

fn drain_internal_to_output(internal: &mut PipeReader, output: &PipeWriter) {
    while let Some(byte) = internal.read_byte() {
        if output.write_byte(byte).is_err() {
            break;
        }
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod tests;
