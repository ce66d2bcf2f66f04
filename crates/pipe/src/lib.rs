// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fr-pipe: the in-memory pipe (component C).
//!
//! A single-producer/single-consumer byte queue with an explicit EOF
//! sentinel, used to decouple the engine's stdout pump from whatever is
//! draining output to the caller. The daemon rotates to a fresh pipe per
//! recompile iteration so a reader of a finished run always sees a clean
//! EOF rather than bytes from the next run.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// The pipe has already been closed by its writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeClosed;

impl fmt::Display for PipeClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "write to a closed in-memory pipe")
    }
}

impl std::error::Error for PipeClosed {}

/// The write half of an in-memory pipe. Owned by exactly one stdout-pump
/// task per iteration.
pub struct PipeWriter {
    tx: Sender<Option<u8>>,
    closed: Arc<AtomicBool>,
}

/// The read half of an in-memory pipe. Owned by exactly one copy-to-caller
/// task per iteration.
#[derive(Debug)]
pub struct PipeReader {
    rx: Receiver<Option<u8>>,
    eof: bool,
}

/// Create a fresh pipe. Intended to be called once per recompile iteration.
pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel();
    (
        PipeWriter {
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        },
        PipeReader { rx, eof: false },
    )
}

impl PipeWriter {
    /// Push one byte. Fails with `PipeClosed` if `close()` was already
    /// called or the reader was dropped.
    pub fn write_byte(&self, byte: u8) -> Result<(), PipeClosed> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PipeClosed);
        }
        self.tx.send(Some(byte)).map_err(|_| PipeClosed)
    }

    /// Push a run of bytes, one message per byte.
    pub fn write_all(&self, bytes: &[u8]) -> Result<(), PipeClosed> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Signal EOF to the reader. Idempotent: calling this more than once,
    /// or after the reader has gone away, is not an error.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(None);
        }
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl PipeReader {
    /// Block for the next byte. Returns `None` once EOF has been seen;
    /// every call after that also returns `None` without blocking.
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.eof {
            return None;
        }
        match self.rx.recv() {
            Ok(Some(byte)) => Some(byte),
            Ok(None) | Err(_) => {
                self.eof = true;
                None
            }
        }
    }

    /// Whether EOF has already been observed.
    pub fn is_eof(&self) -> bool {
        self.eof
    }
}

impl io::Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.read_byte() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
