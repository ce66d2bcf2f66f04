// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fr-tempdir: the pid-tagged temp directory registry (component D).
//!
//! Every owned scratch directory lives under one registry root,
//! `$TMP/.tex-fast-recompile-tmp`, and is named `<pid>-<unique>`. Naming
//! directories after the creating process lets a freshly started daemon
//! recognize and reclaim directories left behind by a predecessor that
//! crashed or was killed before it could clean up after itself.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use sysinfo::{Pid, System};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TempDirError {
    #[error("failed to create registry root {path}: {source}")]
    CreateRoot { path: PathBuf, source: io::Error },
    #[error("failed to create temp directory {path}: {source}")]
    CreateEntry { path: PathBuf, source: io::Error },
}

/// Root of the registry: `$TMP/.tex-fast-recompile-tmp`.
pub fn registry_root() -> PathBuf {
    std::env::temp_dir().join(".tex-fast-recompile-tmp")
}

/// An owned scratch directory. Removed from disk when dropped.
///
/// Removal on drop is best-effort: if it fails (e.g. the directory was
/// already removed by the caller), the error is swallowed, matching the
/// registry's "ignore not-found" cleanup contract.
#[derive(Debug)]
pub struct TempDirHandle {
    path: PathBuf,
}

impl TempDirHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the handle without removing the directory from disk.
    pub fn leak(self) -> PathBuf {
        let path = self.path.clone();
        std::mem::forget(self);
        path
    }
}

impl Drop for TempDirHandle {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %err, "failed to remove temp directory");
            }
        }
    }
}

/// Registry of pid-tagged scratch directories under one root.
pub struct TempDirRegistry {
    root: PathBuf,
}

impl TempDirRegistry {
    /// Open (creating if necessary) the registry at its well-known root.
    pub fn open() -> Result<Self, TempDirError> {
        Self::open_at(registry_root())
    }

    /// Open (creating if necessary) the registry at a specific root.
    /// Exposed for tests; production callers should use [`Self::open`].
    pub fn open_at(root: PathBuf) -> Result<Self, TempDirError> {
        fs::create_dir_all(&root).map_err(|source| TempDirError::CreateRoot {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh owned scratch directory named `<pid>-<unique>`.
    pub fn create(&self) -> Result<TempDirHandle, TempDirError> {
        let name = format!("{}-{}", process::id(), Uuid::new_v4());
        let path = self.root.join(name);
        fs::create_dir(&path).map_err(|source| TempDirError::CreateEntry {
            path: path.clone(),
            source,
        })?;
        Ok(TempDirHandle { path })
    }

    /// Remove entries whose leading `<pid>` no longer names a live process.
    /// Called once at daemon startup. Races (an entry disappearing between
    /// listing and removal) are ignored.
    pub fn gc_dead(&self) {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        let mut system = System::new();
        system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(pid_str) = name.split('-').next() else {
                continue;
            };
            let Ok(pid) = pid_str.parse::<u32>() else {
                continue;
            };
            if system.process(Pid::from_u32(pid)).is_some() {
                continue;
            }
            if let Err(err) = fs::remove_dir_all(entry.path()) {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(path = %entry.path().display(), %err, "failed to gc orphaned temp directory");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
