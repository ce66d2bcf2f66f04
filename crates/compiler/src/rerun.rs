// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rerun-needed heuristic (spec §4.H, step "On success").
//!
//! The companion package's log output uses the same family of messages
//! LaTeX itself prints when a cross-reference-dependent package (`rerunfilecheck`,
//! `hyperref`, ...) detects it needs another pass. Matching `__main__.py`'s
//! constants keeps the heuristic in sync with the wider LaTeX ecosystem
//! rather than inventing a narrower one.

/// Substrings whose presence anywhere in the compilation log means another
/// pass is needed.
pub const NEEDS_RERUN_MARKERS: &[&str] = &["Rerun to get", "Rerun.", "Please rerun"];

/// Whether the given log bytes contain any rerun-needed marker.
pub fn needs_rerun(log: &[u8]) -> bool {
    let text = String::from_utf8_lossy(log);
    NEEDS_RERUN_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_marker() {
        assert!(needs_rerun(b"Label(s) may have changed. Rerun to get cross-references right."));
        assert!(needs_rerun(b"LaTeX Warning: There were undefined references.\nRerun."));
        assert!(needs_rerun(b"Package rerunfilecheck Warning: File has changed. Please rerun."));
    }

    #[test]
    fn clean_log_does_not_need_rerun() {
        assert!(!needs_rerun(b"Output written on main.pdf (1 page, 12345 bytes)."));
    }
}
