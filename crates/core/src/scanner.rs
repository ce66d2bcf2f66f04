// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Preamble scanner (component A).
//!
//! Locates the pause marker (or `\begin{document}`) in a TeX source and
//! returns the preamble prefix plus a flag for which kind of marker was
//! found.

use crate::error::ScanError;
use crate::model::Preamble;

const MARKER_EXPLICIT: &[u8] = br"\fastrecompileendpreamble";
const MARKER_EXPLICIT_CSNAME: &[u8] = br"\csname fastrecompileendpreamble\endcsname";
const MARKER_BEGIN_DOCUMENT: &[u8] = br"\begin{document}";

/// Split source bytes into trimmed byte-lines.
///
/// Splits on `\n`; a trailing `\r` left over from a `\r\n` line ending is
/// stripped so CRLF and LF sources scan identically.
fn split_lines(text: &[u8]) -> Vec<&[u8]> {
    text.split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

/// Extract preamble information from source bytes.
///
/// See spec §4.A: an explicit `\fastrecompileendpreamble` (or its `\csname`
/// synonym) wins over an implicit `\begin{document}` pause; more than one
/// explicit marker is rejected as ambiguous; neither present is rejected as
/// having no hook point.
pub fn extract_preamble(text: &[u8]) -> Result<Preamble, ScanError> {
    let lines = split_lines(text);

    let explicit_indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| **line == MARKER_EXPLICIT || **line == MARKER_EXPLICIT_CSNAME)
        .map(|(i, _)| i)
        .collect();

    if explicit_indices.len() > 1 {
        return Err(ScanError::multiple_end_preamble_markers());
    }

    if let Some(&index) = explicit_indices.first() {
        return Ok(Preamble {
            lines: lines[..index].iter().map(|l| l.to_vec()).collect(),
            implicit: false,
        });
    }

    if let Some(index) = lines.iter().position(|line| *line == MARKER_BEGIN_DOCUMENT) {
        return Ok(Preamble {
            lines: lines[..index].iter().map(|l| l.to_vec()).collect(),
            implicit: true,
        });
    }

    Err(ScanError::no_marker())
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
