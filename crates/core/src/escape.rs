// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filename escaper for `\input{...}` arguments (component B).
//!
//! TeX's `\input` takes the rest of the line as a filename with only mild
//! escaping conventions. A handful of characters need translation to a
//! control-sequence form that TeX will treat literally, and a handful of
//! others are simply rejected because there is no safe way to pass them.

use crate::error::EscapeError;

/// Escape a filename so it can be embedded in a TeX `\input{...}` argument.
///
/// Rejects filenames starting with `~` (home-directory expansion) or `|`
/// (pipe input), and filenames containing `$` (kpathsea variable expansion)
/// or `"` (unsupported). Translates `#`, space, `%`, `{`, `}`, and `\` into
/// control-sequence forms that TeX treats as literal characters.
///
/// # Examples
///
/// ```
/// use fr_core::escape_filename_for_input;
///
/// assert_eq!(escape_filename_for_input("abc.tex").unwrap(), "abc.tex");
/// assert_eq!(
///     escape_filename_for_input("a  b.tex").unwrap(),
///     r"a\space \space b.tex"
/// );
/// ```
pub fn escape_filename_for_input(s: &str) -> Result<String, EscapeError> {
    if s.starts_with('~') {
        return Err(EscapeError::LeadingTilde(s.to_string()));
    }
    if s.starts_with('|') {
        return Err(EscapeError::LeadingPipe(s.to_string()));
    }
    if s.contains('$') {
        return Err(EscapeError::DollarSign(s.to_string()));
    }
    if s.contains('"') {
        return Err(EscapeError::DoubleQuote(s.to_string()));
    }

    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '#' => out.push_str(r"\string#"),
            ' ' => out.push_str(r"\space "),
            '%' => out.push_str(r"\csname cs_to_str:N\endcsname\%"),
            '{' => out.push_str(r"\csname cs_to_str:N\endcsname\{"),
            '}' => out.push_str(r"\csname cs_to_str:N\endcsname\}"),
            '\\' => out.push_str(r"\csname cs_to_str:N\endcsname\\"),
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "escape_tests.rs"]
mod tests;
