use super::*;

#[test]
fn plain_filename_is_unchanged() {
    assert_eq!(escape_filename_for_input("abc.tex").unwrap(), "abc.tex");
}

#[test]
fn spaces_become_space_control_sequences() {
    assert_eq!(
        escape_filename_for_input("a  b.tex").unwrap(),
        r"a\space \space b.tex"
    );
}

#[test]
fn hash_brace_percent_are_escaped() {
    assert_eq!(
        escape_filename_for_input("#}%").unwrap(),
        "\\string#\\csname cs_to_str:N\\endcsname\\}\\csname cs_to_str:N\\endcsname\\%"
    );
}

#[test]
fn backslash_is_escaped() {
    assert_eq!(
        escape_filename_for_input(r"a\b").unwrap(),
        r"a\csname cs_to_str:N\endcsname\\b"
    );
}

#[test]
fn leading_tilde_is_rejected() {
    assert!(matches!(
        escape_filename_for_input("~/evil.tex"),
        Err(EscapeError::LeadingTilde(_))
    ));
}

#[test]
fn leading_pipe_is_rejected() {
    assert!(matches!(
        escape_filename_for_input("|cat /etc/passwd"),
        Err(EscapeError::LeadingPipe(_))
    ));
}

#[test]
fn dollar_sign_anywhere_is_rejected() {
    assert!(matches!(
        escape_filename_for_input("foo$HOME.tex"),
        Err(EscapeError::DollarSign(_))
    ));
}

#[test]
fn double_quote_anywhere_is_rejected() {
    assert!(matches!(
        escape_filename_for_input("foo\"bar.tex"),
        Err(EscapeError::DoubleQuote(_))
    ));
}

#[test]
fn tilde_not_at_start_is_allowed() {
    assert_eq!(escape_filename_for_input("a~b.tex").unwrap(), "a~b.tex");
}
