use super::*;
use std::path::PathBuf;

fn base_config() -> EngineConfig {
    EngineConfig {
        executable: "pdflatex".to_string(),
        jobname: "main".to_string(),
        output_directory: PathBuf::from("/tmp/out"),
        shell_escape: false,
        eight_bit: false,
        recorder: false,
        extra_args: Vec::new(),
        extra_commands: Vec::new(),
        format_mode: FormatMode::NotUsed,
        pause_at_begin_document_end: false,
    }
}

fn explicit_preamble() -> Preamble {
    Preamble {
        lines: vec![b"\\documentclass{article}".to_vec()],
        implicit: false,
    }
}

#[test]
fn not_used_mode_builds_bootstrap_with_explicit_input() {
    let cfg = base_config();
    let argv = build_command_line(&cfg, &explicit_preamble(), Path::new("doc.tex")).unwrap();

    assert_eq!(argv[0], "pdflatex");
    assert!(argv.contains(&"--jobname=main".to_string()));
    assert!(argv.contains(&"--output-directory=/tmp/out".to_string()));
    let bootstrap = argv.last().unwrap();
    assert!(bootstrap.contains(r"\RequirePackage{fastrecompile}"));
    assert!(bootstrap.contains(r"\fastrecompilecheckversion{0.5.0}"));
    assert!(bootstrap.contains(r"\input{doc.tex}"));
    assert!(!bootstrap.contains("fastrecompilesetimplicitpreamble"));
}

#[test]
fn implicit_preamble_inserts_pause_token() {
    let cfg = base_config();
    let preamble = Preamble {
        lines: vec![],
        implicit: true,
    };
    let argv = build_command_line(&cfg, &preamble, Path::new("doc.tex")).unwrap();
    let bootstrap = argv.last().unwrap();
    assert!(bootstrap.contains(r"\fastrecompilesetimplicitpreamble"));
    assert!(!bootstrap.contains("fastrecompilesetimplicitpreambleii"));
}

#[test]
fn staged_pause_at_end_uses_ii_variant() {
    let mut cfg = base_config();
    cfg.pause_at_begin_document_end = true;
    let preamble = Preamble {
        lines: vec![],
        implicit: true,
    };
    let argv = build_command_line(&cfg, &preamble, Path::new("doc.tex")).unwrap();
    let bootstrap = argv.last().unwrap();
    assert!(bootstrap.contains(r"\fastrecompilesetimplicitpreambleii"));
}

#[test]
fn precompile_mode_adds_ini_and_ampersand_executable() {
    let mut cfg = base_config();
    cfg.format_mode = FormatMode::Precompile;
    let argv = build_command_line(&cfg, &explicit_preamble(), Path::new("doc.tex")).unwrap();

    assert_eq!(argv[1], "--ini");
    assert!(argv.contains(&"&pdflatex".to_string()));
    let bootstrap = argv.last().unwrap();
    assert!(bootstrap.contains(r"\csname @@input\endcsname{mylatexformat.ltx}{doc.tex}"));
}

#[test]
fn use_mode_appends_ampersand_jobname_and_raw_filename() {
    let mut cfg = base_config();
    cfg.format_mode = FormatMode::Use;
    let argv = build_command_line(&cfg, &explicit_preamble(), Path::new("doc.tex")).unwrap();

    assert!(argv.contains(&"&main".to_string()));
    assert_eq!(argv.last().unwrap(), "doc.tex");
}

#[test]
fn shell_escape_8bit_recorder_flags_are_appended_in_order() {
    let mut cfg = base_config();
    cfg.shell_escape = true;
    cfg.eight_bit = true;
    cfg.recorder = true;
    let argv = build_command_line(&cfg, &explicit_preamble(), Path::new("doc.tex")).unwrap();

    let shell_pos = argv.iter().position(|a| a == "--shell-escape").unwrap();
    let bit_pos = argv.iter().position(|a| a == "--8bit").unwrap();
    let recorder_pos = argv.iter().position(|a| a == "--recorder").unwrap();
    assert!(shell_pos < bit_pos);
    assert!(bit_pos < recorder_pos);
}

#[test]
fn invalid_filename_is_rejected() {
    let cfg = base_config();
    let err = build_command_line(&cfg, &explicit_preamble(), Path::new("~evil.tex")).unwrap_err();
    assert!(matches!(err, EscapeError::LeadingTilde(_)));
}
