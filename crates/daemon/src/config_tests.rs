use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("fastrecompile").chain(args.iter().copied()))
}

#[test]
fn defaults_enable_staging_close_stdin_and_show_time() {
    let cli = parse(&["pdflatex", "doc.tex"]);
    assert!(cli.temp_output_directory());
    assert!(cli.close_stdin());
    assert!(cli.show_time());
    assert_eq!(cli.auto_rerun, 5);
    assert_eq!(cli.num_separation_lines, 5);
    assert!((cli.extra_delay - 0.05).abs() < f64::EPSILON);
}

#[test]
fn no_flags_negate_their_positive_counterparts() {
    let cli = parse(&[
        "pdflatex",
        "doc.tex",
        "--no-temp-output-directory",
        "--no-close-stdin",
        "--no-show-time",
    ]);
    assert!(!cli.temp_output_directory());
    assert!(!cli.close_stdin());
    assert!(!cli.show_time());
}

#[test]
fn jobname_defaults_to_filename_stem() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.tex");
    std::fs::write(&source, "").unwrap();

    let cli = parse(&["pdflatex", source.to_str().unwrap()]);
    let config = Config::from_cli(cli).unwrap();
    assert_eq!(config.jobname, "report");
    assert_eq!(config.output_directory, PathBuf::from("."));
    assert_eq!(config.generated_pdf_path, PathBuf::from("./report.pdf"));
}

#[test]
fn copy_output_colliding_with_generated_pdf_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.tex");
    std::fs::write(&source, "").unwrap();

    let cli = parse(&[
        "pdflatex",
        source.to_str().unwrap(),
        "--output-directory",
        dir.path().to_str().unwrap(),
        "--copy-output",
        dir.path().join("report.pdf").to_str().unwrap(),
    ]);
    let err = Config::from_cli(cli).unwrap_err();
    assert!(matches!(err, ConfigError::CopyOutputCollision(_)));
}

#[test]
fn missing_source_file_is_rejected() {
    let cli = parse(&["pdflatex", "/nonexistent/does-not-exist.tex"]);
    let err = Config::from_cli(cli).unwrap_err();
    assert!(matches!(err, ConfigError::SourceNotFound(_)));
}

#[test]
fn filename_containing_a_dollar_sign_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("foo$HOME.tex");
    std::fs::write(&source, "").unwrap();

    let cli = parse(&["pdflatex", source.to_str().unwrap()]);
    let err = Config::from_cli(cli).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidFilename(_, _)));
}
