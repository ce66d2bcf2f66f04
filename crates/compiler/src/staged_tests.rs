use super::*;
use fr_core::FormatMode;
use fr_pipe::pipe;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn write_source(dir: &std::path::Path, contents: &str) -> PathBuf {
    let path = dir.join("doc.tex");
    std::fs::write(&path, contents).unwrap();
    path
}

fn base_cfg(executable: &str, output_directory: PathBuf) -> EngineConfig {
    EngineConfig {
        executable: executable.to_string(),
        jobname: "doc".to_string(),
        output_directory,
        shell_escape: false,
        eight_bit: false,
        recorder: false,
        extra_args: Vec::new(),
        extra_commands: Vec::new(),
        format_mode: FormatMode::NotUsed,
        pause_at_begin_document_end: false,
    }
}

#[test]
fn successful_run_mirrors_generated_files_to_real_output_directory() {
    let work = tempfile::tempdir().unwrap();
    let real_output = work.path().join("out");
    std::fs::create_dir(&real_output).unwrap();
    let source = write_source(work.path(), "\\fastrecompileendpreamble\n\\begin{document}\n");

    let registry_root = work.path().join("registry");
    let registry = TempDirRegistry::open_at(registry_root).unwrap();
    let cfg = base_cfg(&fixture("fake_engine.sh"), real_output.clone());

    let mut compiler = StagedCompiler::enter(&registry, &cfg, &source, true, None).unwrap();

    // Simulate the engine having produced an output file in the temp dir by
    // writing it before finish() drains and waits (the fixture engine does
    // not itself write output files).
    let temp_dir_path = compiler.temp_dir.path().to_path_buf();
    std::fs::write(temp_dir_path.join("doc.pdf"), b"%PDF-fake").unwrap();

    let (writer, _reader) = pipe();
    let ok = compiler.finish(|| {}, &writer).unwrap();
    assert!(ok);

    assert!(real_output.join("doc.pdf").exists());
    compiler.exit();
}

#[test]
fn pause_is_forced_to_end_of_begin_document() {
    let work = tempfile::tempdir().unwrap();
    let real_output = work.path().join("out");
    std::fs::create_dir(&real_output).unwrap();
    let source = write_source(work.path(), "\\begin{document}\n");

    let registry = TempDirRegistry::open_at(work.path().join("registry")).unwrap();
    let cfg = base_cfg(&fixture("fake_engine.sh"), real_output);

    let compiler = StagedCompiler::enter(&registry, &cfg, &source, true, None).unwrap();
    assert!(compiler.inner.preamble_at_start().implicit);
    compiler.exit();
}

#[test]
fn subdirectory_outputs_are_not_mirrored() {
    let work = tempfile::tempdir().unwrap();
    let real_output = work.path().join("out");
    std::fs::create_dir(&real_output).unwrap();
    let source = write_source(work.path(), "\\fastrecompileendpreamble\n\\begin{document}\n");

    let registry = TempDirRegistry::open_at(work.path().join("registry")).unwrap();
    let cfg = base_cfg(&fixture("fake_engine.sh"), real_output.clone());

    let mut compiler = StagedCompiler::enter(&registry, &cfg, &source, true, None).unwrap();
    let temp_dir_path = compiler.temp_dir.path().to_path_buf();
    std::fs::create_dir(temp_dir_path.join("subdir")).unwrap();
    std::fs::write(temp_dir_path.join("subdir").join("nested.aux"), b"x").unwrap();

    let (writer, _reader) = pipe();
    compiler.finish(|| {}, &writer).unwrap();

    assert!(!real_output.join("subdir").exists());
    compiler.exit();
}
