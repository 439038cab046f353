mod common;
use common::*;
use std::fs::File;
use std::io::Write;

const LOG: &str = "INFO boot\nERROR one\nINFO tick\nERROR two\n";

#[test]
fn test_gzip_decompression() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let sandbox = Sandbox::new();
    let gz_path = sandbox.path().join("app.log.gz");
    let mut encoder = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(LOG.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let (stdout, stderr, exit_code) =
        sandbox.run(&["-p", "ERROR", "--threads", "2", gz_path.to_str().unwrap()], "");
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(stdout, "ERROR one\nERROR two\n");
}

#[test]
fn test_zstd_decompression() {
    let sandbox = Sandbox::new();
    let zst_path = sandbox.path().join("app.log.zst");
    let compressed = zstd::encode_all(LOG.as_bytes(), 3).unwrap();
    std::fs::write(&zst_path, compressed).unwrap();

    let (stdout, _stderr, exit_code) =
        sandbox.run(&["-p", "INFO", "-F", "count", zst_path.to_str().unwrap()], "");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "2\n");
}

#[test]
fn test_gzip_detected_by_content_not_extension() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let sandbox = Sandbox::new();
    let path = sandbox.path().join("rotated.1");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
    encoder.write_all(LOG.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let (stdout, _stderr, exit_code) = sandbox.run(&["-p", "two", path.to_str().unwrap()], "");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "ERROR two\n");
}

#[test]
fn test_gzip_on_stdin() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let sandbox = Sandbox::new();
    let path = sandbox.path().join("stdin.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(LOG.as_bytes()).unwrap();
    encoder.finish().unwrap();

    // Sandbox::run only takes text, so hand the file over as stdin directly.
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_linesift"))
        .args(["--ignore-config", "-F", "count"])
        .stdin(File::open(&path).unwrap())
        .output()
        .expect("Failed to run linesift");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "4\n");
}

#[test]
fn test_plain_text_passthrough() {
    let (stdout, _stderr, exit_code) = run_linesift_with_file(&["-F", "count"], LOG);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "4\n");
}
