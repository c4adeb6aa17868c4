//! End-to-end tests of the onsetcut binary.

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use predicates::prelude::*;
use tempfile::TempDir;

const SR: u32 = 22050;

fn write_wav(path: &Path, seconds: u32, silent: bool) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..(seconds * SR) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let value = if silent { 0 } else { ((i % 128) as i16 - 64) * 64 };
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

fn sample_count(path: &Path) -> u32 {
    WavReader::open(path).unwrap().duration()
}

/// A command with its configuration file isolated inside `dir`.
fn onsetcut(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("onsetcut");
    cmd.env("ONSETCUT_CONFIG", dir.path().join("config.toml"))
        .env_remove("ONSETCUT_STRATEGY")
        .env_remove("ONSETCUT_FORMAT")
        .env_remove("ONSETCUT_OUTPUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    onsetcut(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("segment"))
        .stdout(predicate::str::contains("clip"));
}

#[test]
fn test_segment_silent_file_writes_header_only_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("silent.wav");
    write_wav(&input, 2, true);
    let out = dir.path().join("tables");

    onsetcut(&dir)
        .arg("segment")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("-q")
        .assert()
        .success();

    let csv = std::fs::read_to_string(out.join("silent.segments.csv")).unwrap();
    assert_eq!(csv.trim_end(), "time,env_max,env_mean,env_std,env_delta");
}

#[test]
fn test_segment_unknown_strategy_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("silent.wav");
    write_wav(&input, 1, true);

    onsetcut(&dir)
        .arg("segment")
        .arg(&input)
        .args(["--strategy", "spectral-flux"])
        .assert()
        .failure();
}

#[test]
fn test_segment_without_audio_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not audio").unwrap();

    onsetcut(&dir)
        .arg("segment")
        .arg(dir.path())
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_clip_direct_mode_prints_path() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src.wav");
    write_wav(&source, 2, false);
    let out = dir.path().join("out");
    // Named after the padded clip, not the requested range
    let expected = out.join("src_1.000-2.000.wav");

    onsetcut(&dir)
        .arg("clip")
        .arg("--audio")
        .arg(&source)
        .args(["--start", "1.0", "--end", "1.2", "-d", "1.0", "-q"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy().into_owned()));

    let samples = sample_count(&expected);
    assert!(samples.abs_diff(SR) <= 1, "{samples}");
}

#[test]
fn test_clip_direct_mode_names_shortened_clip() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src.wav");
    write_wav(&source, 2, false);
    let out = dir.path().join("out");

    onsetcut(&dir)
        .arg("clip")
        .arg("--audio")
        .arg(&source)
        .args(["--start", "0.5", "--end", "1.8", "-d", "0.25", "-q"])
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let clip = out.join("src_0.500-0.750.wav");
    assert!(clip.exists());
    assert_eq!(sample_count(&clip), 5513);
    assert!(!out.join("src_0.500-1.800.wav").exists());
}

#[test]
fn test_clip_direct_mode_rejects_reversed_range() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src.wav");
    write_wav(&source, 1, false);

    onsetcut(&dir)
        .arg("clip")
        .arg("--audio")
        .arg(&source)
        .args(["--start", "0.8", "--end", "0.2", "-q"])
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure();
}

#[test]
fn test_clip_batch_mode_from_table() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("src.wav");
    write_wav(&source, 2, false);
    std::fs::write(
        dir.path().join("src.segments.csv"),
        "time,env_max,env_mean,env_std,env_delta\n\
         0.25,-6.0,-8.0,1.0,30.0\n\
         1.5,-6.0,-8.0,1.0,30.0\n",
    )
    .unwrap();
    let out = dir.path().join("out");

    onsetcut(&dir)
        .arg("clip")
        .arg(dir.path().join("src.segments.csv"))
        .arg("-o")
        .arg(&out)
        .args(["-d", "0.5", "--seed", "1", "-q"])
        .assert()
        .success();

    for name in ["src_0000_0.250s.wav", "src_0001_1.500s.wav"] {
        let clip = out.join("src").join(name);
        assert!(clip.exists(), "missing {}", clip.display());
        assert_eq!(sample_count(&clip), 11025);
    }
}

#[test]
fn test_config_path_honors_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    onsetcut(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(path.to_string_lossy().into_owned()));
}

#[test]
fn test_config_init_then_show() {
    let dir = TempDir::new().unwrap();

    onsetcut(&dir).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.toml").exists());

    onsetcut(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("db_delta_thresh"));
}
