use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Mono 16-bit PCM WEM
fn pcm_wem(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&sample_rate.to_le_bytes());
    fmt.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut body = b"WAVE".to_vec();
    body.extend(chunk(b"fmt ", &fmt));
    body.extend(chunk(b"data", &payload));
    chunk(b"RIFF", &body)
}

fn bank(streams: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut didx = Vec::new();
    let mut data = Vec::new();
    for (id, wem) in streams {
        didx.extend_from_slice(&id.to_le_bytes());
        didx.extend_from_slice(&(data.len() as u32).to_le_bytes());
        didx.extend_from_slice(&(wem.len() as u32).to_le_bytes());
        data.extend_from_slice(wem);
    }
    let mut out = chunk(b"BKHD", &[0x71, 0, 0, 0, 1, 0, 0, 0]);
    out.extend(chunk(b"DIDX", &didx));
    out.extend(chunk(b"DATA", &data));
    out
}

fn wsb2wav(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wsb2wav").unwrap();
    cmd.current_dir(dir).arg("--native-only");
    cmd
}

#[test]
fn converts_each_stream_to_its_own_wav() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("input")).unwrap();
    std::fs::write(
        dir.path().join("input/music.bnk"),
        bank(&[(1, pcm_wem(44100, &[100, -100, 200])), (2, pcm_wem(22050, &[7; 64]))]),
    )
    .unwrap();

    wsb2wav(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 files converted, 0 failed"));

    let first = hound::WavReader::open(dir.path().join("output/music_00000001.wav")).unwrap();
    assert_eq!(first.spec().sample_rate, 44100);
    let samples: Vec<i16> = first.into_samples().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![100, -100, 200]);

    let second = hound::WavReader::open(dir.path().join("output/music_00000002.wav")).unwrap();
    assert_eq!(second.spec().sample_rate, 22050);
    assert_eq!(second.len(), 64);
}

#[test]
fn rerun_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("input")).unwrap();
    std::fs::write(dir.path().join("input/sfx.wsb"), bank(&[(77, pcm_wem(48000, &[1, 2, 3, 4]))])).unwrap();

    wsb2wav(dir.path()).assert().success();
    let before = std::fs::read(dir.path().join("output/sfx_00000077.wav")).unwrap();

    wsb2wav(dir.path()).assert().success();
    let after = std::fs::read(dir.path().join("output/sfx_00000077.wav")).unwrap();

    assert_eq!(before, after);
}

#[test]
fn empty_input_reports_zero() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("input")).unwrap();

    wsb2wav(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 files converted, 0 failed"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    wsb2wav(dir.path())
        .args(["-i", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unreadable input"));
}

#[test]
fn broken_bank_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("banks");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("a.wsb"), b"not a sound bank").unwrap();
    std::fs::write(input.join("b.wsb"), bank(&[(5, pcm_wem(8000, &[9]))])).unwrap();

    wsb2wav(dir.path())
        .args(["-i", "banks", "-o", "wavs", "-w", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 files converted, 1 failed"))
        .stdout(predicate::str::contains("No audio streams found"));

    assert!(dir.path().join("wavs/b_00000005.wav").exists());
}

#[test]
fn write_config_dumps_effective_settings() {
    let dir = TempDir::new().unwrap();

    wsb2wav(dir.path())
        .args(["--write-config", "wsb2wav.toml", "-p", "ow_"])
        .assert()
        .success();

    let text = std::fs::read_to_string(dir.path().join("wsb2wav.toml")).unwrap();
    assert!(text.contains("prefix = \"ow_\""));
    assert!(text.contains("native_only = true"));
}

#[test]
fn bankinfo_lists_streams() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vo.bnk");
    std::fs::write(&path, bank(&[(12, pcm_wem(24000, &[0; 8]))])).unwrap();

    Command::cargo_bin("bankinfo")
        .unwrap()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Streams:    1"))
        .stdout(predicate::str::contains("00000012"))
        .stdout(predicate::str::contains("PCM"));
}

#[test]
fn verbose_from_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("input")).unwrap();
    std::fs::write(dir.path().join("wsb2wav.toml"), "[processing]\nverbose = true\n").unwrap();

    wsb2wav(dir.path())
        .args(["-c", "wsb2wav.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("wsb2wav v{}", env!("CARGO_PKG_VERSION"))));
}
