//! Integration tests for the `tagline` binary.
//!
//! Each test writes a small fake audio file into a temp directory, runs
//! the CLI against it and checks both the output and the file contents.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ──────────────────────── helpers ────────────────────────

const AUDIO: &[u8] = b"\xFF\xFB\x90\x64 fake mpeg audio payload";

/// A minimal ID3v2.3 tag holding TIT2 and TPE1.
fn v23_tag() -> Vec<u8> {
    let mut body = Vec::new();
    for (id, text) in [("TIT2", "Old Title"), ("TPE1", "Old Artist")] {
        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&(text.len() as u32 + 1).to_be_bytes());
        body.extend_from_slice(&[0, 0, 0]);
        body.extend_from_slice(text.as_bytes());
    }
    let mut tag = b"ID3\x03\x00\x00".to_vec();
    let size = body.len() as u32;
    tag.extend_from_slice(&[(size >> 21) as u8 & 0x7F, (size >> 14) as u8 & 0x7F, (size >> 7) as u8 & 0x7F, size as u8 & 0x7F]);
    tag.extend(body);
    tag
}

fn audio_file(dir: &Path, name: &str, tagged: bool) -> PathBuf {
    let path = dir.join(name);
    let mut contents = if tagged { v23_tag() } else { Vec::new() };
    contents.extend_from_slice(AUDIO);
    fs::write(&path, contents).unwrap();
    path
}

/// Get a `Command` for the `tagline` binary.
#[allow(deprecated)]
fn tagline_cmd() -> Command {
    Command::cargo_bin("tagline").expect("Failed to find `tagline` binary")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ──────────────────────── tests ─────────────────────────

#[test]
fn test_print_friendly_values() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);

    tagline_cmd()
        .args(["print", arg(&song)])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID3v2.3 tag, 2 frames"))
        .stdout(predicate::str::contains("title: Old Title"))
        .stdout(predicate::str::contains("artist: Old Artist"));
}

#[test]
fn test_print_frames_as_json() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);

    let output = tagline_cmd()
        .args(["print", "--frames", "--json", arg(&song)])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("print --json should emit JSON");
    assert_eq!(json[0]["version"], "ID3v2.3");
    let titles = json[0]["values"]["TIT2"].as_array().unwrap();
    assert_eq!(titles.len(), 1);
    assert!(titles[0].as_str().unwrap().contains("Old Title"));
}

#[test]
fn test_print_file_without_tag() {
    let tmp = TempDir::new().unwrap();
    let plain = audio_file(tmp.path(), "plain.mp3", false);

    tagline_cmd()
        .args(["print", arg(&plain)])
        .assert()
        .success()
        .stderr(predicate::str::contains("no ID3v2 tag"));
}

#[test]
fn test_set_creates_tag() {
    let tmp = TempDir::new().unwrap();
    let plain = audio_file(tmp.path(), "plain.mp3", false);

    tagline_cmd()
        .args(["set", "artist", "First / Second", arg(&plain)])
        .assert()
        .success();

    let contents = fs::read(&plain).unwrap();
    assert_eq!(&contents[..4], b"ID3\x04");
    assert!(contents.ends_with(AUDIO));

    tagline_cmd()
        .args(["print", arg(&plain)])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID3v2.4 tag"))
        .stdout(predicate::str::contains("artist: First / Second"));
}

#[test]
fn test_set_frame_id_on_many_files() {
    let tmp = TempDir::new().unwrap();
    let a = audio_file(tmp.path(), "a.mp3", true);
    let b = audio_file(tmp.path(), "b.mp3", true);

    tagline_cmd()
        .args(["set", "TALB", "Shared Album", arg(&a), arg(&b)])
        .assert()
        .success();

    for file in [&a, &b] {
        tagline_cmd()
            .args(["print", arg(file)])
            .assert()
            .success()
            .stdout(predicate::str::contains("album: Shared Album"))
            .stdout(predicate::str::contains("title: Old Title"));
    }
}

#[test]
fn test_set_rejects_unknown_and_wrong_version_ids() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);
    let before = fs::read(&song).unwrap();

    tagline_cmd()
        .args(["set", "nonsense", "x", arg(&song)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown name"));

    tagline_cmd()
        .args(["set", "TT2", "x", arg(&song)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not defined in ID3v2.3"));

    assert_eq!(fs::read(&song).unwrap(), before);
}

#[test]
fn test_dry_run_leaves_file_alone() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);
    let before = fs::read(&song).unwrap();

    tagline_cmd()
        .args(["--dry-run", "set", "title", "New", arg(&song)])
        .assert()
        .success();
    tagline_cmd()
        .args(["-n", "delete", arg(&song)])
        .assert()
        .success();

    assert_eq!(fs::read(&song).unwrap(), before);
}

#[test]
fn test_remove_friendly_value() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);

    tagline_cmd()
        .args(["remove", "artist", arg(&song)])
        .assert()
        .success();

    tagline_cmd()
        .args(["print", arg(&song)])
        .assert()
        .success()
        .stdout(predicate::str::contains("title: Old Title"))
        .stdout(predicate::str::contains("artist:").not());
}

#[test]
fn test_delete_tag_restores_audio() {
    let tmp = TempDir::new().unwrap();
    let song = audio_file(tmp.path(), "song.mp3", true);

    tagline_cmd().args(["delete", arg(&song)]).assert().success();
    assert_eq!(fs::read(&song).unwrap(), AUDIO);
}

#[test]
fn test_dump_and_load() {
    let tmp = TempDir::new().unwrap();
    let source = audio_file(tmp.path(), "source.mp3", true);
    let target = audio_file(tmp.path(), "target.mp3", false);

    let output = tagline_cmd().args(["dump", arg(&source)]).assert().success();
    let tag = output.get_output().stdout.clone();
    assert_eq!(tag, v23_tag());

    tagline_cmd()
        .args(["load", arg(&target)])
        .write_stdin(tag.clone())
        .assert()
        .success();
    assert_eq!(fs::read(&target).unwrap(), fs::read(&source).unwrap());

    tagline_cmd()
        .args(["load", arg(&target)])
        .write_stdin(b"not a tag".to_vec())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid ID3v2 tag"));
}

#[test]
fn test_list_frames_per_version() {
    tagline_cmd()
        .args(["list", "--version", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TT2"))
        .stdout(predicate::str::contains("TIT2").not());

    tagline_cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TIT2"))
        .stdout(predicate::str::contains("TDRC"));

    tagline_cmd().args(["list", "--version", "5"]).assert().failure();
}

#[test]
fn test_v1_print_and_delete() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("song.mp3");
    let mut contents = AUDIO.to_vec();
    let mut trailer = [0u8; 128];
    trailer[..3].copy_from_slice(b"TAG");
    trailer[3..8].copy_from_slice(b"Title");
    trailer[126] = 4;
    trailer[127] = 17;
    contents.extend_from_slice(&trailer);
    fs::write(&path, contents).unwrap();

    tagline_cmd()
        .args(["v1", arg(&path)])
        .assert()
        .success()
        .stdout(predicate::str::contains("title=\"Title\""))
        .stdout(predicate::str::contains("track=4"))
        .stdout(predicate::str::contains("genre=17 (Rock)"));

    tagline_cmd().args(["delete", "--v1", arg(&path)]).assert().success();
    assert_eq!(fs::read(&path).unwrap(), AUDIO);
}

#[test]
fn test_cli_help_works() {
    tagline_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read and edit ID3 tags"));
}
