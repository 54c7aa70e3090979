//! End-to-end CLI tests: run the real binary against a fake `ddcutil`
//! shell script placed on PATH, with the cache redirected into a temp dir.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A fake ddcutil that serves two monitors (LG reported before Dell) and a
/// 50% brightness reading, and appends every invocation to `$DDCUTIL_LOG`.
/// `$DDCUTIL_DENY` makes VCP operations fail with a permission error;
/// `$DDCUTIL_DETECT_FAIL` makes detection exit non-zero.
const FAKE_DDCUTIL: &str = r#"#!/bin/sh
[ -n "$DDCUTIL_LOG" ] && echo "$@" >> "$DDCUTIL_LOG"
case "$*" in
  detect*)
    if [ -n "$DDCUTIL_DETECT_FAIL" ]; then
      echo "DDC communication failed" >&2
      exit 2
    fi
    echo 'Display 1
   I2C bus:  /dev/i2c-5
   EDID synopsis:
      Mfg id:               GSM
      Model:                27GN950
      Serial number:        XYZ789
   VCP version:         2.1

Display 2
   I2C bus:  /dev/i2c-4
   EDID synopsis:
      Mfg id:               DEL
      Model:                U2720Q
      Serial number:        ABC123
   VCP version:         2.1'
    ;;
  *getvcp*|*setvcp*)
    if [ -n "$DDCUTIL_DENY" ]; then
      echo "Open failed for /dev/i2c-4: Permission denied" >&2
      exit 1
    fi
    case "$*" in
      *getvcp*)
        echo "VCP code 0x10 (Brightness                    ): current value =    50, max value =   100"
        ;;
    esac
    ;;
esac
"#;

/// Isolated environment for one test: fake tool dir, private temp dir
/// (so each test gets its own cache file), and an invocation log.
struct TestEnv {
    _root: TempDir,
    bin_dir: PathBuf,
    tmp_dir: PathBuf,
    log: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let bin_dir = root.path().join("bin");
        let tmp_dir = root.path().join("tmp");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::create_dir_all(&tmp_dir).unwrap();

        let tool = bin_dir.join("ddcutil");
        fs::write(&tool, FAKE_DDCUTIL).unwrap();
        let mut perms = fs::metadata(&tool).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&tool, perms).unwrap();

        let log = root.path().join("ddcutil.log");
        Self {
            _root: root,
            bin_dir,
            tmp_dir,
            log,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("brightness-control").unwrap();
        cmd.env_clear()
            .env("PATH", &self.bin_dir)
            .env("TMPDIR", &self.tmp_dir)
            .env("USER", "bctl-test")
            .env("DDCUTIL_LOG", &self.log);
        cmd
    }

    fn logged_invocations(&self, needle: &str) -> usize {
        let Ok(log) = fs::read_to_string(&self.log) else {
            return 0;
        };
        log.lines().filter(|line| line.contains(needle)).count()
    }
}

#[test]
fn no_arguments_prints_quick_start() {
    let env = TestEnv::new();
    env.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("--detect"));
}

#[test]
fn detect_prints_slot_table_with_dell_first() {
    let env = TestEnv::new();
    let assert = env.command().arg("--detect").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    let dell = stdout.find("del-u2720q-abc123").expect("dell identity in table");
    let lg = stdout.find("gsm-27gn950-xyz789").expect("lg identity in table");
    assert!(dell < lg, "slot 1 must be the alphabetically first identity");
    assert!(stdout.contains("/dev/i2c-4"));
}

#[test]
fn detect_json_is_machine_parseable() {
    let env = TestEnv::new();
    let assert = env
        .command()
        .args(["--detect", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["slot"], 1);
    assert_eq!(entries[0]["stable_id"], "del-u2720q-abc123");
    assert_eq!(entries[0]["bus"], "/dev/i2c-4");
}

#[test]
fn adjust_up_steps_brightness_and_writes_the_bus() {
    let env = TestEnv::new();
    env.command()
        .args(["-m", "1", "-a", "up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60"));

    // Slot 1 is the Dell on bus 4, read at 50 and stepped to 60.
    assert_eq!(env.logged_invocations("--bus 4"), 2);
    assert_eq!(env.logged_invocations("setvcp 0x10 60"), 1);
}

#[test]
fn repeated_keypresses_reuse_the_cached_mapping() {
    let env = TestEnv::new();
    env.command().arg("--detect").assert().success();
    env.command().args(["-m", "1", "-a", "up"]).assert().success();
    env.command().args(["-m", "2", "-a", "down"]).assert().success();

    // Only the --detect run spawned a detection; both adjustments hit the cache.
    assert_eq!(env.logged_invocations("detect"), 1);
}

#[test]
fn unknown_slot_fails_with_hint() {
    let env = TestEnv::new();
    env.command()
        .args(["-m", "9", "-a", "up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown monitor slot 9"))
        .stderr(predicate::str::contains("--detect"));
}

#[test]
fn missing_tool_fails_with_install_hint() {
    let env = TestEnv::new();
    let empty = env.tmp_dir.join("empty-path");
    fs::create_dir_all(&empty).unwrap();

    env.command()
        .env("PATH", &empty)
        .args(["-m", "1", "-a", "up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ddcutil not found"))
        .stderr(predicate::str::contains("apt install ddcutil"));
}

#[test]
fn permission_denied_on_the_bus_shows_the_i2c_group_hint() {
    let env = TestEnv::new();
    // Populate the cache first so the failing run reaches the VCP read.
    env.command().arg("--detect").assert().success();

    env.command()
        .env("DDCUTIL_DENY", "1")
        .args(["-m", "1", "-a", "up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Permission denied accessing /dev/i2c-4"))
        .stderr(predicate::str::contains("i2c group"));
}

#[test]
fn failed_forced_detection_does_not_leave_a_stale_cache() {
    let env = TestEnv::new();
    let cache_file = env
        .tmp_dir
        .join("brightness-control-bctl-test-bus-cache.json");

    env.command().args(["-m", "1", "-a", "up"]).assert().success();
    assert!(cache_file.exists());

    env.command()
        .env("DDCUTIL_DETECT_FAIL", "1")
        .arg("--detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ddcutil detect failed"));

    // The pre-failure mapping is gone; the next keypress re-detects.
    assert!(!cache_file.exists());
}

#[test]
fn corrupt_cache_file_is_silently_replaced() {
    let env = TestEnv::new();
    let cache_file = env
        .tmp_dir
        .join("brightness-control-bctl-test-bus-cache.json");

    fs::write(&cache_file, "{ not json").unwrap();
    env.command()
        .args(["-m", "1", "-a", "up"])
        .assert()
        .success();

    // The fresh resolution overwrote the corrupt file with valid JSON.
    let repaired = fs::read_to_string(&cache_file).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&repaired).is_ok());
}

#[test]
fn detect_conflicts_with_monitor_flag() {
    let env = TestEnv::new();
    env.command()
        .args(["--detect", "-m", "1"])
        .assert()
        .failure();
}

#[test]
fn set_above_100_is_rejected_by_the_parser() {
    let env = TestEnv::new();
    env.command()
        .args(["-m", "1", "--set", "150"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("150"));
}
