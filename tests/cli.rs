//! Integration tests for the revgate binary.
//!
//! These tests exercise the full CLI against real repositories.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use revgate::core::types::Oid;
use support::{TestRepo, EPOCH};

/// Get a command for running revgate with an isolated config home.
fn revgate(repo: &TestRepo, home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("revgate").unwrap();
    cmd.arg("--cwd")
        .arg(repo.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("REVGATE_CONFIG");
    cmd
}

/// `c0..c4` on master, `v1` tagging `c2`, and a pending change `x1 - x2`
/// whose only ref is `refs/changes/01/1/1`.
fn fixture() -> (TestRepo, Vec<Oid>, TempDir) {
    let repo = TestRepo::new();
    let mut c = repo.linear(5);
    repo.set_ref("refs/heads/master", &c[4]);
    let x1 = repo.commit(&[&c[4]], "pending", 10);
    let x2 = repo.commit(&[&x1], "pending 2", 11);
    repo.set_ref("refs/changes/01/1/1", &x2);
    let tag = repo.annotated_tag("v1", &c[2], EPOCH + 500);
    repo.set_ref("refs/tags/v1", &tag);
    c.push(x1);
    c.push(x2);
    (repo, c, TempDir::new().unwrap())
}

#[test]
fn version_flag_works() {
    Command::cargo_bin("revgate")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("revgate"));
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("revgate")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("visible"));
}

mod parse {
    use super::*;

    #[test]
    fn prints_json() {
        let (repo, c, home) = fixture();
        revgate(&repo, &home)
            .args(["parse", "master^..master/src"])
            .assert()
            .success()
            .stdout(predicate::str::contains(c[4].as_str()))
            .stdout(predicate::str::contains(c[3].as_str()))
            .stdout(predicate::str::contains("\"path\": \"/src\""));
    }

    #[test]
    fn rejected_form_is_not_found() {
        let (repo, _, home) = fixture();
        revgate(&repo, &home)
            .args(["parse", "master^{commit}"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn hidden_commit_is_not_found() {
        let (repo, _, home) = fixture();
        revgate(&repo, &home)
            .args(["parse", "refs/changes/01/1/1~1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn repo_config_changes_exclusions() {
        let (repo, _, home) = fixture();
        let config_dir = repo.path().join(".git/revgate");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[visibility]\nexcluded_namespaces = []\n",
        )
        .unwrap();

        revgate(&repo, &home)
            .args(["parse", "refs/changes/01/1/1~1"])
            .assert()
            .success();
    }

    #[test]
    fn invalid_config_is_an_error() {
        let (repo, _, home) = fixture();
        let config_dir = repo.path().join(".git/revgate");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[log]\npage_size = 0\n").unwrap();

        revgate(&repo, &home)
            .args(["parse", "master"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config"));
    }
}

mod log {
    use super::*;

    #[test]
    fn prints_page_with_next_marker() {
        let (repo, c, home) = fixture();
        revgate(&repo, &home)
            .args(["log", "master", "-n", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Test User c4\n"))
            .stdout(predicate::str::contains("Test User c3\n"))
            .stdout(predicate::str::contains("Test User c2\n").not())
            .stdout(predicate::str::contains(format!("next: {}", c[2])));
    }

    #[test]
    fn resumes_at_start() {
        let (repo, c, home) = fixture();
        revgate(&repo, &home)
            .args(["log", "master", "-n", "2", "--start", c[2].as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("previous: {}", c[4])))
            .stdout(predicate::str::contains(format!("next: {}", c[0])));
    }

    #[test]
    fn json_output() {
        let (repo, c, home) = fixture();
        let output = revgate(&repo, &home)
            .args(["log", "master~3", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(page["items"].as_array().unwrap().len(), 2);
        assert_eq!(page["items"][0]["oid"], c[1].as_str());
        assert!(page["next_start"].is_null());
    }

    #[test]
    fn configured_page_size() {
        let (repo, _, home) = fixture();
        let config = home.path().join("revgate/config.toml");
        std::fs::create_dir_all(config.parent().unwrap()).unwrap();
        std::fs::write(&config, "[log]\npage_size = 1\n").unwrap();

        let output = revgate(&repo, &home)
            .args(["log", "master", "--json"])
            .output()
            .unwrap();
        let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(page["items"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn unknown_revision_fails() {
        let (repo, _, home) = fixture();
        revgate(&repo, &home)
            .args(["log", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }
}

#[test]
fn tags_newest_first() {
    let (repo, c, home) = fixture();
    repo.set_ref("refs/tags/light", &c[0]);

    let output = revgate(&repo, &home).arg("tags").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v1 = stdout.find("v1").unwrap();
    let light = stdout.find("light").unwrap();
    assert!(v1 < light);
}

mod visible {
    use super::*;

    #[test]
    fn ancestor_of_branch() {
        let (repo, c, home) = fixture();
        revgate(&repo, &home)
            .args(["visible", c[0].short(8)])
            .assert()
            .success()
            .stdout(predicate::str::diff("visible\n"));
    }

    #[test]
    fn pending_change_tip_only() {
        let (repo, c, home) = fixture();
        let (x1, x2) = (&c[5], &c[6]);

        revgate(&repo, &home)
            .args(["visible", x2.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::diff("visible\n"));

        revgate(&repo, &home)
            .args(["visible", x1.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::diff("not visible\n"));
    }

    #[test]
    fn unknown_hash() {
        let (repo, _, home) = fixture();
        revgate(&repo, &home)
            .args(["visible", "0123456789abcdef0123456789abcdef01234567"])
            .assert()
            .success()
            .stdout(predicate::str::diff("not visible\n"));
    }
}
