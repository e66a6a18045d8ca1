//! End-to-end tests against a real git executable
//!
//! Each test builds a bare "origin" and a clone-like working directory in a
//! temp dir. Tests are skipped when git is not installed.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gitmon::git::{GitCli, Vcs};
use gitmon::lock::{FileLock, LOCK_FILE_NAME};
use gitmon::orchestrator::Orchestrator;
use gitmon::shutdown::ShutdownSignal;
use serial_test::serial;
use tempfile::TempDir;

const FAST: Duration = Duration::from_millis(100);

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Bare origin plus a working directory on `main` with one pushed commit
fn setup_repo(root: &Path) -> (PathBuf, PathBuf) {
    let origin = root.join("origin.git");
    let work = root.join("work");
    std::fs::create_dir_all(&origin).unwrap();
    std::fs::create_dir_all(&work).unwrap();

    git(&origin, &["init", "--bare"]);
    git(&work, &["init"]);
    git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&work, &["config", "user.email", "gitmon@example.com"]);
    git(&work, &["config", "user.name", "gitmon"]);
    git(&work, &["config", "commit.gpgsign", "false"]);

    std::fs::write(work.join("notes.txt"), "first\n").unwrap();
    git(&work, &["add", "notes.txt"]);
    git(&work, &["commit", "-m", "initial"]);
    git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
    git(&work, &["push", "origin", "main"]);

    (origin, work)
}

fn origin_subjects(origin: &Path) -> Vec<String> {
    git(origin, &["log", "main", "--format=%s"])
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_git_cli_probes() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (_origin, work) = setup_repo(temp_dir.path());
    let vcs = GitCli::default();

    assert!(vcs.status(&work).await.is_ok());
    assert!(vcs.status_porcelain(&work).await.unwrap().is_empty());

    std::fs::write(work.join("notes.txt"), "second\n").unwrap();
    assert!(!vcs.status_porcelain(&work).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pending_change_is_committed_and_pushed() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (origin, work) = setup_repo(temp_dir.path());
    std::fs::write(work.join("notes.txt"), "second\n").unwrap();

    let lock = FileLock::new(temp_dir.path(), LOCK_FILE_NAME);
    let orchestrator = Orchestrator::new(lock, Arc::new(GitCli::default()))
        .with_poll_interval(FAST)
        .without_os_signals();
    let dispatcher = orchestrator.dispatcher();
    let shutdown = ShutdownSignal::new();
    let run = tokio::spawn(orchestrator.run(vec![work.clone()], shutdown.clone()));

    let deadline = Instant::now() + Duration::from_secs(20);
    while origin_subjects(&origin).len() < 2 && Instant::now() < deadline {
        tokio::time::sleep(FAST).await;
    }
    shutdown.fire();
    let summary = run.await.unwrap().unwrap();
    dispatcher.drain().await;

    assert_eq!(summary.supervisors, 1);
    let subjects = origin_subjects(&origin);
    assert_eq!(subjects.len(), 2, "expected one auto commit on origin/main: {:?}", subjects);
    assert!(subjects[0].starts_with("Auto Commit "));
    assert!(git(&work, &["status", "--porcelain"]).is_empty());
    assert!(!temp_dir.path().join(LOCK_FILE_NAME).exists());
}

#[tokio::test]
async fn test_plain_directory_is_not_monitored() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (_origin, work) = setup_repo(temp_dir.path());
    let notgit = temp_dir.path().join("notgit");
    std::fs::create_dir(&notgit).unwrap();

    // Skip when the temp dir itself sits inside a git work tree
    let inside_repo = Command::new("git")
        .arg("-C")
        .arg(&notgit)
        .arg("status")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(true);
    if inside_repo {
        eprintln!("temp dir is inside a git repository, skipping");
        return;
    }

    let lock = FileLock::new(temp_dir.path(), LOCK_FILE_NAME);
    let orchestrator = Orchestrator::new(lock, Arc::new(GitCli::default()))
        .with_poll_interval(FAST)
        .without_os_signals();
    let shutdown = ShutdownSignal::new();
    shutdown.fire();

    let summary = orchestrator.run(vec![notgit, work], shutdown).await.unwrap();
    assert_eq!(summary.supervisors, 1);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
#[serial]
async fn test_relative_paths_resolve_against_current_dir() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let (_origin, _work) = setup_repo(temp_dir.path());

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let lock = FileLock::new(temp_dir.path(), LOCK_FILE_NAME);
    let orchestrator = Orchestrator::new(lock, Arc::new(GitCli::default()))
        .with_poll_interval(FAST)
        .without_os_signals();
    let shutdown = ShutdownSignal::new();
    shutdown.fire();
    let result = orchestrator.run(vec![PathBuf::from("work")], shutdown).await;

    std::env::set_current_dir(previous).unwrap();
    assert_eq!(result.unwrap().supervisors, 1);
}
