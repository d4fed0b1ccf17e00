use std::process::{Command, Output};

fn run_critic(vars: &[(&str, &str)]) -> Output {
    // Empty working directory so no .env file is picked up.
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_critic"))
        .env_clear()
        .env("RUST_LOG", "info")
        .envs(vars.iter().copied())
        .current_dir(dir.path())
        .output()
        .unwrap()
}

#[test]
fn exits_zero_without_repository() {
    let output = run_critic(&[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GITHUB_REPOSITORY missing"), "stdout: {stdout}");
    assert!(stdout.contains("No repository info"), "stdout: {stdout}");
}

#[test]
fn exits_zero_with_malformed_repository() {
    let output = run_critic(&[("GITHUB_REPOSITORY", "not-a-pair")]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("GITHUB_REPOSITORY is malformed: not-a-pair"),
        "stdout: {stdout}"
    );
}
