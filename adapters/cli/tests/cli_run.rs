use std::process::Command;

fn cli() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_card-defence"));
    let _ = command.env("RUST_LOG", "warn");
    command
}

#[test]
fn headless_run_clears_the_first_wave() {
    let output = cli()
        .args([
            "--seed",
            "5",
            "--waves",
            "1",
            "--tower",
            "3,2=fire:1",
            "--tower",
            "8,2=ice:1",
        ])
        .output()
        .expect("failed to invoke card-defence binary");

    assert!(output.status.success(), "card-defence should exit cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Card Defence run summary"), "{stdout}");
    assert!(stdout.contains("waves cleared: 1"), "{stdout}");
    assert!(stdout.contains("tower 0 at 3,2"), "{stdout}");
    assert!(stdout.contains("tower 1 at 8,2"), "{stdout}");
}

#[test]
fn towers_on_the_path_abort_the_run() {
    let output = cli()
        .args(["--tower", "0,1"])
        .output()
        .expect("failed to invoke card-defence binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to place tower at 0,1"), "{stderr}");
}

#[test]
fn missing_balance_files_are_reported() {
    let output = cli()
        .args(["--config", "does/not/exist.toml"])
        .output()
        .expect("failed to invoke card-defence binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read balance file"), "{stderr}");
}
