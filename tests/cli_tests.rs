//! CLI-level tests driving the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const MEMORY_CONFIG: &str = r#"
[gateway]
mode = "memory"

[accounts]
issuer = "GISSUER"
buyer = "GBUYER"
seller = "GSELLER"

[asset]
code = "USD"
funding_amount = "25"

[offers.buy]
price = "0.0023"
amount = "5000"

[offers.sell]
price = "0.0025"
amount = "4000"

[logging]
level = "info"
format = "pretty"
"#;

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn bookmaker() -> Command {
    Command::cargo_bin("bookmaker").expect("binary builds")
}

#[test]
fn check_config_accepts_the_sample() {
    let config = config_file(MEMORY_CONFIG);

    bookmaker()
        .args(["--config", config.path().to_str().unwrap(), "check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GISSUER"));
}

#[test]
fn check_config_rejects_duplicate_accounts() {
    let config = config_file(&MEMORY_CONFIG.replace("GBUYER", "GISSUER"));

    bookmaker()
        .args(["--config", config.path().to_str().unwrap(), "check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must differ"));
}

#[test]
fn missing_config_file_exits_nonzero() {
    bookmaker()
        .args(["--config", "/nonexistent/bookmaker.toml", "check", "config"])
        .assert()
        .failure();
}

#[test]
fn run_in_memory_mode_prints_the_seeded_book() {
    let config = config_file(MEMORY_CONFIG);

    bookmaker()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "run",
            "--no-jitter",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("GBUYER"))
        .stdout(predicate::str::contains("0.0023"))
        .stdout(predicate::str::contains("0.0025"));
}

#[test]
fn run_in_horizon_mode_requires_a_sealer() {
    let horizon = MEMORY_CONFIG.replace(
        "mode = \"memory\"",
        "mode = \"horizon\"\nhorizon_url = \"https://ledger.example.org\"",
    );
    let config = config_file(&horizon);

    bookmaker()
        .args(["--config", config.path().to_str().unwrap(), "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("transaction sealer"));
}

#[test]
fn check_connection_is_trivial_in_memory_mode() {
    let config = config_file(MEMORY_CONFIG);

    bookmaker()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "check",
            "connection",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("in-process"));
}
