use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn script_command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("finsmart_cli").expect("binary builds");
    cmd.env("FINSMART_CLI_SCRIPT", "1")
        .env("FINSMART_HOME", home.path())
        .env_remove("FINSMART_API_KEY");
    cmd
}

#[test]
fn scripted_session_covers_the_main_flow() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin(
            [
                "income 10000000",
                "add income 2000000 \"Lương tháng\" --account acc2 --class E",
                "add expense 500000 \"Ăn uống\" --account acc2 --category 4",
                "accounts",
                "summary",
                "history",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("1.500.000 ₫"))
        .stdout(predicate::str::contains("6.750.000 ₫"))
        .stdout(predicate::str::contains("Lương tháng"))
        .stdout(predicate::str::contains("Làm thuê (E)"));
}

#[test]
fn state_survives_between_invocations() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin("add income 750000 Thưởng --account acc1\nexit\n")
        .assert()
        .success();

    script_command(&home)
        .write_stdin("accounts\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("750.000 ₫"));
}

#[test]
fn budget_editor_stages_and_rejects_bad_sums() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin(
            [
                "budget set 1 25",
                "budget save",
                "budget discard",
                "budget",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        // 25 + 2.5 + 10 + 67.5 = 105, so the commit must be refused...
        .stderr(predicate::str::contains("must total 100%"))
        // ...and after the discard the seeded split is still in place.
        .stdout(predicate::str::contains("Total allocation: 100%"));
}

#[test]
fn budget_save_commits_a_valid_split() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin(
            [
                "budget set 1 25",
                "budget set 4 62.5",
                "budget save",
                "exit",
            ]
            .join("\n"),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Envelope percentages saved."));

    script_command(&home)
        .write_stdin("budget\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("25%"))
        .stdout(predicate::str::contains("62.5%"));
}

#[test]
fn missing_flags_in_script_mode_fail_the_command_but_not_the_session() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin("add expense 1000 coffee\nexit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("--account"));
}

#[test]
fn unknown_commands_suggest_a_neighbour() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin("sumary\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggestion: `summary`?"));
}

#[test]
fn advice_without_a_key_prints_the_fallback() {
    let home = TempDir::new().unwrap();
    script_command(&home)
        .write_stdin("advice\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Không thể kết nối với chuyên gia AI lúc này",
        ));
}
