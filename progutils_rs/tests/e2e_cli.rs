//! End-to-end tests for the `progutils` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn progutils() -> Command {
    let mut cmd = cargo_bin_cmd!("progutils");
    cmd.env("PROGUTILS_COLOR", "never").env_remove("RUST_LOG");
    cmd
}

fn text_dir() -> TempDir {
    let temp = TempDir::new().expect("temp dir");
    fs::write(temp.path().join("a.txt"), "one\ntwo\n").expect("write a");
    fs::write(temp.path().join("b.txt"), "one\ntwo\nthree\n").expect("write b");
    fs::write(temp.path().join("c.md"), "# skip\n").expect("write c");
    temp
}

// ============================================
// Listing and versions
// ============================================

mod cli_basics {
    use super::*;

    #[test]
    fn no_arguments_lists_programs() {
        progutils()
            .assert()
            .success()
            .stdout(predicate::str::starts_with("Programs\n"))
            .stdout(predicate::str::contains("1) greet"))
            .stdout(predicate::str::contains("fileTools"))
            .stdout(predicate::str::contains("mathTools"))
            .stdout(predicate::str::contains("wc").not());
    }

    #[test]
    fn help_without_program_exits_one() {
        for flag in ["--help", "-h"] {
            progutils()
                .arg(flag)
                .assert()
                .code(1)
                .stdout(predicate::str::starts_with("Programs\n"));
        }
    }

    #[test]
    fn shows_version() {
        progutils()
            .arg("--version")
            .assert()
            .success()
            .stdout(format!("progutils {}\n", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn dumps_bare_version() {
        progutils()
            .arg("--dumpversion")
            .assert()
            .success()
            .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
    }
}

// ============================================
// Dispatch
// ============================================

mod dispatch {
    use super::*;

    #[test]
    fn greets_with_bound_options() {
        progutils()
            .args(["greet", "--name", "Ada", "--times=2"])
            .assert()
            .success()
            .stdout("Hello, Ada!\nHello, Ada!\n");
    }

    #[test]
    fn names_and_flags_ignore_case() {
        progutils()
            .args(["GREET", "-N", "Ada", "--SHOUT"])
            .assert()
            .success()
            .stdout("HELLO, ADA!\n");
    }

    #[test]
    fn space_form_flags_fold_case_in_batch_lines() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["batch", "-ending", ".txt", "-run", "countLines", "--FILE", "THIS"])
            .assert()
            .success()
            .stdout(predicate::str::contains("progutils countLines --file a.txt\n"));
    }

    #[test]
    fn numbers_pick_root_commands() {
        progutils()
            .args(["1", "--name", "Ada"])
            .assert()
            .success()
            .stdout("Hello, Ada!\n");
    }

    #[test]
    fn suggests_closest_command() {
        progutils()
            .arg("gret")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Unrecognized command gret"))
            .stdout(predicate::str::contains("Did you mean         greet?"));
    }

    #[test]
    fn child_group_alias() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["wc", "--file", "b.txt"])
            .assert()
            .success()
            .stdout("b.txt\t3\n");
    }

    #[test]
    fn handler_errors_go_to_stderr() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["countLines", "--file", "missing.txt"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("missing.txt"));
    }

    #[test]
    fn parse_errors_exit_one() {
        progutils()
            .args(["greet", "---name", "Ada"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("more than two leading dashes"));
    }
}

// ============================================
// Option binding
// ============================================

mod binding {
    use super::*;

    #[test]
    fn help_lists_grouped_flags() {
        progutils()
            .args(["greet", "--help"])
            .assert()
            .code(1)
            .stdout(predicate::str::starts_with("progutils greet\n"))
            .stdout(predicate::str::contains("Required Options"))
            .stdout(predicate::str::contains("--name"))
            .stdout(predicate::str::contains("Output"))
            .stdout(predicate::str::contains("Help Options"))
            .stdout(predicate::str::contains("progutils greet --name Ada --times 2 --shout"));
    }

    #[test]
    fn missing_required_option() {
        progutils()
            .args(["greet", "--times", "2"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Need to have --name or -n"));
    }

    #[test]
    fn every_warning_is_printed() {
        progutils()
            .args(["greet", "--times", "0", "--bogus", "x"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Need to have --name"))
            .stdout(predicate::str::contains("--times can't be zero or less: 0"))
            .stdout(predicate::str::contains("Unrecognized option, --bogus not using"));
    }

    #[test]
    fn collections_bind() {
        progutils()
            .args(["sum", "--values", "1,2,39"])
            .assert()
            .success()
            .stdout("42\n");
        progutils()
            .args(["uniq", "-v", "3,1,2"])
            .assert()
            .success()
            .stdout("1,2,3\n");
    }

    #[test]
    fn set_duplicates_fail() {
        progutils()
            .args(["uniq", "--values", "1,2,2"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("--values found 2 more than once"));
    }

    #[test]
    fn collections_read_files() {
        let temp = TempDir::new().expect("temp dir");
        fs::write(temp.path().join("nums.txt"), "5\n\n6\n").expect("write");
        progutils()
            .current_dir(temp.path())
            .args(["sum", "--values", "nums.txt"])
            .assert()
            .success()
            .stdout("11\n");
    }

    #[test]
    fn writes_parameters_file() {
        let temp = TempDir::new().expect("temp dir");
        progutils()
            .current_dir(temp.path())
            .args(["greet", "--name", "Ada", "--parameters", "params.tab.txt"])
            .assert()
            .success();
        let table = fs::read_to_string(temp.path().join("params.tab.txt")).expect("params");
        assert!(table.starts_with("Flags\tShortDescription\tvalue\tdefaultValue\n"));
        assert!(table.contains("--name,-n\tWho to greet\tAda\t"));
    }
}

// ============================================
// Batch
// ============================================

mod batch {
    use super::*;

    fn run_logs(temp: &TempDir) -> Vec<String> {
        fs::read_dir(temp.path())
            .expect("read dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("batchRunLog_"))
            .collect()
    }

    #[test]
    fn runs_once_per_matching_file() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["batch", "-ending", ".txt", "-run", "countLines", "--file", "THIS"])
            .assert()
            .success()
            .stdout(predicate::str::contains("progutils countLines --file a.txt\n"))
            .stdout(predicate::str::contains("a.txt\t2\n"))
            .stdout(predicate::str::contains("b.txt\t3\n"))
            .stdout(predicate::str::contains("c.md").not());

        let logs = run_logs(&temp);
        assert_eq!(logs.len(), 1, "{logs:?}");
        assert!(logs[0].starts_with("batchRunLog_progutils-countLines_"));
        let log = fs::read_to_string(temp.path().join(&logs[0])).expect("log");
        assert!(log.contains("progutils countLines --file b.txt"));
        assert!(log.contains("Total time"));
    }

    #[test]
    fn threaded_runs_every_file() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args([
                "batchThreaded", "-pattern", "[ab]\\.txt", "-run", "countLines", "--file", "THIS",
                "-threads", "2",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("a.txt\t2\n"))
            .stdout(predicate::str::contains("b.txt\t3\n"));

        let logs = run_logs(&temp);
        let log = fs::read_to_string(temp.path().join(&logs[0])).expect("log");
        assert_eq!(log.matches("\tRun Time: ").count(), 2);
    }

    #[test]
    fn failures_in_any_file_fail_the_batch() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["batch", "-ending", ".txt", "-run", "head", "--file", "THIS", "--lines", "0"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("--lines can't be zero"));
    }

    #[test]
    fn needs_run_flag() {
        let temp = text_dir();
        progutils()
            .current_dir(temp.path())
            .args(["batch", "-ending", ".txt"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Need to have -run"));
        assert!(run_logs(&temp).is_empty());
    }

    #[test]
    fn get_flags_shows_both_programs() {
        progutils()
            .args(["batch", "--getFlags", "-run", "countLines"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Batch Commands"))
            .stdout(predicate::str::contains("-ending"))
            .stdout(predicate::str::contains("countLines Commands"))
            .stdout(predicate::str::contains("--file"));
    }
}
