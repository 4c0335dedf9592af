use std::{fs, path::Path};

use html5lib_testrunner::{parse_test_file, run_test, Outcome};

fn run_fixture(name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    let source = fs::read_to_string(&path).expect("fixture file exists");

    let tests = parse_test_file(&source);
    assert!(!tests.is_empty(), "{name} contains no tests");

    for test in &tests {
        match run_test(test) {
            Outcome::Failed { expected, actual } => panic!(
                "{name}: {:?}\nexpected:\n{expected}\nactual:\n{actual}",
                test.data
            ),
            Outcome::WrongErrors { expected, actual } => panic!(
                "{name}: {:?}\nexpected errors:\n{}\nactual errors:\n{}",
                test.data,
                expected.join("\n"),
                actual.join("\n")
            ),
            Outcome::Passed | Outcome::Skipped(_) => {},
        }
    }
}

#[test]
fn basic() {
    run_fixture("basic.dat");
}

#[test]
fn adoption_agency() {
    run_fixture("adoption.dat");
}

#[test]
fn tables() {
    run_fixture("tables.dat");
}

#[test]
fn foreign_content() {
    run_fixture("foreign.dat");
}

#[test]
fn fragments() {
    run_fixture("fragments.dat");
}

#[test]
fn frameset() {
    run_fixture("frameset.dat");
}

#[test]
fn select_in_table() {
    run_fixture("select.dat");
}
