//! A runner for [html5lib tree construction tests](https://github.com/html5lib/html5lib-tests)

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use error_derive::Error;
use html5lib_testrunner::{parse_test_file, run_test, Outcome};

#[derive(clap::Parser, Debug)]
#[command(name = "html5lib-testrunner", version, about = "Runs html5lib tree construction tests", long_about = None)]
struct Arguments {
    /// The `.dat` files to run
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Print the trees of failing tests
    #[clap(
        short,
        long,
        action = clap::ArgAction::SetTrue,
    )]
    verbose: bool,
}

#[derive(Debug, Error)]
enum Error {
    #[msg = "failed to read test file"]
    Io(io::Error),
}

#[derive(Debug, Default)]
struct Summary {
    passed: usize,
    failed: usize,
    skipped: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments = Arguments::parse();
    let mut summary = Summary::default();

    for path in &arguments.files {
        if let Err(error) = run_file(path, arguments.verbose, &mut summary) {
            log::error!("{}: {error}", path.display());
            return ExitCode::FAILURE;
        }
    }

    println!(
        "{} passed, {} failed, {} skipped",
        summary.passed, summary.failed, summary.skipped
    );

    if summary.failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_file(path: &Path, verbose: bool, summary: &mut Summary) -> Result<(), Error> {
    let source = fs::read_to_string(path)?;

    for (index, test) in parse_test_file(&source).iter().enumerate() {
        match run_test(test) {
            Outcome::Passed => summary.passed += 1,
            Outcome::Skipped(reason) => {
                log::debug!("{}#{index}: skipped ({reason})", path.display());
                summary.skipped += 1;
            },
            Outcome::Failed { expected, actual } => {
                log::warn!("{}#{index}: failed for {:?}", path.display(), test.data);
                if verbose {
                    println!("Expected:\n{expected}\nActual:\n{actual}\n");
                }
                summary.failed += 1;
            },
            Outcome::WrongErrors { expected, actual } => {
                log::warn!(
                    "{}#{index}: wrong errors for {:?}",
                    path.display(),
                    test.data
                );
                if verbose {
                    println!(
                        "Expected errors:\n{}\nActual errors:\n{}\n",
                        expected.join("\n"),
                        actual.join("\n")
                    );
                }
                summary.failed += 1;
            },
        }
    }
    Ok(())
}
