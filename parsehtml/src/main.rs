use std::{
    fs,
    io::{self, Read},
    process::ExitCode,
};

use error_derive::Error;
use html::{
    serialize,
    treebuilding::{Handler, Parser, TraceEntry},
    Diagnostic, Document, InputStream, ParseFailure, Tokenizer,
};
use settings::{OutputFormat, Settings};

#[derive(Debug, Error)]
enum Error {
    #[msg = "failed to read the input"]
    Io(io::Error),

    #[msg = "failed to parse the input"]
    Parse(ParseFailure),
}

/// Everything a single parse produced
struct Output {
    document: Document,
    diagnostics: Vec<Diagnostic>,
    trace: Vec<TraceEntry>,
}

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::init();

    match run(&settings) {
        Ok(output) => {
            print_output(&settings, &output);
            ExitCode::SUCCESS
        },
        Err(error) => {
            match &error {
                Error::Io(io_error) => log::error!("{error}: {io_error}"),
                Error::Parse(ParseFailure::Strict(diagnostic)) => {
                    log::error!("{error}: {diagnostic}")
                },
                Error::Parse(failure) => log::error!("{error}: {failure}"),
            }
            ExitCode::FAILURE
        },
    }
}

fn read_input(settings: &Settings) -> Result<Vec<u8>, io::Error> {
    match &settings.input {
        Some(path) => fs::read(path),
        None => {
            let mut bytes = vec![];
            io::stdin().read_to_end(&mut bytes)?;
            Ok(bytes)
        },
    }
}

fn run(settings: &Settings) -> Result<Output, Error> {
    let bytes = read_input(settings)?;
    let input = InputStream::from_bytes(bytes, settings.encoding.as_deref());
    log::debug!(
        "Decoding the input as {:?} ({:?})",
        input.encoding(),
        input.confidence()
    );

    let tokenizer = Tokenizer::from_input_stream(input);
    let options = settings.parser_options();

    let output = match &settings.fragment {
        Some(context) => {
            let mut parser = Parser::new_fragment(tokenizer, context, options);
            parser.run()?;
            let trace = parser.trace().to_vec();
            let diagnostics = parser.diagnostics().to_vec();
            Output {
                document: parser.finish_fragment().into_document(),
                diagnostics,
                trace,
            }
        },
        None => {
            let mut parser = Parser::new(tokenizer, options);
            parser.run()?;
            let trace = parser.trace().to_vec();
            let (document, diagnostics) = parser.finish_with_diagnostics();
            Output {
                document,
                diagnostics,
                trace,
            }
        },
    };

    Ok(output)
}

fn print_output(settings: &Settings, output: &Output) {
    match settings.output {
        OutputFormat::Tree => println!("{}", serialize::to_test_format(&output.document)),
        OutputFormat::Html => println!(
            "{}",
            serialize::to_html(&output.document, output.document.root())
        ),
        OutputFormat::Errors => {
            for diagnostic in &output.diagnostics {
                println!("{diagnostic}");
            }
        },
        OutputFormat::Trace => {
            for entry in &output.trace {
                let handler = match entry.handler {
                    Handler::Mode(mode) => format!("{mode:?}"),
                    Handler::ForeignContent => "ForeignContent".to_string(),
                };
                println!(
                    "{:?} {:?} {handler} {} {}",
                    entry.tokenizer_state,
                    entry.phase,
                    entry.token_kind,
                    entry.token_name.as_deref().unwrap_or("-")
                );
            }
        },
    }
}
