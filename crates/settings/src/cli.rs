use std::path::PathBuf;

use crate::{OutputFormat, Settings};

#[derive(clap::Parser, Debug)]
#[command(name = "parsehtml", version, about = "Parses HTML the way a browser does", long_about = None)]
pub struct Arguments {
    /// File to parse, standard input is used if omitted
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Parse the input as the contents of an element with this name
    #[arg(long, value_name = "CONTEXT")]
    fragment: Option<String>,

    /// Abort on the first parse error
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    strict: bool,

    /// Do not place HTML elements in the XHTML namespace
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    no_namespace: bool,

    /// Record which insertion mode processed each token
    #[clap(
        long,
        action = clap::ArgAction::SetTrue,
    )]
    debug: bool,

    /// Decode the input with this encoding, ignoring everything the document declares
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// What to print after parsing
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
}

impl Arguments {
    pub(crate) fn update_settings(self, settings: &mut Settings) {
        settings.strict = self.strict;
        settings.namespace_html_elements = !self.no_namespace;
        settings.input = self.input;
        settings.fragment = self.fragment;
        settings.encoding = self.encoding;

        if let Some(output) = self.output {
            settings.output = output;
        }

        // The trace is useless unless it is recorded
        settings.debug = self.debug || settings.output == OutputFormat::Trace;
    }
}
