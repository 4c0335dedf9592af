//! Command line settings shared by the parser tools

mod cli;

use std::path::PathBuf;

use clap::Parser;
use html::ParserOptions;

/// What a tool prints once the input has been parsed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// The html5lib test format
    #[default]
    Tree,

    /// The tree serialized as markup
    Html,

    /// One line per parse error
    Errors,

    /// One line per processed token
    Trace,
}

/// Holds all the configurable information for a single parser invocation
#[derive(Debug)]
pub struct Settings {
    /// File to parse, `None` means standard input
    pub input: Option<PathBuf>,

    /// Name of the context element when parsing a fragment
    pub fragment: Option<String>,
    pub strict: bool,
    pub namespace_html_elements: bool,
    pub debug: bool,

    /// Overrides the detected character encoding
    pub encoding: Option<String>,
    pub output: OutputFormat,
}

impl Settings {
    /// Builds the settings from the arguments of the current process
    #[must_use]
    pub fn init() -> Self {
        Self::from_arguments(cli::Arguments::parse())
    }

    /// Builds the settings from an explicit argument list, the first item being the program name
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        cli::Arguments::try_parse_from(args).map(Self::from_arguments)
    }

    fn from_arguments(arguments: cli::Arguments) -> Self {
        let mut settings = Self::default();
        arguments.update_settings(&mut settings);
        settings
    }

    #[must_use]
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            strict: self.strict,
            namespace_html_elements: self.namespace_html_elements,
            debug: self.debug,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let options = ParserOptions::default();
        Self {
            input: None,
            fragment: None,
            strict: options.strict,
            namespace_html_elements: options.namespace_html_elements,
            debug: options.debug,
            encoding: None,
            output: OutputFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::try_from_args(["parsehtml"]).unwrap();
        assert!(settings.input.is_none());
        assert_eq!(settings.output, OutputFormat::Tree);
        assert_eq!(settings.parser_options(), ParserOptions::default());
    }

    #[test]
    fn flags() {
        let settings = Settings::try_from_args([
            "parsehtml",
            "page.html",
            "--strict",
            "--no-namespace",
            "--fragment",
            "td",
            "--output",
            "trace",
        ])
        .unwrap();

        assert_eq!(settings.input, Some(PathBuf::from("page.html")));
        assert_eq!(settings.fragment.as_deref(), Some("td"));

        let options = settings.parser_options();
        assert!(options.strict);
        assert!(!options.namespace_html_elements);

        // Printing the trace implies recording it
        assert!(options.debug);
    }

    #[test]
    fn unknown_output_format() {
        assert!(Settings::try_from_args(["parsehtml", "--output", "json"]).is_err());
    }
}
