//! Reads and runs [html5lib tree construction tests](https://github.com/html5lib/html5lib-tests/tree/master/tree-construction)
//!
//! A `.dat` file contains a list of tests, each one made up of sections:
//! ```text
//! #data
//! <p>One<p>Two
//! #errors
//! (1,3): expected-doctype-but-got-start-tag
//! #document
//! | <html>
//! |   <head>
//! |   <body>
//! |     <p>
//! |       "One"
//! |     <p>
//! |       "Two"
//! ```

use html::{serialize, treebuilding::Parser, Diagnostic, ParserOptions, Tokenizer};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestCase {
    pub data: String,
    pub errors: Vec<String>,

    /// The context element for fragment tests
    pub fragment_context: Option<String>,

    /// `Some(true)` for `#script-on`, `Some(false)` for `#script-off`
    pub scripting: Option<bool>,
    pub document: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,

    /// The tree did not match
    Failed { expected: String, actual: String },

    /// The tree matched, but the reported error codes did not
    WrongErrors {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    Skipped(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Data,
    Errors,
    Ignored,
    Fragment,
    Document,
}

/// Splits the contents of a `.dat` file into test cases
#[must_use]
pub fn parse_test_file(source: &str) -> Vec<TestCase> {
    let mut tests = vec![];
    let mut current: Option<TestCase> = None;
    let mut section = Section::Ignored;

    for line in source.lines() {
        let next_section = match line {
            "#data" => Some(Section::Data),
            "#errors" => Some(Section::Errors),
            "#new-errors" => Some(Section::Ignored),
            "#document-fragment" => Some(Section::Fragment),
            "#document" => Some(Section::Document),
            "#script-on" | "#script-off" => {
                if let Some(test) = &mut current {
                    test.scripting = Some(line == "#script-on");
                }
                section = Section::Ignored;
                continue;
            },
            _ => None,
        };

        if let Some(next_section) = next_section {
            if next_section == Section::Data {
                if let Some(test) = current.take() {
                    tests.push(finish(test));
                }
                current = Some(TestCase::default());
            }
            section = next_section;
            continue;
        }

        let Some(test) = &mut current else {
            continue;
        };

        match section {
            Section::Data => push_line(&mut test.data, line),
            Section::Errors => test.errors.push(line.to_string()),
            Section::Fragment => test.fragment_context = Some(line.trim().to_string()),
            Section::Document => push_line(&mut test.document, line),
            Section::Ignored => {},
        }
    }

    if let Some(test) = current {
        tests.push(finish(test));
    }
    tests
}

fn push_line(buffer: &mut String, line: &str) {
    buffer.push_str(line);
    buffer.push('\n');
}

fn finish(mut test: TestCase) -> TestCase {
    // Every section ends with a newline, the document is followed by an empty line too
    if test.data.ends_with('\n') {
        test.data.pop();
    }
    while test.document.ends_with('\n') {
        test.document.pop();
    }
    test.errors.retain(|error| !error.is_empty());
    test
}

/// Parses the test input and compares the resulting tree and the reported errors with the expected ones
///
/// Errors are compared by their code, in the order they were reported.
/// Positions are not compared, they depend on how far the tokenizer has read ahead.
#[must_use]
pub fn run_test(test: &TestCase) -> Outcome {
    if test.scripting == Some(false) {
        return Outcome::Skipped("scripting is always enabled");
    }

    let options = ParserOptions::default();
    let tokenizer = Tokenizer::new(&test.data);
    let (actual, diagnostics) = match &test.fragment_context {
        Some(context) if context.contains(' ') => {
            return Outcome::Skipped("foreign context elements are not supported");
        },
        Some(context) => {
            let mut parser = Parser::new_fragment(tokenizer, context, options);
            if let Err(error) = parser.run() {
                return failure(test, format!("{error}"));
            }
            let diagnostics = parser.diagnostics().to_vec();
            (serialize::to_test_format(&parser.finish_fragment()), diagnostics)
        },
        None => {
            let mut parser = Parser::new(tokenizer, options);
            if let Err(error) = parser.run() {
                return failure(test, format!("{error}"));
            }
            let (document, diagnostics) = parser.finish_with_diagnostics();
            (serialize::to_test_format(&document), diagnostics)
        },
    };

    if actual != test.document {
        return failure(test, actual);
    }

    let expected_codes: Vec<&str> = test.errors.iter().map(|line| error_code(line)).collect();
    let actual_codes: Vec<&str> = diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code.code())
        .collect();
    if expected_codes != actual_codes {
        return Outcome::WrongErrors {
            expected: test.errors.clone(),
            actual: diagnostics.iter().map(format_diagnostic).collect(),
        };
    }

    Outcome::Passed
}

/// Extracts the code from an `#errors` line like `(1,3): expected-doctype-but-got-start-tag`
fn error_code(line: &str) -> &str {
    line.rsplit_once(' ').map_or(line, |(_, code)| code).trim()
}

fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    format!(
        "({},{}): {}",
        diagnostic.position.line,
        diagnostic.position.column,
        diagnostic.code.code()
    )
}

fn failure(test: &TestCase, actual: String) -> Outcome {
    Outcome::Failed {
        expected: test.document.clone(),
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TESTS: &str = "#data
Test
#errors
(1,0): expected-doctype-but-got-chars
#document
| <html>
|   <head>
|   <body>
|     \"Test\"

#data
<td>x
#errors
#document-fragment
tr
#document
| <td>
|   \"x\"
";

    #[test]
    fn read_test_file() {
        let tests = parse_test_file(TWO_TESTS);
        assert_eq!(tests.len(), 2);

        assert_eq!(tests[0].data, "Test");
        assert_eq!(tests[0].errors, ["(1,0): expected-doctype-but-got-chars"]);
        assert_eq!(tests[0].fragment_context, None);
        assert_eq!(
            tests[0].document,
            "| <html>\n|   <head>\n|   <body>\n|     \"Test\""
        );

        assert_eq!(tests[1].fragment_context.as_deref(), Some("tr"));
        assert!(tests[1].errors.is_empty());
    }

    #[test]
    fn run_simple_tests() {
        for test in parse_test_file(TWO_TESTS) {
            assert_eq!(run_test(&test), Outcome::Passed);
        }
    }

    #[test]
    fn error_codes_are_compared() {
        let mut tests = parse_test_file(TWO_TESTS);
        tests[0].errors = vec!["(1,0): unexpected-doctype".to_string()];

        let Outcome::WrongErrors { expected, actual } = run_test(&tests[0]) else {
            panic!("mismatching errors were not detected");
        };
        assert_eq!(expected, ["(1,0): unexpected-doctype"]);
        assert_eq!(actual.len(), 1);
        assert!(actual[0].ends_with(": expected-doctype-but-got-chars"));
    }

    #[test]
    fn error_line_formats() {
        assert_eq!(error_code("(1,3): unexpected-end-tag"), "unexpected-end-tag");
        assert_eq!(error_code("1:3: eof-in-table"), "eof-in-table");
        assert_eq!(error_code("eof-in-table"), "eof-in-table");
    }

    #[test]
    fn script_off_is_skipped() {
        let test = TestCase {
            scripting: Some(false),
            ..Default::default()
        };
        assert!(matches!(run_test(&test), Outcome::Skipped(_)));
    }
}
