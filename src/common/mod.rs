//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_read_maybe_gz, open_write_maybe_gz, MaybeGzWriter};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// The version of `onco-csq-worker` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Return the version of the `onco-csq-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        VERSION
    }
}

/// Interpret a cell of a reference table as a boolean flag.
///
/// Tables produced by R/pandas pipelines spell truth in several ways.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim(),
        "1" | "TRUE" | "True" | "true" | "T" | "yes" | "Y"
    )
}

/// Return `None` for the empty string and the `.` placeholder.
pub fn non_missing(value: &str) -> Option<&str> {
    match value {
        "" | "." => None,
        _ => Some(value),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    #[test]
    fn worker_version_in_tests() {
        assert_eq!(super::worker_version(), "x.y.z");
    }

    #[rstest::rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case("True", true)]
    #[case(" true ", true)]
    #[case("0", false)]
    #[case("FALSE", false)]
    #[case("", false)]
    #[case(".", false)]
    fn is_truthy(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(super::is_truthy(value), expected);
    }

    #[rstest::rstest]
    #[case("", None)]
    #[case(".", None)]
    #[case("ENST0001", Some("ENST0001"))]
    fn non_missing(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_eq!(super::non_missing(value), expected);
    }
}
