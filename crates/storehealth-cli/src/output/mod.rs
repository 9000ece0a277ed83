//! Output formatters

pub mod csv;
pub mod json;
pub mod terminal;

use std::io::IsTerminal;
use termcolor::{ColorChoice, StandardStream};

/// Stdout with color only when attached to a terminal
pub fn stdout() -> StandardStream {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}
