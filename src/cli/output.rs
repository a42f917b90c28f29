//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use crate::application::services::{RenderedLine, StyleHint};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Writes rendered tree lines, styled or plain.
///
/// The tree is framed by a blank line before and after.
#[derive(Debug, Clone, Copy)]
pub struct TreePrinter {
    styled: bool,
}

impl TreePrinter {
    pub fn new(styled: bool) -> Self {
        Self { styled }
    }

    pub fn write_tree<W: Write>(&self, out: &mut W, lines: &[RenderedLine]) -> io::Result<()> {
        writeln!(out)?;
        for line in lines {
            if self.styled {
                writeln!(out, "{}{}", line.indent.bright_black(), paint(line))?;
            } else {
                writeln!(out, "{}", line)?;
            }
        }
        writeln!(out)?;
        out.flush()
    }
}

fn paint(line: &RenderedLine) -> ColoredString {
    let text = line.text.as_str();
    match line.style {
        StyleHint::Root => text.cyan().bold(),
        StyleHint::Group => text.cyan(),
        StyleHint::CircularGroup => text.red().bold(),
        StyleHint::Computer => text.bright_black(),
        StyleHint::Plain => text.normal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;

    fn line(indent: &str, text: &str, style: StyleHint) -> RenderedLine {
        RenderedLine {
            node: NodeId(0),
            depth: indent.chars().count() / 4,
            indent: indent.to_string(),
            text: text.to_string(),
            style,
        }
    }

    #[test]
    fn given_plain_printer_when_writing_then_framed_by_blank_lines_without_escapes() {
        let lines = vec![
            line("", "EXAMPLE/ADMINS", StyleHint::Root),
            line("└── ", "jdoe - John Doe", StyleHint::Plain),
        ];
        let mut out = Vec::new();

        TreePrinter::new(false).write_tree(&mut out, &lines).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\nEXAMPLE/ADMINS\n└── jdoe - John Doe\n\n");
        assert!(!text.contains('\u{1b}'));
    }
}
