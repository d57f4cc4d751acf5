//! Line-based console abstraction for interactive input nodes.
//!
//! [`InputNode`](crate::nodes::InputNode) talks to a `Console` instead of
//! stdin directly, so workflows with human input remain testable:
//! [`StdConsole`] for a real terminal, [`ScriptedConsole`] for tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// One-line prompt/read interface to a human operator.
pub trait Console: Send + Sync {
    /// Shows a prompt line to the operator.
    fn prompt(&self, text: &str) -> io::Result<()>;

    /// Reads one line of input, without the trailing newline.
    fn read_line(&self) -> io::Result<String>;
}

/// Console backed by stdout/stdin.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")?;
        write!(out, "> ")?;
        out.flush()
    }

    fn read_line(&self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Console fed from a fixed list of lines; records every prompt shown.
///
/// Reading past the scripted lines fails with `UnexpectedEof`, which makes a
/// test that prompts more often than expected fail loudly.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    lines: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    /// Creates a console that will return the given lines in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log lock").clone()
    }
}

impl Console for ScriptedConsole {
    fn prompt(&self, text: &str) -> io::Result<()> {
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(text.to_string());
        Ok(())
    }

    fn read_line(&self) -> io::Result<String> {
        self.lines
            .lock()
            .expect("line queue lock")
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted lines come back in order and reading past the
    /// end fails with UnexpectedEof.
    #[test]
    fn scripted_console_returns_lines_then_eof() {
        let console = ScriptedConsole::new(["first", "second"]);
        assert_eq!(console.read_line().unwrap(), "first");
        assert_eq!(console.read_line().unwrap(), "second");
        let err = console.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    /// **Scenario**: Prompts are recorded for assertions.
    #[test]
    fn scripted_console_records_prompts() {
        let console = ScriptedConsole::new(["x"]);
        console.prompt("What next?").unwrap();
        assert_eq!(console.prompts(), vec!["What next?".to_string()]);
    }
}
