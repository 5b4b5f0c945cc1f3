//! Input and output collaborators.
//!
//! The engine never touches streams directly. READ asks an [`Input`] for a
//! typed value; WRITE, DPRINT and BREAK hand text to an [`Output`].

use ippvm_common::operand::parse_int;
use ippvm_common::{TypeTag, Value};
use std::io::{self, BufRead, Write};

/// Source of values for READ.
pub trait Input {
    /// Read one value of the requested type. `None` when input is exhausted
    /// or the next line is not a valid value of that type.
    fn read_value(&mut self, ty: TypeTag) -> Option<Value>;
}

/// Sink for WRITE and the diagnostic instructions.
pub trait Output {
    /// Write a value as program output. Nil renders as empty text.
    fn write_value(&mut self, value: &Value) -> io::Result<()>;

    /// Write diagnostic text (DPRINT, BREAK). Discarded by default.
    fn write_diagnostic(&mut self, _text: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Line-oriented input: one value per line.
///
/// - `int`: the line must be an int literal (decimal, `0x` hex, `0` octal)
/// - `bool`: `true` in any letter case is true, every other line is false
/// - `string`: the line without its terminator
#[derive(Debug)]
pub struct LineInput<R> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> Input for LineInput<R> {
    fn read_value(&mut self, ty: TypeTag) -> Option<Value> {
        let line = self.next_line()?;
        match ty {
            TypeTag::Int => parse_int(line.trim()).map(Value::Int),
            TypeTag::Bool => Some(Value::Bool(line.trim().eq_ignore_ascii_case("true"))),
            TypeTag::String => Some(Value::Text(line)),
        }
    }
}

/// Input that is always exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl Input for NoInput {
    fn read_value(&mut self, _ty: TypeTag) -> Option<Value> {
        None
    }
}

/// Output to a pair of writers: program output and diagnostics.
#[derive(Debug)]
pub struct StreamOutput<W, E> {
    out: W,
    diag: E,
}

impl<W: Write, E: Write> StreamOutput<W, E> {
    pub fn new(out: W, diag: E) -> Self {
        Self { out, diag }
    }

    /// Flush both writers.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.diag.flush()
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.diag)
    }
}

impl<W: Write, E: Write> Output for StreamOutput<W, E> {
    fn write_value(&mut self, value: &Value) -> io::Result<()> {
        write!(self.out, "{value}")
    }

    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.diag, "{text}")
    }
}

/// In-memory output, for embedding and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub diagnostics: String,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for CapturedOutput {
    fn write_value(&mut self, value: &Value) -> io::Result<()> {
        self.stdout.push_str(&value.to_string());
        Ok(())
    }

    fn write_diagnostic(&mut self, text: &str) -> io::Result<()> {
        self.diagnostics.push_str(text);
        self.diagnostics.push('\n');
        Ok(())
    }
}
