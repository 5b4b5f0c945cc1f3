//! Tokenizer for IPPcode24 source text.

/// The language header accepted on the first non-blank line.
pub(crate) const HEADER: &str = ".IPPcode24";

/// One classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    /// Blank or comment-only.
    Empty,
    /// A `.`-prefixed directive, e.g. `.IPPcode24`.
    Header(Vec<&'a str>),
    /// Opcode followed by its argument tokens.
    Instruction(Vec<&'a str>),
}

/// Tokenize a single line of source text.
///
/// Comments start with `#` and extend to end of line. A literal `#` inside
/// a string must be written as `\035`, so splitting here is safe.
pub(crate) fn tokenize_line(line: &str) -> Line<'_> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    match tokens.first() {
        None => Line::Empty,
        Some(first) if first.starts_with('.') => Line::Header(tokens),
        Some(_) => Line::Instruction(tokens),
    }
}

/// Whether a header line is exactly the accepted language header.
pub(crate) fn is_valid_header(tokens: &[&str]) -> bool {
    matches!(tokens, [only] if only.eq_ignore_ascii_case(HEADER))
}
