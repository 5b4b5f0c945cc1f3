//! Operand descriptors and literal parsing.
//!
//! Every argument is parsed exactly once when its instruction is built.
//! Constants become [`Operand::Literal`]; variable references become
//! [`Operand::Variable`] and are resolved against the frames only when the
//! instruction executes.

use crate::type_tag::TypeTag;
use crate::value::Value;
use std::fmt;

/// The three frame selectors of a variable reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `GF`: the single global frame.
    Global,
    /// `LF`: the innermost local frame.
    Local,
    /// `TF`: the pending (temporary) frame.
    Temporary,
}

impl Scope {
    /// Source-level prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Global => "GF",
            Scope::Local => "LF",
            Scope::Temporary => "TF",
        }
    }

    /// Parse a frame selector. Exact, case-sensitive.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(Scope::Global),
            "LF" => Some(Scope::Local),
            "TF" => Some(Scope::Temporary),
            _ => None,
        }
    }
}

/// A `<scope>@<name>` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub scope: Scope,
    pub name: String,
}

impl VarRef {
    pub fn new(scope: Scope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }

    /// Parse `GF@x`, `LF@x` or `TF@x`. The name must be an identifier.
    pub fn parse(text: &str) -> Option<Self> {
        let (prefix, name) = text.split_once('@')?;
        let scope = Scope::from_prefix(prefix)?;
        if !is_identifier(name) {
            return None;
        }
        Some(Self::new(scope, name))
    }
}

/// Label and variable names: a letter or one of `_-$&%*!?`, then the same
/// set plus digits.
pub fn is_identifier(name: &str) -> bool {
    const SPECIAL: &str = "_-$&%*!?";
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || SPECIAL.contains(first))
        && chars.all(|c| c.is_alphanumeric() || SPECIAL.contains(c))
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.scope.prefix(), self.name)
    }
}

/// Argument type tags accepted in raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    Int,
    Bool,
    String,
    Nil,
    Var,
    Label,
    Type,
}

/// All argument type tags.
pub const ALL_ARG_TYPES: [ArgType; 7] = [
    ArgType::Int,
    ArgType::Bool,
    ArgType::String,
    ArgType::Nil,
    ArgType::Var,
    ArgType::Label,
    ArgType::Type,
];

impl ArgType {
    /// Tag as written in records and source text.
    pub fn name(self) -> &'static str {
        match self {
            ArgType::Int => "int",
            ArgType::Bool => "bool",
            ArgType::String => "string",
            ArgType::Nil => "nil",
            ArgType::Var => "var",
            ArgType::Label => "label",
            ArgType::Type => "type",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_ARG_TYPES.iter().find(|t| t.name() == name).copied()
    }

    /// Constant tags that may appear before `@` in a symbol.
    pub fn is_constant(self) -> bool {
        matches!(
            self,
            ArgType::Int | ArgType::Bool | ArgType::String | ArgType::Nil
        )
    }
}

/// A bound argument: a constant, or a reference resolved at execution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Literal(Value),
    Variable(VarRef),
}

impl Operand {
    /// Short description for diagnostics, e.g. `GF@x` or `int@5`.
    pub fn describe(&self) -> String {
        match self {
            Operand::Variable(var) => var.to_string(),
            Operand::Literal(Value::Label(name)) => format!("label {name}"),
            Operand::Literal(Value::Type(tag)) => format!("type {tag}"),
            Operand::Literal(v) => format!("{}@{}", v.type_name(), escape_string(&v.to_string())),
        }
    }
}

/// Why a literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    UnknownType,
    InvalidInt,
    InvalidType,
    InvalidVariable,
    InvalidLabel,
}

/// Build an operand from a `(type-tag, raw-text)` pair.
pub fn parse_operand(tag: &str, raw: &str) -> Result<Operand, LiteralError> {
    let arg_type = ArgType::from_name(tag).ok_or(LiteralError::UnknownType)?;
    let operand = match arg_type {
        ArgType::Int => Operand::Literal(Value::Int(
            parse_int(raw).ok_or(LiteralError::InvalidInt)?,
        )),
        ArgType::Bool => Operand::Literal(Value::Bool(raw == "true")),
        ArgType::String => Operand::Literal(Value::Text(unescape_string(raw))),
        ArgType::Nil => Operand::Literal(Value::Nil),
        ArgType::Var => {
            Operand::Variable(VarRef::parse(raw).ok_or(LiteralError::InvalidVariable)?)
        }
        ArgType::Label => {
            if !is_identifier(raw) {
                return Err(LiteralError::InvalidLabel);
            }
            Operand::Literal(Value::Label(raw.to_string()))
        }
        ArgType::Type => Operand::Literal(Value::Type(
            TypeTag::from_name(raw).ok_or(LiteralError::InvalidType)?,
        )),
    };
    Ok(operand)
}

/// Parse an int literal.
///
/// `0x[hex]+` is hexadecimal, `0[0-7]+` is octal, `-?[0-9]+` is decimal.
/// Anything else, including out-of-range values, is rejected.
pub fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return i64::from_str_radix(hex, 16).ok();
        }
        return None;
    }

    if let Some(oct) = text.strip_prefix('0') {
        if !oct.is_empty() && oct.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return i64::from_str_radix(oct, 8).ok();
        }
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Replace every `\DDD` (three decimal digits) with the character at that
/// code point. Everything else, including malformed escapes, passes through.
pub fn unescape_string(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\' {
            if let Some(c) = chars.get(i + 1..i + 4).and_then(escape_at) {
                out.push(c);
                i += 4;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn escape_at(digits: &[char]) -> Option<char> {
    if digits.len() != 3 || !digits.iter().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let code = digits.iter().fold(0u32, |acc, c| acc * 10 + (*c as u32 - '0' as u32));
    char::from_u32(code)
}

/// Inverse of [`unescape_string`]: escapes whitespace, control characters,
/// `#` and `\` so the text survives as a single source token.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if (c as u32) <= 32 || c == '#' || c == '\\' {
            out.push_str(&format!("\\{:03}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_decimal() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("-17"), Some(-17));
        assert_eq!(parse_int("0"), Some(0));
    }

    #[test]
    fn int_hex_and_octal() {
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0xff"), Some(255));
        assert_eq!(parse_int("017"), Some(15));
    }

    #[test]
    fn int_leading_zero_non_octal_falls_back_to_decimal() {
        assert_eq!(parse_int("08"), Some(8));
    }

    #[test]
    fn int_rejects_garbage() {
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("0xZZ"), None);
        assert_eq!(parse_int("12a"), None);
        assert_eq!(parse_int("+5"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn unescape_decimal_sequences() {
        assert_eq!(unescape_string("a\\032b"), "a b");
        assert_eq!(unescape_string("\\035\\092"), "#\\");
        assert_eq!(unescape_string("line\\010"), "line\n");
    }

    #[test]
    fn unescape_leaves_malformed_escapes() {
        assert_eq!(unescape_string("\\03"), "\\03");
        assert_eq!(unescape_string("\\abc"), "\\abc");
        assert_eq!(unescape_string("tail\\"), "tail\\");
    }

    #[test]
    fn unescape_keeps_multibyte_text() {
        assert_eq!(unescape_string("žluť\\032kůň"), "žluť kůň");
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        let text = "a b#c\\d\ne";
        assert_eq!(unescape_string(&escape_string(text)), text);
    }

    #[test]
    fn var_ref_parse() {
        assert_eq!(
            VarRef::parse("LF@counter"),
            Some(VarRef::new(Scope::Local, "counter"))
        );
        assert_eq!(VarRef::parse("XF@a"), None);
        assert_eq!(VarRef::parse("GF@"), None);
        assert_eq!(VarRef::parse("gf@a"), None);
        assert_eq!(VarRef::parse("GFa"), None);
    }

    #[test]
    fn var_ref_name_must_be_identifier() {
        assert_eq!(VarRef::parse("GF@a@b"), None);
        assert_eq!(VarRef::parse("GF@x y"), None);
        assert_eq!(VarRef::parse("GF@1x"), None);
        assert_eq!(
            VarRef::parse("TF@$tmp-2?"),
            Some(VarRef::new(Scope::Temporary, "$tmp-2?"))
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("_tmp-1"));
        assert!(is_identifier("$x?"));
        assert!(is_identifier("čítač"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a@b"));
        assert!(!is_identifier("a#b"));
        assert!(!is_identifier("a b"));
    }

    #[test]
    fn operand_literals() {
        assert_eq!(
            parse_operand("int", "0x10"),
            Ok(Operand::Literal(Value::Int(16)))
        );
        assert_eq!(
            parse_operand("bool", "TRUE"),
            Ok(Operand::Literal(Value::Bool(false)))
        );
        assert_eq!(
            parse_operand("nil", "anything"),
            Ok(Operand::Literal(Value::Nil))
        );
        assert_eq!(
            parse_operand("type", "string"),
            Ok(Operand::Literal(Value::Type(TypeTag::String)))
        );
        assert_eq!(
            parse_operand("label", "loop"),
            Ok(Operand::Literal(Value::Label("loop".into())))
        );
    }

    #[test]
    fn operand_errors() {
        assert_eq!(parse_operand("float", "1.0"), Err(LiteralError::UnknownType));
        assert_eq!(parse_operand("int", "one"), Err(LiteralError::InvalidInt));
        assert_eq!(parse_operand("type", "nil"), Err(LiteralError::InvalidType));
        assert_eq!(parse_operand("var", "QF@x"), Err(LiteralError::InvalidVariable));
        assert_eq!(parse_operand("label", ""), Err(LiteralError::InvalidLabel));
        assert_eq!(parse_operand("label", "a#b"), Err(LiteralError::InvalidLabel));
    }

    #[test]
    fn empty_string_literal() {
        assert_eq!(
            parse_operand("string", ""),
            Ok(Operand::Literal(Value::Text(String::new())))
        );
    }

    #[test]
    fn describe_operands() {
        assert_eq!(
            Operand::Variable(VarRef::new(Scope::Global, "x")).describe(),
            "GF@x"
        );
        assert_eq!(Operand::Literal(Value::Int(5)).describe(), "int@5");
        assert_eq!(Operand::Literal(Value::Text("a b".into())).describe(), "string@a\\032b");
    }
}
