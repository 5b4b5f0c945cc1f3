//! Parser for IPPcode24 tokens into raw instruction records.
//!
//! Each argument token is checked against the opcode's signature slot and
//! turned into a `(type, value)` record argument.

use crate::error::AsmError;
use ippvm_common::operand::{is_identifier, parse_int, ArgType};
use ippvm_common::{ArgSlot, Opcode, RawArg, RawInstruction, TypeTag, VarRef};

/// Parse the tokens of one instruction line into a raw record with `order`.
pub(crate) fn parse_line(
    tokens: &[&str],
    line: usize,
    order: i64,
) -> Result<RawInstruction, AsmError> {
    let Some((mnemonic, args)) = tokens.split_first() else {
        return Err(AsmError::UnknownOpcode {
            line,
            token: String::new(),
        });
    };

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line,
        token: mnemonic.to_string(),
    })?;

    let signature = opcode.signature();
    if args.len() != signature.len() {
        return Err(AsmError::ArgumentCount {
            line,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
            found: args.len(),
        });
    }

    let args = signature
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (slot, token))| parse_arg(*slot, token, i as i64 + 1, line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawInstruction::new(order, opcode.mnemonic(), args))
}

fn parse_arg(slot: ArgSlot, token: &str, position: i64, line: usize) -> Result<RawArg, AsmError> {
    let invalid = || AsmError::InvalidArgument {
        line,
        token: token.to_string(),
        expected: slot.describe(),
    };

    let (tag, value) = match slot {
        ArgSlot::Var => {
            if !is_variable(token) {
                return Err(invalid());
            }
            ("var", token)
        }
        ArgSlot::Symb => {
            if is_variable(token) {
                ("var", token)
            } else {
                parse_constant(token).ok_or_else(invalid)?
            }
        }
        ArgSlot::Label => {
            if !is_identifier(token) {
                return Err(invalid());
            }
            ("label", token)
        }
        ArgSlot::Type => {
            if TypeTag::from_name(token).is_none() {
                return Err(invalid());
            }
            ("type", token)
        }
    };

    Ok(RawArg::new(position, tag, value))
}

/// Split `type@value` and check the value against its type.
fn parse_constant(token: &str) -> Option<(&'static str, &str)> {
    let (prefix, value) = token.split_once('@')?;
    let arg_type = ArgType::from_name(prefix).filter(|t| t.is_constant())?;
    let valid = match arg_type {
        ArgType::Int => parse_int(value).is_some(),
        ArgType::Bool => value == "true" || value == "false",
        ArgType::Nil => value == "nil",
        ArgType::String => has_valid_escapes(value),
        _ => false,
    };
    valid.then_some((arg_type.name(), value))
}

/// Every backslash must start a `\DDD` escape.
fn has_valid_escapes(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'\\'
            || bytes
                .get(i + 1..i + 4)
                .is_some_and(|digits| digits.iter().all(u8::is_ascii_digit))
    })
}

fn is_variable(token: &str) -> bool {
    VarRef::parse(token).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_move() {
        let record = parse_line(&["move", "GF@x", "int@0x10"], 1, 4).unwrap();
        assert_eq!(
            record,
            RawInstruction::new(
                4,
                "MOVE",
                vec![RawArg::new(1, "var", "GF@x"), RawArg::new(2, "int", "0x10")]
            )
        );
    }

    #[test]
    fn parse_no_arguments() {
        let record = parse_line(&["CREATEFRAME"], 2, 1).unwrap();
        assert!(record.args.is_empty());
    }

    #[test]
    fn symb_accepts_variables_and_constants() {
        let record = parse_line(&["JUMPIFEQ", "end", "LF@a", "nil@nil"], 1, 1).unwrap();
        assert_eq!(
            record.args,
            vec![
                RawArg::new(1, "label", "end"),
                RawArg::new(2, "var", "LF@a"),
                RawArg::new(3, "nil", "nil"),
            ]
        );
    }

    #[test]
    fn string_may_be_empty_and_contain_at() {
        let record = parse_line(&["WRITE", "string@"], 1, 1).unwrap();
        assert_eq!(record.args[0], RawArg::new(1, "string", ""));
        let record = parse_line(&["WRITE", "string@a@b"], 1, 1).unwrap();
        assert_eq!(record.args[0], RawArg::new(1, "string", "a@b"));
    }

    #[test]
    fn unknown_opcode() {
        assert_eq!(
            parse_line(&["FOO"], 5, 1),
            Err(AsmError::UnknownOpcode {
                line: 5,
                token: "FOO".to_string()
            })
        );
    }

    #[test]
    fn wrong_argument_count() {
        assert_eq!(
            parse_line(&["DEFVAR"], 3, 1),
            Err(AsmError::ArgumentCount {
                line: 3,
                opcode: "DEFVAR",
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn rejects_tokens_that_do_not_fit_their_slot() {
        for tokens in [
            ["DEFVAR", "int@1"],
            ["DEFVAR", "XF@x"],
            ["DEFVAR", "GF@1x"],
            ["WRITE", "int@abc"],
            ["WRITE", "bool@True"],
            ["WRITE", "nil@null"],
            ["WRITE", "float@1.0"],
            ["WRITE", "string@a\\0b"],
            ["JUMP", "GF@x"],
            ["WRITE", "plain"],
        ] {
            let err = parse_line(&tokens, 1, 1).unwrap_err();
            assert!(
                matches!(err, AsmError::InvalidArgument { .. }),
                "{tokens:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn read_takes_type_name() {
        let record = parse_line(&["READ", "GF@x", "bool"], 1, 1).unwrap();
        assert_eq!(record.args[1], RawArg::new(2, "type", "bool"));
        assert!(parse_line(&["READ", "GF@x", "nil"], 1, 1).is_err());
    }

    #[test]
    fn constant_prefixes_are_case_sensitive() {
        assert_eq!(parse_constant("int@7"), Some(("int", "7")));
        assert_eq!(parse_constant("INT@7"), None);
        assert_eq!(parse_constant("label@x"), None);
        assert_eq!(parse_constant("var@x"), None);
    }
}
