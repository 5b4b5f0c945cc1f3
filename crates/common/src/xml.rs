//! The IPPcode24 XML program form.
//!
//! ```xml
//! <program language="IPPcode24">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hi</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! Only `program`, `instruction` and `arg1`..`arg3` elements are allowed.
//! Argument text is trimmed. Record-level checks (order uniqueness, slot
//! gaps, empty opcodes) are left to the verifier.

use crate::error::LoadError;
use crate::raw::{RawArg, RawInstruction, RawProgram};
use roxmltree::{Document, Node};

const LANGUAGE: &str = "IPPcode24";

pub(crate) fn parse_program(text: &str) -> Result<RawProgram, LoadError> {
    let doc = Document::parse(text).map_err(|e| LoadError::Xml {
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    let language_ok = root
        .attribute("language")
        .is_some_and(|lang| lang.eq_ignore_ascii_case(LANGUAGE));
    if root.tag_name().name() != "program" || !language_ok {
        return Err(LoadError::XmlRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let instructions = elements(root)
        .map(|node| match node.tag_name().name() {
            "instruction" => parse_instruction(node),
            other => Err(unexpected(other, "program")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawProgram::new(instructions))
}

fn parse_instruction(node: Node<'_, '_>) -> Result<RawInstruction, LoadError> {
    let order_text = node.attribute("order").unwrap_or("");
    let order = order_text
        .trim()
        .parse()
        .map_err(|_| LoadError::XmlAttribute {
            element: "instruction",
            attribute: "order",
            value: order_text.to_string(),
        })?;
    // A missing opcode becomes an empty one, which the verifier reports.
    let opcode = node.attribute("opcode").unwrap_or("");

    let args = elements(node)
        .map(|arg| {
            let name = arg.tag_name().name();
            let slot = arg_slot(name).ok_or_else(|| unexpected(name, "instruction"))?;
            if let Some(child) = elements(arg).next() {
                return Err(unexpected(child.tag_name().name(), name));
            }
            let tag = arg.attribute("type").unwrap_or("");
            Ok(RawArg::new(slot, tag, trim(&text_of(arg))))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawInstruction::new(order, opcode, args))
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn arg_slot(name: &str) -> Option<i64> {
    match name {
        "arg1" => Some(1),
        "arg2" => Some(2),
        "arg3" => Some(3),
        _ => None,
    }
}

fn unexpected(name: &str, parent: &str) -> LoadError {
    LoadError::XmlElement {
        name: name.to_string(),
        parent: parent.to_string(),
    }
}

/// Concatenated text content, entities already decoded.
fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}
