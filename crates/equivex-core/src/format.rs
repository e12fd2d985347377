//! Value formatting for diagnostics
//!
//! The engine never inspects formatted text; it only forwards it into
//! failure templates.

use crate::value::{EnumValue, Value};
use std::fmt::Write;

/// Renders a value for a failure message.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: &Value) -> String;
}

/// Default rendering:
///
/// | value            | rendering                          |
/// |------------------|------------------------------------|
/// | null             | `<null>`                           |
/// | string           | `"text"`                           |
/// | char             | `'c'`                              |
/// | enum             | `Color.Red {value: 0}`             |
/// | sequence         | `{1, 2, 3}` or `{empty}`           |
/// | dictionary       | `{["a"] = 1, ["b"] = 2}`           |
/// | record           | `Customer {Id = 1, Name = "Ada"}`  |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueFormatter;

impl ValueFormatter for DefaultValueFormatter {
    fn format(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut visiting = Vec::new();
        write_value(&mut out, value, &mut visiting);
        out
    }
}

/// `Type.Name {value: N}`, with flag names joined by `|`
pub fn format_enum(value: &EnumValue) -> String {
    format!(
        "{}.{} {{value: {}}}",
        value.type_name(),
        value.display_name().replace(", ", "|"),
        value.value()
    )
}

/// Debug-style float rendering keeps a decimal point on whole numbers so
/// `1.0` is visibly different from the integer `1`.
fn format_float(f: f64) -> String {
    format!("{:?}", f)
}

fn write_joined<'v>(
    out: &mut String,
    items: impl Iterator<Item = &'v Value>,
    visiting: &mut Vec<usize>,
) {
    out.push('{');
    let mut first = true;
    for item in items {
        if !first {
            out.push_str(", ");
        }
        first = false;
        write_value(out, item, visiting);
    }
    if first {
        out.push_str("empty");
    }
    out.push('}');
}

fn write_value(out: &mut String, value: &Value, visiting: &mut Vec<usize>) {
    match value {
        Value::Null => out.push_str("<null>"),
        Value::Bool(b) => {
            let _ = write!(out, "{}", b);
        }
        Value::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::Char(c) => {
            let _ = write!(out, "'{}'", c);
        }
        Value::String(s) => {
            let _ = write!(out, "\"{}\"", s);
        }
        Value::DateTime(d) => {
            let _ = write!(out, "<{}>", d.to_rfc3339());
        }
        Value::Enum(e) => out.push_str(&format_enum(e)),
        Value::Sequence(s) => write_joined(out, s.items().iter(), visiting),
        Value::Dictionary(d) => {
            if d.is_empty() {
                out.push_str("{empty}");
                return;
            }
            out.push('{');
            for (index, (key, item)) in d.entries().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                out.push('[');
                write_value(out, &key.to_value(), visiting);
                out.push_str("] = ");
                write_value(out, item, visiting);
            }
            out.push('}');
        }
        Value::Record(r) => {
            out.push_str(r.type_name());
            out.push_str(" {");
            for (index, member) in r.members().iter().enumerate() {
                out.push_str(if index > 0 { ", " } else { "" });
                out.push_str(member.name());
                out.push_str(" = ");
                write_value(out, member.value(), visiting);
            }
            out.push('}');
        }
        Value::Object(handle) => {
            let target = handle.borrow();
            if visiting.contains(&handle.id()) {
                let _ = write!(
                    out,
                    "{{Cyclic reference to type {} detected}}",
                    target.runtime_type()
                );
                return;
            }
            visiting.push(handle.id());
            write_value(out, &target, visiting);
            visiting.pop();
        }
    }
}
