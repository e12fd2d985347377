//! Failure-message templating
//!
//! Placeholders:
//! - `{reason}`: the scope's reason, prefixed with " because " when needed
//! - `{context}` / `{context:fallback}`: the current caller identifier or path,
//!   or `fallback` (default `object`) when there is none
//! - `{0}`, `{1}`, ...: positional arguments rendered by the value formatter
//! - `{key}`: a context-data entry
//! - `{{` and `}}`: literal braces
//!
//! Unknown placeholders are left as written.

use super::ContextData;
use crate::format::ValueFormatter;
use crate::value::Value;

const DEFAULT_CONTEXT_FALLBACK: &str = "object";

/// Escape text so it survives templating verbatim.
pub fn escape_placeholders(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

pub(crate) struct MessageBuilder<'a> {
    pub(crate) identifier: Option<&'a str>,
    pub(crate) reason: Option<&'a str>,
    pub(crate) data: &'a ContextData,
    pub(crate) formatter: &'a dyn ValueFormatter,
}

impl MessageBuilder<'_> {
    pub(crate) fn build(&self, template: &str, args: &[Value]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            push_literal(&mut out, &rest[..open]);
            let after = &rest[open + 1..];
            if let Some(escaped) = after.strip_prefix('{') {
                out.push('{');
                rest = escaped;
                continue;
            }
            let Some(close) = after.find('}') else {
                push_literal(&mut out, &rest[open..]);
                rest = "";
                break;
            };
            let tag = &after[..close];
            match self.resolve(tag, args) {
                Some(text) => out.push_str(&text),
                None => {
                    out.push('{');
                    out.push_str(tag);
                    out.push('}');
                }
            }
            rest = &after[close + 1..];
        }
        push_literal(&mut out, rest);
        out
    }

    fn resolve(&self, tag: &str, args: &[Value]) -> Option<String> {
        if tag == "reason" {
            return Some(self.sanitized_reason());
        }
        if tag == "context" || tag.starts_with("context:") {
            let fallback = tag
                .strip_prefix("context:")
                .unwrap_or(DEFAULT_CONTEXT_FALLBACK);
            return Some(self.identifier.unwrap_or(fallback).to_string());
        }
        if !tag.is_empty() && tag.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = tag.parse().ok()?;
            return args.get(index).map(|arg| self.formatter.format(arg));
        }
        self.data.get(tag).map(str::to_string)
    }

    fn sanitized_reason(&self) -> String {
        match self.reason.map(str::trim) {
            None | Some("") => String::new(),
            Some(reason) if reason.starts_with("because") => format!(" {}", reason),
            Some(reason) => format!(" because {}", reason),
        }
    }
}

fn push_literal(out: &mut String, literal: &str) {
    out.push_str(&literal.replace("}}", "}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultValueFormatter;

    fn build(
        identifier: Option<&str>,
        reason: Option<&str>,
        template: &str,
        args: &[Value],
    ) -> String {
        let data = ContextData::default();
        MessageBuilder {
            identifier,
            reason,
            data: &data,
            formatter: &DefaultValueFormatter,
        }
        .build(template, args)
    }

    #[test]
    fn test_context_uses_identifier_or_fallback() {
        let template = "Expected {context:subject} to be {0}.";
        assert_eq!(build(None, None, template, &[Value::from(1)]), "Expected subject to be 1.");
        assert_eq!(
            build(Some("root.Name"), None, template, &[Value::from(1)]),
            "Expected root.Name to be 1."
        );
        assert_eq!(build(None, None, "{context}", &[]), "object");
    }

    #[test]
    fn test_reason_is_prefixed_once() {
        let template = "Expected 1{reason}.";
        assert_eq!(
            build(None, Some("it matters"), template, &[]),
            "Expected 1 because it matters."
        );
        assert_eq!(
            build(None, Some("because it matters"), template, &[]),
            "Expected 1 because it matters."
        );
        assert_eq!(build(None, None, template, &[]), "Expected 1.");
    }

    #[test]
    fn test_escaped_braces_survive() {
        let template = escape_placeholders("Color.Red {value: 0}");
        assert_eq!(build(None, None, &template, &[]), "Color.Red {value: 0}");
        assert_eq!(build(None, None, "{{0}}", &[Value::from(5)]), "{0}");
    }

    #[test]
    fn test_formatted_args_are_not_rescanned() {
        let out = build(None, None, "found {0}", &[Value::from("{1}")]);
        assert_eq!(out, "found \"{1}\"");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        assert_eq!(build(None, None, "x {unknown} {3}", &[]), "x {unknown} {3}");
    }

    #[test]
    fn test_context_data_placeholder() {
        let mut data = ContextData::default();
        data.add("expectation", "the order", false);
        let out = MessageBuilder {
            identifier: None,
            reason: None,
            data: &data,
            formatter: &DefaultValueFormatter,
        }
        .build("{expectation} differs", &[]);
        assert_eq!(out, "the order differs");
    }
}
