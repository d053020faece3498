//! Metadata validation.
//!
//! Each tag is checked against a fixed schema (known name, arity, allowed
//! values), then the tags of a definition are checked against each other and
//! against the kind of definition they decorate. The first violation is
//! returned.

use berry_parser::ast::{Def, MetaTag, Metadata};

use crate::error::TypeError;

struct TagFormat {
    takes_value: bool,
    /// Allowed values; empty means any.
    values: &'static [&'static str],
}

fn tag_format(name: &str) -> Option<TagFormat> {
    let flag = TagFormat {
        takes_value: false,
        values: &[],
    };
    match name {
        "extern" | "abientry" | "inline" => Some(flag),
        "callconv" => Some(TagFormat {
            takes_value: true,
            values: &["c", "win64", "stdcall"],
        }),
        _ => None,
    }
}

pub fn validate(def: &Def) -> Result<(), TypeError> {
    let metadata = def.metadata();
    for tag in metadata.iter() {
        check_tag(tag)?;
    }

    match def {
        Def::Func(func) => {
            let external = metadata.contains("extern");
            if external && func.body.is_some() {
                return conflict(metadata, "extern", "@extern function cannot have a body");
            }
            if external && metadata.contains("abientry") {
                return conflict(
                    metadata,
                    "abientry",
                    "@abientry function cannot be marked @extern",
                );
            }
            if external && metadata.contains("inline") {
                return conflict(metadata, "inline", "@inline function cannot be marked @extern");
            }
            if !external && metadata.contains("callconv") {
                return conflict(
                    metadata,
                    "callconv",
                    "@callconv can only be applied to external functions",
                );
            }
        }
        Def::GlobalVar(global) => {
            if metadata.contains("callconv") {
                return conflict(metadata, "callconv", "global variable cannot be marked @callconv");
            }
            if metadata.contains("inline") {
                return conflict(metadata, "inline", "global variable cannot be marked @inline");
            }
            let external = metadata.contains("extern");
            if external && global.var.init.is_some() {
                return conflict(
                    metadata,
                    "extern",
                    "@extern global variable cannot have an initializer",
                );
            }
            if external && metadata.contains("abientry") {
                return conflict(
                    metadata,
                    "abientry",
                    "global variable cannot be marked both @extern and @abientry",
                );
            }
        }
    }
    Ok(())
}

fn check_tag(tag: &MetaTag) -> Result<(), TypeError> {
    let Some(format) = tag_format(&tag.name) else {
        return Err(TypeError::Metadata {
            message: format!("unsupported metadata tag: '{}'", tag.name),
            span: tag.name_span,
        });
    };

    match (&tag.value, format.takes_value) {
        (Some(_), false) => Err(TypeError::Metadata {
            message: format!("metadata tag '{}' does not take a value", tag.name),
            span: tag.value_span.unwrap_or(tag.name_span),
        }),
        (None, true) => Err(TypeError::Metadata {
            message: format!("@{} requires an argument", tag.name),
            span: tag.name_span,
        }),
        (Some(value), true)
            if !format.values.is_empty() && !format.values.contains(&value.as_str()) =>
        {
            Err(TypeError::Metadata {
                message: format!(
                    "'{value}' is not a valid value for metadata tag '{}'",
                    tag.name
                ),
                span: tag.value_span.unwrap_or(tag.name_span),
            })
        }
        _ => Ok(()),
    }
}

/// Error located at the tag named `at`.
fn conflict(metadata: &Metadata, at: &str, message: &str) -> Result<(), TypeError> {
    let span = metadata
        .get(at)
        .map(|tag| tag.name_span)
        .unwrap_or_default();
    Err(TypeError::Metadata {
        message: message.to_string(),
        span,
    })
}
