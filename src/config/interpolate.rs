//! `%{name}` interpolation against a [`Context`].
//!
//! A reference is `%{` followed by an optional `::`, a name made of word
//! characters, dots and brackets, and `}`. Anything else, including a lone
//! `{`/`}` or `%{` not forming a reference, is copied through verbatim, so
//! glob alternations such as `{a,b}` survive interpolation untouched.

use thiserror::Error;

use crate::context::Context;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolationError {
    #[error("no value for interpolation variable '{0}'")]
    Missing(String),

    #[error("cannot interpolate non-scalar variable '{0}'")]
    NonScalar(String),
}

/// Substitutes every `%{name}` reference in `input`.
pub fn interpolate(input: &str, ctx: &Context) -> Result<String, InterpolationError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find("%{") {
        result.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        match parse_reference(after) {
            Some((name, consumed)) => {
                result.push_str(&lookup(ctx, name)?);
                rest = &after[consumed..];
            }
            None => {
                // Not a reference; keep the '%' and rescan from the '{'
                result.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }

    result.push_str(rest);
    Ok(result)
}

/// Interpolates every string inside `value`, recursing into sequences and
/// mapping values. Mapping keys are left alone.
pub fn interpolate_value(value: &mut Value, ctx: &Context) -> Result<(), InterpolationError> {
    match value {
        Value::String(s) => {
            if s.contains("%{") {
                *s = interpolate(s, ctx)?;
            }
        }
        Value::Sequence(seq) => {
            for item in seq.iter_mut() {
                interpolate_value(item, ctx)?;
            }
        }
        Value::Mapping(map) => {
            for (_key, item) in map.iter_mut() {
                interpolate_value(item, ctx)?;
            }
        }
        Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {}
    }
    Ok(())
}

/// Parses `[::]name}` at the start of `s`, returning the name and the number
/// of bytes consumed including the closing brace.
fn parse_reference(s: &str) -> Option<(&str, usize)> {
    let skip = if s.starts_with("::") { 2 } else { 0 };
    let body = &s[skip..];
    let end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    if end == 0 || !body[end..].starts_with('}') {
        return None;
    }
    Some((&body[..end], skip + end + 1))
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']')
}

fn lookup(ctx: &Context, name: &str) -> Result<String, InterpolationError> {
    let value = match ctx.get(name) {
        Some(value) => value,
        None => {
            lookup_path(ctx, name).ok_or_else(|| InterpolationError::Missing(name.to_string()))?
        }
    };
    value
        .to_scalar_string()
        .ok_or_else(|| InterpolationError::NonScalar(name.to_string()))
}

/// Resolves `head.key[0]` style paths through nested context values.
fn lookup_path<'a>(ctx: &'a Context, name: &str) -> Option<&'a Value> {
    let head_end = name.find(['.', '[']).unwrap_or(name.len());
    if head_end == 0 {
        return None;
    }

    let mut current = ctx.get(&name[..head_end])?;
    let mut rest = &name[head_end..];

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            current = current.as_mapping()?.get(&after[..end])?;
            rest = &after[end..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']')?;
            let index = &after[..close];
            current = match current {
                Value::Sequence(seq) => seq.get(index.parse::<usize>().ok()?)?,
                Value::Mapping(map) => map.get(index)?,
                _ => return None,
            };
            rest = &after[close + 1..];
        } else {
            return None;
        }
    }

    Some(current)
}
