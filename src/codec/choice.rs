//! Choice element codec.
//!
//! A `name[x]` element is carried on the wire as `<name><TypeSuffix>`. Decoding scans
//! the object for keys sharing the base name, requires at most one of them, and hands
//! the value to the choice type's alternative decoder. Encoding writes exactly one key.

use serde_json::Value;

use super::{DecodeContext, EncodeContext, JsonObject, join_path};
use crate::error::{FhirCodecError, Result};
use crate::types::{ChoiceType, StructureSchema, choice_key, split_choice_key};

/// Decodes the choice element `base_name[x]` out of `object`.
///
/// The matching member is removed from `object`. Keys that are exact names of
/// other fields in `schema` (`valueSet` next to `value[x]`) are never candidates.
pub fn decode_choice<C: ChoiceType>(
    object: &mut JsonObject,
    base_name: &str,
    schema: &StructureSchema,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<C>> {
    if object.contains_key(base_name) && !schema.is_plain_member(base_name) {
        return Err(FhirCodecError::malformed(
            join_path(ctx.current_path(), base_name),
            format!("choice element `{base_name}[x]` must carry a type suffix"),
        ));
    }

    let candidates: Vec<&str> = object
        .keys()
        .filter(|key| !schema.is_plain_member(key))
        .filter(|key| split_choice_key(key, base_name).is_some())
        .map(String::as_str)
        .collect();

    let key = match candidates.as_slice() {
        [] => return Ok(None),
        [key] => key.to_string(),
        _ => {
            let mut suffixes: Vec<String> = candidates
                .iter()
                .filter_map(|key| split_choice_key(key, base_name))
                .map(str::to_string)
                .collect();
            suffixes.sort();
            return Err(FhirCodecError::AmbiguousChoice {
                path: ctx.current_path().to_string(),
                base_name: base_name.to_string(),
                suffixes,
            });
        }
    };

    let suffix = key[base_name.len()..].to_string();
    if !C::permits(&suffix) {
        return Err(FhirCodecError::UnknownChoiceAlternative {
            path: join_path(ctx.current_path(), &key),
            base_name: base_name.to_string(),
            suffix,
        });
    }

    let value = match object.shift_remove(&key) {
        Some(Value::Null) | None => return Ok(None),
        Some(value) => value,
    };

    let decoded = ctx.scoped(&key, |ctx| C::decode_alternative(&suffix, value, ctx))?;
    match decoded {
        Some(choice) => Ok(Some(choice)),
        None => Err(FhirCodecError::UnknownChoiceAlternative {
            path: join_path(ctx.current_path(), &key),
            base_name: base_name.to_string(),
            suffix,
        }),
    }
}

/// Encodes a choice value as its single `(key, value)` member.
pub fn encode_choice<C: ChoiceType>(
    base_name: &str,
    choice: &C,
    ctx: &mut EncodeContext<'_>,
) -> Result<(String, Value)> {
    let key = choice_key(base_name, choice.suffix());
    let value = ctx.scoped(&key, |ctx| choice.encode_alternative(ctx))?;
    Ok((key, value))
}
