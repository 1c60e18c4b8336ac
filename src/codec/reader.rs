use serde_json::Value;

use super::choice::decode_choice;
use super::{DecodeContext, FhirValue, JsonObject, join_path, json_kind};
use crate::core::UnknownFieldPolicy;
use crate::error::{FhirCodecError, Result};
use crate::model::Extension;
use crate::types::{ChoiceType, StructureSchema};

/// Consumes the members of one JSON object, field by field, in schema order.
///
/// Each method removes the members it reads; whatever is left when
/// [`finish`](Self::finish) runs is, by construction, not described by the schema.
pub struct ObjectReader<'c, 'a> {
    object: JsonObject,
    schema: &'static StructureSchema,
    ctx: &'c mut DecodeContext<'a>,
}

impl<'c, 'a> ObjectReader<'c, 'a> {
    pub fn new(
        object: JsonObject,
        schema: &'static StructureSchema,
        ctx: &'c mut DecodeContext<'a>,
    ) -> Self {
        Self {
            object,
            schema,
            ctx,
        }
    }

    pub fn schema(&self) -> &'static StructureSchema {
        self.schema
    }

    pub fn context(&mut self) -> &mut DecodeContext<'a> {
        self.ctx
    }

    // `null` and `{}` are treated the same as an absent member.
    fn take(&mut self, key: &str) -> Option<Value> {
        match self.object.shift_remove(key) {
            Some(Value::Null) | None => None,
            Some(Value::Object(object)) if object.is_empty() => None,
            Some(value) => Some(value),
        }
    }

    pub fn required<T: FhirValue + Default>(&mut self, key: &str) -> Result<T> {
        match self.optional::<T>(key)? {
            Some(value) if !value.is_empty() => Ok(value),
            Some(value) => {
                self.ctx.missing_required(key)?;
                Ok(value)
            }
            None => {
                self.ctx.missing_required(key)?;
                Ok(T::default())
            }
        }
    }

    pub fn optional<T: FhirValue>(&mut self, key: &str) -> Result<Option<T>> {
        match self.take(key) {
            Some(value) => self
                .ctx
                .scoped(key, |ctx| T::decode_value(value, ctx))
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn repeated<T: FhirValue>(&mut self, key: &str) -> Result<Vec<T>> {
        let items = match self.take(key) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FhirCodecError::malformed(
                    join_path(self.ctx.current_path(), key),
                    format!("expected an array, found {}", json_kind(&other)),
                ));
            }
            None => return Ok(Vec::new()),
        };

        self.ctx.scoped(key, |ctx| {
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| ctx.scoped_index(index, |ctx| T::decode_value(item, ctx)))
                .collect()
        })
    }

    /// Reads an extension slot, keeping entries in wire order.
    pub fn extensions(&mut self, key: &str) -> Result<Vec<Extension>> {
        self.repeated(key)
    }

    pub fn choice<C: ChoiceType>(&mut self, base_name: &str) -> Result<Option<C>> {
        decode_choice(&mut self.object, base_name, self.schema, self.ctx)
    }

    pub fn required_choice<C: ChoiceType>(&mut self, base_name: &str) -> Result<Option<C>> {
        let value = self.choice::<C>(base_name)?;
        if value.is_none() {
            self.ctx.missing_required(&format!("{base_name}[x]"))?;
        }
        Ok(value)
    }

    /// Applies the unknown-member policy to the leftover members.
    pub fn finish(&mut self) -> Result<JsonObject> {
        let remaining = std::mem::take(&mut self.object);
        if remaining.is_empty() {
            return Ok(remaining);
        }

        match self.ctx.config().unknown_fields {
            UnknownFieldPolicy::Preserve => Ok(remaining),
            UnknownFieldPolicy::Drop => {
                for key in remaining.keys() {
                    tracing::warn!(
                        path = %join_path(self.ctx.current_path(), &key),
                        structure = self.schema.name,
                        "dropping unknown member"
                    );
                    self.ctx
                        .add_warning("unknown-member", format!("unknown member `{key}` dropped"));
                }
                Ok(JsonObject::new())
            }
            UnknownFieldPolicy::Reject => {
                let key = remaining.keys().next().map(String::as_str).unwrap_or_default();
                Err(FhirCodecError::UnknownField {
                    path: join_path(self.ctx.current_path(), key),
                })
            }
        }
    }
}
