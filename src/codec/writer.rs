use serde_json::Value;

use super::choice::encode_choice;
use super::{EncodeContext, FhirValue, JsonObject};
use crate::core::SummaryMode;
use crate::error::Result;
use crate::model::Extension;
use crate::types::{ChoiceType, StructureKind, StructureSchema};

/// Builds one JSON object from a structure's fields, mirroring [`ObjectReader`](super::ObjectReader).
///
/// Empty values are omitted; members land in the order they are written.
/// Fields the configured [`SummaryMode`] excludes are skipped before any check runs.
pub struct ObjectWriter<'c, 'a> {
    object: JsonObject,
    schema: &'static StructureSchema,
    ctx: &'c mut EncodeContext<'a>,
}

impl<'c, 'a> ObjectWriter<'c, 'a> {
    pub fn new(schema: &'static StructureSchema, ctx: &'c mut EncodeContext<'a>) -> Self {
        Self {
            object: JsonObject::new(),
            schema,
            ctx,
        }
    }

    fn mode(&self) -> SummaryMode {
        match self.schema.kind {
            StructureKind::ComplexType => SummaryMode::All,
            _ => self.ctx.config().summary,
        }
    }

    /// Whether the field named `key` is written under the current summary mode.
    pub fn includes(&self, key: &str) -> bool {
        let mode = self.mode();
        if mode == SummaryMode::All {
            return true;
        }

        let summary = self.schema.field(key).is_some_and(|field| field.summary);
        let identity = matches!(key, "id" | "meta");
        let narrative = key == "text" && self.schema.kind == StructureKind::DomainResource;
        match mode {
            SummaryMode::All => true,
            SummaryMode::True => summary || identity,
            SummaryMode::False => !summary,
            SummaryMode::Text => narrative || identity,
            SummaryMode::Data => !narrative,
        }
    }

    pub fn context(&mut self) -> &mut EncodeContext<'a> {
        self.ctx
    }

    /// Writes the discriminator. Called before any field so it leads the object.
    pub fn resource_type(&mut self, resource_type: &str) {
        self.object.insert(
            "resourceType".to_string(),
            Value::String(resource_type.to_string()),
        );
    }

    fn put<T: FhirValue>(&mut self, key: &str, value: &T) -> Result<()> {
        let encoded = self.ctx.scoped(key, |ctx| value.encode_value(ctx))?;
        self.object.insert(key.to_string(), encoded);
        Ok(())
    }

    pub fn required<T: FhirValue>(&mut self, key: &str, value: &T) -> Result<()> {
        if !self.includes(key) {
            return Ok(());
        }
        if value.is_empty() {
            return self.ctx.missing_required(key);
        }
        self.put(key, value)
    }

    pub fn optional<T: FhirValue>(&mut self, key: &str, value: &Option<T>) -> Result<()> {
        match value {
            Some(value) if !value.is_empty() && self.includes(key) => self.put(key, value),
            _ => Ok(()),
        }
    }

    pub fn repeated<T: FhirValue>(&mut self, key: &str, values: &[T]) -> Result<()> {
        if values.is_empty() || !self.includes(key) {
            return Ok(());
        }

        let items = self.ctx.scoped(key, |ctx| {
            values
                .iter()
                .enumerate()
                .map(|(index, value)| ctx.scoped_index(index, |ctx| value.encode_value(ctx)))
                .collect::<Result<Vec<_>>>()
        })?;
        self.object.insert(key.to_string(), Value::Array(items));
        Ok(())
    }

    pub fn extensions(&mut self, key: &str, extensions: &[Extension]) -> Result<()> {
        self.repeated(key, extensions)
    }

    pub fn choice<C: ChoiceType>(&mut self, base_name: &str, value: &Option<C>) -> Result<()> {
        if !self.includes(base_name) {
            return Ok(());
        }
        if let Some(choice) = value {
            let (key, encoded) = encode_choice(base_name, choice, self.ctx)?;
            self.object.insert(key, encoded);
        }
        Ok(())
    }

    pub fn required_choice<C: ChoiceType>(
        &mut self,
        base_name: &str,
        value: &Option<C>,
    ) -> Result<()> {
        if !self.includes(base_name) {
            return Ok(());
        }
        if value.is_none() {
            return self.ctx.missing_required(&format!("{base_name}[x]"));
        }
        self.choice(base_name, value)
    }

    /// Re-emits preserved unknown members after the schema fields.
    pub fn extra(&mut self, extra: &JsonObject) {
        if !self.mode().keeps_unknown_members() {
            return;
        }
        for (key, value) in extra {
            if !self.object.contains_key(key) {
                self.object.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn finish(self) -> JsonObject {
        self.object
    }
}
