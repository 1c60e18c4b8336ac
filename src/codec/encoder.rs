//! Resource encoder: the mirror of [`ResourceDecoder`](super::ResourceDecoder).

use serde_json::Value;

use super::{EncodeContext, ObjectWriter};
use crate::core::{CodecConfig, SummaryMode};
use crate::error::Result;
use crate::model::Resource;
use crate::types::ResourceTypeRegistry;

#[derive(Debug, Clone)]
pub struct ResourceEncoder<'r> {
    config: CodecConfig,
    registry: &'r ResourceTypeRegistry,
}

impl Default for ResourceEncoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceEncoder<'static> {
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            registry: ResourceTypeRegistry::global(),
        }
    }
}

impl<'r> ResourceEncoder<'r> {
    pub fn with_registry(config: CodecConfig, registry: &'r ResourceTypeRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serializes `resource` to JSON bytes, pretty-printed if the config asks for it.
    pub fn encode(&self, resource: &Resource) -> Result<Vec<u8>> {
        let value = self.encode_to_value(resource)?;
        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(&value)?
        } else {
            serde_json::to_vec(&value)?
        };
        Ok(bytes)
    }

    pub fn encode_to_string(&self, resource: &Resource) -> Result<String> {
        let value = self.encode_to_value(resource)?;
        Ok(serde_json::to_string(&value)?)
    }

    pub fn encode_pretty(&self, resource: &Resource) -> Result<String> {
        let value = self.encode_to_value(resource)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Encodes with `mode` in place of the configured summary mode.
    pub fn encode_summary(&self, resource: &Resource, mode: SummaryMode) -> Result<Vec<u8>> {
        let config = self.config.clone().with_summary(mode);
        ResourceEncoder::with_registry(config, self.registry).encode(resource)
    }

    pub fn encode_to_value(&self, resource: &Resource) -> Result<Value> {
        let mut ctx = EncodeContext::new(&self.config, self.registry);
        encode_resource_object(resource, &mut ctx)
    }
}

/// Writes the discriminator first, then the variant's fields in schema order.
pub(crate) fn encode_resource_object(
    resource: &Resource,
    ctx: &mut EncodeContext<'_>,
) -> Result<Value> {
    let resource_type = resource.resource_type();
    if !ctx.registry().contains(resource_type) {
        return Err(ctx
            .registry()
            .unknown_variant(resource_type, ctx.current_path()));
    }

    within_resource_root(ctx, resource_type, |ctx| {
        tracing::debug!(resource_type, "encoding resource");
        let mut writer = ObjectWriter::new(resource.schema(), ctx);
        writer.resource_type(resource_type);
        resource.write_fields(&mut writer)?;
        Ok(Value::Object(writer.finish()))
    })
}

pub(crate) fn within_resource_root<T>(
    ctx: &mut EncodeContext<'_>,
    resource_type: &str,
    f: impl FnOnce(&mut EncodeContext<'_>) -> Result<T>,
) -> Result<T> {
    if ctx.current_path().is_empty() {
        ctx.scoped(resource_type, |ctx| f(ctx))
    } else {
        f(ctx)
    }
}
