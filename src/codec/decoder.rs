//! Resource decoder: discriminator peek, registry dispatch, structural decode.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

use super::{DecodeContext, DecodeIssue, FhirStructure, JsonObject, ObjectReader, join_path, json_kind};
use crate::core::CodecConfig;
use crate::error::{FhirCodecError, Result};
use crate::model::{Resource, ResourceType};
use crate::types::ResourceTypeRegistry;

const DISCRIMINATOR: &str = "resourceType";

/// Only the discriminator is materialized; every other member is skipped
/// without allocating.
#[derive(Deserialize)]
struct DiscriminatorPeek<'a> {
    #[serde(
        rename = "resourceType",
        borrow,
        default,
        deserialize_with = "borrowed_discriminator"
    )]
    resource_type: Option<Cow<'a, str>>,
}

struct DiscriminatorVisitor;

impl<'de> Visitor<'de> for DiscriminatorVisitor {
    type Value = Option<Cow<'de, str>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a resource type string")
    }

    fn visit_borrowed_str<E>(self, value: &'de str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(Cow::Borrowed(value)))
    }

    // Escaped strings cannot be borrowed from the input
    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
        Ok(Some(Cow::Owned(value.to_string())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> std::result::Result<Self::Value, E> {
        Ok(Some(Cow::Owned(value)))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }
}

fn borrowed_discriminator<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Cow<'de, str>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DiscriminatorVisitor)
}

/// Extracts the `resourceType` of a raw payload without building a document tree.
///
/// The returned string borrows from `bytes` unless it contained escapes.
pub fn peek_resource_type(bytes: &[u8]) -> Result<Cow<'_, str>> {
    match bytes.iter().find(|byte| !byte.is_ascii_whitespace()) {
        Some(b'{') => {}
        Some(_) => {
            return Err(FhirCodecError::malformed(
                "$",
                "a resource payload must be a JSON object",
            ));
        }
        None => return Err(FhirCodecError::malformed("$", "empty payload")),
    }

    let peek: DiscriminatorPeek<'_> = serde_json::from_slice(bytes)
        .map_err(|err| FhirCodecError::malformed("$", err.to_string()))?;

    match peek.resource_type {
        Some(resource_type) if !resource_type.is_empty() => Ok(resource_type),
        _ => Err(FhirCodecError::MissingDiscriminator {
            path: DISCRIMINATOR.to_string(),
        }),
    }
}

/// Outcome of a decode that also reports non-fatal findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub resource: Resource,
    pub issues: Vec<DecodeIssue>,
}

impl Decoded {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Decodes payloads into [`Resource`] values.
///
/// Holds configuration and a registry reference only; every call is independent.
#[derive(Debug, Clone)]
pub struct ResourceDecoder<'r> {
    config: CodecConfig,
    registry: &'r ResourceTypeRegistry,
}

impl Default for ResourceDecoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDecoder<'static> {
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

impl<'r> ResourceDecoder<'r> {
    pub fn with_registry(config: CodecConfig, registry: &'r ResourceTypeRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Resource> {
        self.decode_with_report(bytes).map(|decoded| decoded.resource)
    }

    pub fn decode_str(&self, payload: &str) -> Result<Resource> {
        self.decode(payload.as_bytes())
    }

    /// Decodes and returns the warnings recorded under lenient policies.
    pub fn decode_with_report(&self, bytes: &[u8]) -> Result<Decoded> {
        let resource_type = peek_resource_type(bytes)?;
        if !self.registry.contains(&resource_type) {
            return Err(self.registry.unknown_variant(&resource_type, DISCRIMINATOR));
        }
        tracing::debug!(resource_type = %resource_type, "discriminator resolved");

        let object: JsonObject = serde_json::from_slice(bytes)
            .map_err(|err| FhirCodecError::malformed("$", err.to_string()))?;

        let mut ctx = DecodeContext::new(&self.config, self.registry);
        let resource = decode_resource_object(object, &mut ctx)?;
        Ok(Decoded {
            resource,
            issues: ctx.into_issues(),
        })
    }

    /// Decodes an already-parsed document.
    pub fn decode_value(&self, value: Value) -> Result<Resource> {
        let mut ctx = DecodeContext::new(&self.config, self.registry);
        <Resource as super::FhirValue>::decode_value(value, &mut ctx)
    }

    /// Decodes through the dispatcher and narrows to a concrete variant.
    pub fn decode_as<T: ResourceType>(&self, bytes: &[u8]) -> Result<T> {
        let resource = self.decode(bytes)?;
        T::try_from(resource)
    }
}

/// Dispatches one JSON object on its discriminator and fills the registered variant.
pub(crate) fn decode_resource_object(
    mut object: JsonObject,
    ctx: &mut DecodeContext<'_>,
) -> Result<Resource> {
    let resource_type = match object.shift_remove(DISCRIMINATOR) {
        Some(Value::String(resource_type)) if !resource_type.is_empty() => resource_type,
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(FhirCodecError::MissingDiscriminator {
                path: join_path(ctx.current_path(), DISCRIMINATOR),
            });
        }
        Some(other) => {
            return Err(FhirCodecError::malformed(
                join_path(ctx.current_path(), DISCRIMINATOR),
                format!("expected a string, found {}", json_kind(&other)),
            ));
        }
    };

    let descriptor = ctx.registry().lookup(&resource_type).ok_or_else(|| {
        ctx.registry()
            .unknown_variant(&resource_type, join_path(ctx.current_path(), DISCRIMINATOR))
    })?;

    let mut resource = descriptor.instantiate();
    within_resource_root(ctx, descriptor.resource_type, |ctx| {
        tracing::debug!(resource_type = descriptor.resource_type, "decoding resource");
        let mut reader = ObjectReader::new(object, descriptor.schema, ctx);
        resource.read_fields(&mut reader)
    })?;
    Ok(resource)
}

/// Strips and checks the discriminator when a concrete resource struct is decoded directly.
pub(crate) fn expect_resource_type<T: FhirStructure>(
    object: &mut JsonObject,
    ctx: &DecodeContext<'_>,
) -> Result<()> {
    match object.shift_remove(DISCRIMINATOR) {
        Some(Value::String(found)) if found == T::SCHEMA.name => Ok(()),
        Some(Value::String(found)) => Err(FhirCodecError::ResourceTypeMismatch {
            expected: T::SCHEMA.name.to_string(),
            found,
        }),
        Some(Value::Null) | None => Err(FhirCodecError::MissingDiscriminator {
            path: join_path(ctx.current_path(), DISCRIMINATOR),
        }),
        Some(other) => Err(FhirCodecError::malformed(
            join_path(ctx.current_path(), DISCRIMINATOR),
            format!("expected a string, found {}", json_kind(&other)),
        )),
    }
}

/// Error paths are rooted at the outermost resource type; nested resources
/// (contained, bundle entries) continue the enclosing path.
pub(crate) fn within_resource_root<T>(
    ctx: &mut DecodeContext<'_>,
    resource_type: &str,
    f: impl FnOnce(&mut DecodeContext<'_>) -> Result<T>,
) -> Result<T> {
    if ctx.current_path().is_empty() {
        ctx.scoped(resource_type, |ctx| f(ctx))
    } else {
        f(ctx)
    }
}
