//! Schema-driven JSON codec.
//!
//! Every catalogue type implements [`FhirValue`]; structures additionally implement
//! [`FhirStructure`], whose generated `read_fields` / `write_fields` walk the static
//! field schema through an [`ObjectReader`] / [`ObjectWriter`]. Choice fields are
//! delegated to [`choice`].

pub mod choice;
pub mod decoder;
pub mod encoder;
pub mod reader;
pub mod writer;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{CodecConfig, RequiredFieldPolicy};
use crate::error::{FhirCodecError, Result};
use crate::types::{ResourceTypeRegistry, StructureSchema};

pub use decoder::{Decoded, ResourceDecoder, peek_resource_type};
pub use encoder::ResourceEncoder;
pub use reader::ObjectReader;
pub use writer::ObjectWriter;

/// A JSON object with members kept in wire order.
pub type JsonObject = serde_json::Map<String, Value>;

/// A value with a JSON wire form.
pub trait FhirValue: Sized {
    /// FHIR type name reported in field schemas.
    const TYPE_NAME: &'static str;

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self>;

    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Value>;

    /// Empty values are omitted on encode and count as absent for required fields.
    fn is_empty(&self) -> bool {
        false
    }
}

/// A structure described by a static field schema.
pub trait FhirStructure: FhirValue + Default {
    const SCHEMA: &'static StructureSchema;

    fn read_fields(&mut self, reader: &mut ObjectReader<'_, '_>) -> Result<()>;

    fn write_fields(&self, writer: &mut ObjectWriter<'_, '_>) -> Result<()>;
}

impl<T: FhirValue> FhirValue for Box<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        T::decode_value(value, ctx).map(Box::new)
    }

    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Value> {
        (**self).encode_value(ctx)
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// Decodes a JSON object into one structure, driven by its schema.
///
/// Resource structures also consume and check their `resourceType` member.
pub fn decode_structure<T: FhirStructure>(value: Value, ctx: &mut DecodeContext<'_>) -> Result<T> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ctx.malformed(format!(
                "expected an object for {}, found {}",
                T::SCHEMA.name,
                json_kind(&other)
            )));
        }
    };

    if !T::SCHEMA.kind.is_resource() {
        return read_structure(object, ctx);
    }

    decoder::expect_resource_type::<T>(&mut object, ctx)?;
    decoder::within_resource_root(ctx, T::SCHEMA.name, |ctx| read_structure(object, ctx))
}

fn read_structure<T: FhirStructure>(object: JsonObject, ctx: &mut DecodeContext<'_>) -> Result<T> {
    let mut structure = T::default();
    let mut reader = ObjectReader::new(object, T::SCHEMA, ctx);
    structure.read_fields(&mut reader)?;
    Ok(structure)
}

pub fn encode_structure<T: FhirStructure>(
    structure: &T,
    ctx: &mut EncodeContext<'_>,
) -> Result<Value> {
    if !T::SCHEMA.kind.is_resource() {
        let mut writer = ObjectWriter::new(T::SCHEMA, ctx);
        structure.write_fields(&mut writer)?;
        return Ok(Value::Object(writer.finish()));
    }

    encoder::within_resource_root(ctx, T::SCHEMA.name, |ctx| {
        let mut writer = ObjectWriter::new(T::SCHEMA, ctx);
        writer.resource_type(T::SCHEMA.name);
        structure.write_fields(&mut writer)?;
        Ok(Value::Object(writer.finish()))
    })
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    Error,
    Warning,
    Information,
}

/// A non-fatal finding recorded while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub message: String,
    pub path: String,
}

impl DecodeIssue {
    pub fn warning(
        code: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code: code.into(),
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Element path tracking shared by the decode and encode contexts.
#[derive(Debug, Clone, Default)]
struct PathStack {
    current: String,
    stack: Vec<usize>,
}

impl PathStack {
    fn push(&mut self, segment: &str) {
        self.stack.push(self.current.len());
        if !self.current.is_empty() {
            self.current.push('.');
        }
        self.current.push_str(segment);
    }

    fn push_index(&mut self, index: usize) {
        self.stack.push(self.current.len());
        self.current.push_str(&format!("[{index}]"));
    }

    fn pop(&mut self) {
        if let Some(len) = self.stack.pop() {
            self.current.truncate(len);
        }
    }
}

/// Per-call decode state: configuration, registry, current path and issues.
///
/// Lives for one decode call only; nothing here outlives the call.
pub struct DecodeContext<'a> {
    config: &'a CodecConfig,
    registry: &'a ResourceTypeRegistry,
    path: PathStack,
    issues: Vec<DecodeIssue>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(config: &'a CodecConfig, registry: &'a ResourceTypeRegistry) -> Self {
        Self {
            config,
            registry,
            path: PathStack::default(),
            issues: Vec::new(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.config
    }

    pub fn registry(&self) -> &'a ResourceTypeRegistry {
        self.registry
    }

    pub fn current_path(&self) -> &str {
        &self.path.current
    }

    pub fn push_path(&mut self, segment: &str) {
        self.path.push(segment);
    }

    pub fn push_index(&mut self, index: usize) {
        self.path.push_index(index);
    }

    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    /// Runs `f` with `segment` appended to the current path.
    pub fn scoped<T>(
        &mut self,
        segment: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.push_path(segment);
        let result = f(self);
        self.pop_path();
        result
    }

    pub fn scoped_index<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.push_index(index);
        let result = f(self);
        self.pop_path();
        result
    }

    pub fn malformed(&self, message: impl Into<String>) -> FhirCodecError {
        FhirCodecError::malformed(self.path.current.clone(), message)
    }

    pub fn add_issue(&mut self, issue: DecodeIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, code: &str, message: impl Into<String>) {
        let issue = DecodeIssue::warning(code, message, self.path.current.clone());
        self.add_issue(issue);
    }

    /// Applies the required-field policy to an absent `field` of the current node.
    pub fn missing_required(&mut self, field: &str) -> Result<()> {
        let path = join_path(&self.path.current, field);
        match self.config.required_fields {
            RequiredFieldPolicy::Strict => Err(FhirCodecError::MissingRequiredField { path }),
            RequiredFieldPolicy::Lenient => {
                tracing::warn!(path = %path, "required field missing, left empty");
                self.issues.push(DecodeIssue::warning(
                    "required",
                    format!("required field `{field}` is missing"),
                    path,
                ));
                Ok(())
            }
        }
    }

    pub fn issues(&self) -> &[DecodeIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<DecodeIssue> {
        self.issues
    }
}

/// Per-call encode state.
pub struct EncodeContext<'a> {
    config: &'a CodecConfig,
    registry: &'a ResourceTypeRegistry,
    path: PathStack,
}

impl<'a> EncodeContext<'a> {
    pub fn new(config: &'a CodecConfig, registry: &'a ResourceTypeRegistry) -> Self {
        Self {
            config,
            registry,
            path: PathStack::default(),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.config
    }

    pub fn registry(&self) -> &'a ResourceTypeRegistry {
        self.registry
    }

    pub fn current_path(&self) -> &str {
        &self.path.current
    }

    pub fn scoped<T>(
        &mut self,
        segment: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn scoped_index<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.path.push_index(index);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn malformed(&self, message: impl Into<String>) -> FhirCodecError {
        FhirCodecError::malformed(self.path.current.clone(), message)
    }

    pub fn missing_required(&mut self, field: &str) -> Result<()> {
        let path = join_path(&self.path.current, field);
        match self.config.required_fields {
            RequiredFieldPolicy::Strict => Err(FhirCodecError::MissingRequiredField { path }),
            RequiredFieldPolicy::Lenient => {
                tracing::warn!(path = %path, "required field empty, omitted from output");
                Ok(())
            }
        }
    }
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}
