//! # OctoFHIR FHIRCodec
//!
//! Polymorphic decoding and encoding of FHIR JSON resources into typed Rust values.
//!
//! ## Features
//!
//! - **Discriminator dispatch**: `resourceType` is peeked from the raw payload and
//!   resolved against a read-only registry before the full decode starts
//! - **Typed choice elements**: `onset[x]`, `value[x]` and friends decode into closed
//!   sum types keyed by the wire suffix, and encode back under the same key
//! - **Lossless round trips**: extensions, unknown members and decimal scale survive
//!   decode then encode
//! - **Policies**: strict or lenient required fields; preserve, drop or reject
//!   unknown members
//!
//! ## Quick Start
//!
//! ```rust
//! use octofhir_fhircodec::{Resource, ResourceDecoder, ResourceEncoder};
//!
//! # fn example() -> octofhir_fhircodec::Result<()> {
//! let payload = br#"{"resourceType":"Basic","id":"b1","code":{"text":"note"}}"#;
//! let resource = ResourceDecoder::new().decode(payload)?;
//! assert_eq!(resource.resource_type(), "Basic");
//!
//! let bytes = ResourceEncoder::new().encode(&resource)?;
//! assert_eq!(&bytes[..], &payload[..]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod codec;
pub mod core;
pub mod error;
pub mod model;
pub mod primitives;
pub mod types;

pub use codec::{
    DecodeContext, DecodeIssue, Decoded, EncodeContext, FhirStructure, FhirValue, IssueSeverity,
    JsonObject, ResourceDecoder, ResourceEncoder, peek_resource_type,
};
pub use crate::core::{
    CodecConfig, FhirVersion, RequiredFieldPolicy, SummaryMode, UnknownFieldPolicy,
};
pub use error::Result; // Our Result type takes precedence
pub use error::FhirCodecError;
pub use model::{Resource, ResourceType};
pub use types::{
    ChoiceType, FieldKind, FieldSchema, RegistryBuilder, ResourceTypeRegistry, StructureKind,
    StructureSchema, VariantDescriptor,
};

/// Decodes a payload with the default configuration and the built-in catalogue.
pub fn decode_resource(bytes: &[u8]) -> Result<Resource> {
    ResourceDecoder::new().decode(bytes)
}

/// Decodes a payload that must be of variant `T`.
pub fn decode_resource_as<T: ResourceType>(bytes: &[u8]) -> Result<T> {
    ResourceDecoder::new().decode_as(bytes)
}

pub fn encode_resource(resource: &Resource) -> Result<Vec<u8>> {
    ResourceEncoder::new().encode(resource)
}
