//! The resource catalogue.
//!
//! Every resource variant is declared with [`fhir_structure!`](crate::fhir_structure)
//! and listed once in the [`fhir_catalogue!`](crate::fhir_catalogue) invocation below,
//! which produces the [`Resource`] sum type and the descriptor table the default
//! registry is built from.

pub mod base;
pub mod clinical;
pub mod datatypes;
pub mod foundation;

use serde_json::Value;

use crate::codec::{
    DecodeContext, EncodeContext, FhirStructure, FhirValue, decoder, encoder, json_kind,
};
use crate::error::{FhirCodecError, Result};
use crate::fhir_catalogue;

pub use base::*;
pub use clinical::*;
pub use datatypes::*;
pub use foundation::*;

/// A concrete resource variant that can be registered and dispatched to.
pub trait ResourceType:
    FhirStructure + Into<Resource> + TryFrom<Resource, Error = FhirCodecError>
{
    /// The `resourceType` value identifying this variant.
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> Option<&str>;

    fn meta(&self) -> Option<&Meta>;

    fn contained(&self) -> &[Resource] {
        &[]
    }

    fn extension(&self) -> &[Extension] {
        &[]
    }
}

fhir_catalogue! {
    Basic,
    Patient,
    Practitioner,
    Organization,
    Encounter,
    Condition,
    Observation,
    AllergyIntolerance,
    Procedure,
    FamilyMemberHistory,
    Immunization,
    MedicationRequest,
    DiagnosticReport,
    Bundle,
    OperationOutcome,
    Parameters,
}

/// Nested resources (`contained`, bundle entries, parameter resources) go
/// through the same registry dispatch as a top-level payload.
impl FhirValue for Resource {
    const TYPE_NAME: &'static str = "Resource";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match value {
            Value::Object(object) => decoder::decode_resource_object(object, ctx),
            other => Err(ctx.malformed(format!(
                "expected a resource object, found {}",
                json_kind(&other)
            ))),
        }
    }

    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Value> {
        encoder::encode_resource_object(self, ctx)
    }
}

impl Resource {
    /// Finds a contained resource by id; a leading `#` is accepted.
    pub fn contained_by_id(&self, id: &str) -> Option<&Resource> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.contained()
            .iter()
            .find(|resource| resource.id() == Some(id))
    }

    /// Narrows to a concrete variant without consuming the value.
    pub fn downcast_ref<T: ResourceType + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: ResourceType>(&self) -> bool {
        self.resource_type() == T::RESOURCE_TYPE
    }
}
