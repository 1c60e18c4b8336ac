pub mod choice_types;
pub mod element;
pub mod macros;
pub mod resource_type_registry;
pub mod schema;

pub use choice_types::{ChoiceType, capitalize_first, choice_key, split_choice_key, type_suffix};
pub use element::{Cardinality, FieldKind, FieldSchema};
pub use resource_type_registry::{
    RegistryBuilder, RegistryMetrics, ResourceTypeRegistry, VariantDescriptor,
};
pub use schema::{StructureKind, StructureSchema};
