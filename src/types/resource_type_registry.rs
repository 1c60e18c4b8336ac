use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use super::schema::{StructureKind, StructureSchema};
use crate::error::{FhirCodecError, Result};
use crate::model::{self, Resource, ResourceType};

static GLOBAL_REGISTRY: Lazy<ResourceTypeRegistry> = Lazy::new(|| {
    match RegistryBuilder::with_catalogue() {
        Ok(builder) => builder.build(),
        Err(err) => {
            tracing::error!(error = %err, "built-in catalogue failed to register");
            ResourceTypeRegistry::failed(err.to_string())
        }
    }
});

/// Registered (identity, constructor, schema) triple for one resource shape.
#[derive(Clone, Copy)]
pub struct VariantDescriptor {
    pub resource_type: &'static str,
    pub schema: &'static StructureSchema,
    pub constructor: fn() -> Resource,
}

fn construct<T: ResourceType>() -> Resource {
    T::default().into()
}

impl VariantDescriptor {
    pub const fn of<T: ResourceType>() -> Self {
        Self {
            resource_type: T::RESOURCE_TYPE,
            schema: T::SCHEMA,
            constructor: construct::<T>,
        }
    }

    /// A fresh, empty instance of this variant.
    pub fn instantiate(&self) -> Resource {
        (self.constructor)()
    }
}

impl fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("resource_type", &self.resource_type)
            .field("schema", &self.schema.name)
            .field("fields", &self.schema.fields.len())
            .finish()
    }
}

/// Summary counts over a built registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryMetrics {
    pub variant_count: usize,
    pub domain_resource_count: usize,
    pub choice_field_count: usize,
    pub required_field_count: usize,
}

/// Read-only map from discriminator to variant descriptor.
///
/// Built once through [`RegistryBuilder`] and never mutated afterwards, so lookups
/// from any number of threads need no locking.
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    variants: HashMap<&'static str, VariantDescriptor>,
    metrics: RegistryMetrics,
    build_error: Option<String>,
}

impl ResourceTypeRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Empty registry standing in for a catalogue that failed to register.
    ///
    /// Every miss against it reports `message` as a `Registration` error.
    pub(crate) fn failed(message: String) -> Self {
        Self {
            build_error: Some(message),
            ..Self::default()
        }
    }

    /// Process-wide registry over the built-in catalogue, built on first use.
    ///
    /// If the catalogue failed to register this registry is empty, and lookups
    /// through the codec fail with the original `Registration` error.
    pub fn global() -> &'static ResourceTypeRegistry {
        &GLOBAL_REGISTRY
    }

    /// Like [`global`](Self::global), but surfaces a failed catalogue build up front.
    pub fn try_global() -> Result<&'static ResourceTypeRegistry> {
        let registry = Self::global();
        match &registry.build_error {
            Some(message) => Err(FhirCodecError::Registration {
                message: message.clone(),
            }),
            None => Ok(registry),
        }
    }

    /// Why this registry was left empty, if its build failed.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    /// Error for a discriminator this registry cannot dispatch.
    pub fn unknown_variant(&self, resource_type: &str, path: impl Into<String>) -> FhirCodecError {
        match &self.build_error {
            Some(message) => FhirCodecError::Registration {
                message: message.clone(),
            },
            None => FhirCodecError::UnknownVariant {
                resource_type: resource_type.to_string(),
                path: path.into(),
            },
        }
    }

    /// Exact, case-sensitive lookup by discriminator.
    pub fn lookup(&self, resource_type: &str) -> Option<&VariantDescriptor> {
        self.variants.get(resource_type)
    }

    pub fn instantiate(&self, resource_type: &str) -> Option<Resource> {
        self.lookup(resource_type).map(VariantDescriptor::instantiate)
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.variants.contains_key(resource_type)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Registered discriminators, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.variants.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &VariantDescriptor> {
        self.variants.values()
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }
}

/// Single-threaded build phase of a [`ResourceTypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    variants: HashMap<&'static str, VariantDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder preloaded with every variant of the built-in catalogue.
    pub fn with_catalogue() -> Result<Self> {
        let mut builder = Self::new();
        for descriptor in model::VARIANTS {
            builder.register_variant(*descriptor)?;
        }
        Ok(builder)
    }

    /// Adds one descriptor.
    ///
    /// Rejects duplicates, non-resource schemas, and descriptors whose constructor
    /// yields a different variant than the identity they are registered under.
    pub fn register_variant(&mut self, descriptor: VariantDescriptor) -> Result<&mut Self> {
        if descriptor.resource_type.is_empty() {
            return Err(FhirCodecError::Registration {
                message: "resource type must not be empty".to_string(),
            });
        }

        if self.variants.contains_key(descriptor.resource_type) {
            return Err(FhirCodecError::Registration {
                message: format!("`{}` is already registered", descriptor.resource_type),
            });
        }

        if !descriptor.schema.kind.is_resource() {
            return Err(FhirCodecError::Registration {
                message: format!(
                    "`{}` is a {:?}, not a resource",
                    descriptor.resource_type, descriptor.schema.kind
                ),
            });
        }

        let constructed = descriptor.instantiate();
        if constructed.resource_type() != descriptor.resource_type
            || descriptor.schema.name != descriptor.resource_type
        {
            return Err(FhirCodecError::Registration {
                message: format!(
                    "`{}` constructs `{}` with schema `{}`",
                    descriptor.resource_type,
                    constructed.resource_type(),
                    descriptor.schema.name
                ),
            });
        }

        self.variants.insert(descriptor.resource_type, descriptor);
        Ok(self)
    }

    /// Freezes the builder into a read-only registry.
    pub fn build(self) -> ResourceTypeRegistry {
        let mut metrics = RegistryMetrics {
            variant_count: self.variants.len(),
            ..RegistryMetrics::default()
        };
        for descriptor in self.variants.values() {
            if descriptor.schema.kind == StructureKind::DomainResource {
                metrics.domain_resource_count += 1;
            }
            metrics.choice_field_count += descriptor.schema.choice_fields().count();
            metrics.required_field_count += descriptor.schema.required_fields().count();
        }

        tracing::debug!(variants = metrics.variant_count, "resource type registry built");

        ResourceTypeRegistry {
            variants: self.variants,
            metrics,
            build_error: None,
        }
    }
}
