use serde::Serialize;
use std::fmt;

use super::choice_types::split_choice_key;
use super::element::{FieldKind, FieldSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StructureKind {
    /// A resource without narrative or contained resources (Bundle, Parameters).
    Resource,
    DomainResource,
    ComplexType,
    BackboneElement,
}

impl StructureKind {
    pub fn is_resource(self) -> bool {
        matches!(self, Self::Resource | Self::DomainResource)
    }
}

/// Static description of one structure: its name and ordered field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StructureSchema {
    pub name: &'static str,
    pub kind: StructureKind,
    pub fields: &'static [FieldSchema],
}

impl StructureSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.kind.is_required())
    }

    pub fn choice_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.kind.is_choice())
    }

    /// True if `key` is the exact wire name of a non-choice field.
    pub fn is_plain_member(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|field| !field.kind.is_choice() && field.name == key)
    }

    /// Maps a wire key to its field and, for choice fields, the chosen suffix.
    pub fn resolve_member<'k>(&self, key: &'k str) -> Option<(&FieldSchema, Option<&'k str>)> {
        if let Some(field) = self
            .fields
            .iter()
            .find(|field| !field.kind.is_choice() && field.name == key)
        {
            return Some((field, None));
        }

        self.choice_fields().find_map(|field| {
            split_choice_key(key, field.name)
                .filter(|suffix| field.permits(suffix))
                .map(|suffix| (field, Some(suffix)))
        })
    }

    pub fn declares_member(&self, key: &str) -> bool {
        self.resolve_member(key).is_some()
    }

    /// Wire names of the elements flagged as summary elements, in schema order.
    pub fn summary_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|field| field.summary)
            .map(|field| field.name)
    }

    pub fn count_kind(&self, kind: FieldKind) -> usize {
        self.fields.iter().filter(|field| field.kind == kind).count()
    }
}

impl fmt::Display for StructureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}, {} fields)", self.name, self.kind, self.fields.len())
    }
}
