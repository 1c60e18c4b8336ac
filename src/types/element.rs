// Field-level schema: how one member of a structure is carried on the wire

use serde::Serialize;
use std::fmt;

/// Shape of a single field in a structure's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldKind {
    Required,
    Optional,
    Repeated,
    RequiredChoice,
    OptionalChoice,
    /// `extension` / `modifierExtension`: an ordered list of (url, value) pairs.
    Extensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: Option<u32>, // None means unbounded
}

impl Cardinality {
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

impl FieldKind {
    pub const fn cardinality(self) -> Cardinality {
        match self {
            Self::Required | Self::RequiredChoice => Cardinality::new(1, Some(1)),
            Self::Optional | Self::OptionalChoice => Cardinality::new(0, Some(1)),
            Self::Repeated | Self::Extensions => Cardinality::new(0, None),
        }
    }

    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required | Self::RequiredChoice)
    }

    pub const fn is_choice(self) -> bool {
        matches!(self, Self::RequiredChoice | Self::OptionalChoice)
    }

    pub const fn is_repeated(self) -> bool {
        matches!(self, Self::Repeated | Self::Extensions)
    }
}

/// One entry of a structure's ordered field schema.
///
/// For choice fields `name` is the base name (`onset`) and `alternatives`
/// lists the permitted type suffixes (`DateTime`, `Age`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub type_name: &'static str,
    pub alternatives: &'static [&'static str],
    /// Included when encoding in [`SummaryMode::True`](crate::core::SummaryMode::True).
    pub summary: bool,
}

impl FieldSchema {
    pub const fn scalar(name: &'static str, kind: FieldKind, type_name: &'static str) -> Self {
        Self {
            name,
            kind,
            type_name,
            alternatives: &[],
            summary: false,
        }
    }

    pub const fn choice(
        name: &'static str,
        kind: FieldKind,
        type_name: &'static str,
        alternatives: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind,
            type_name,
            alternatives,
            summary: false,
        }
    }

    pub const fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    pub fn cardinality(&self) -> Cardinality {
        self.kind.cardinality()
    }

    /// Wire keys this field may appear under.
    pub fn wire_keys(&self) -> Vec<String> {
        if self.kind.is_choice() {
            self.alternatives
                .iter()
                .map(|suffix| format!("{}{}", self.name, suffix))
                .collect()
        } else {
            vec![self.name.to_string()]
        }
    }

    pub fn permits(&self, suffix: &str) -> bool {
        self.alternatives.contains(&suffix)
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_choice() {
            write!(
                f,
                "{}[x] {} ({})",
                self.name,
                self.cardinality(),
                self.alternatives.join("|")
            )
        } else {
            write!(f, "{} {} {}", self.name, self.cardinality(), self.type_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_by_kind() {
        assert_eq!(FieldKind::Required.cardinality().to_string(), "1..1");
        assert_eq!(FieldKind::OptionalChoice.cardinality().to_string(), "0..1");
        assert_eq!(FieldKind::Extensions.cardinality().to_string(), "0..*");
        assert!(FieldKind::RequiredChoice.is_required());
        assert!(FieldKind::RequiredChoice.is_choice());
        assert!(!FieldKind::Repeated.is_choice());
    }

    #[test]
    fn test_choice_wire_keys() {
        let field = FieldSchema::choice(
            "deceased",
            FieldKind::OptionalChoice,
            "DeceasedChoice",
            &["Boolean", "DateTime"],
        );
        assert_eq!(field.wire_keys(), vec!["deceasedBoolean", "deceasedDateTime"]);
        assert!(field.permits("Boolean"));
        assert!(!field.permits("boolean"));
        assert_eq!(field.to_string(), "deceased[x] 0..1 (Boolean|DateTime)");
    }
}
