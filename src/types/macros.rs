//! Declaration macros for the catalogue.
//!
//! One declaration produces the Rust struct, its static [`StructureSchema`](crate::types::StructureSchema)
//! and its codec, so the shape the registry reports and the shape the codec walks can
//! never drift apart.
//!
//! Field lines have the form `name: kind Type = "wireName"`, where `kind` is one of
//! `required`, `optional`, `repeated`, `extensions`, `choice` or `required_choice`.
//! A trailing `[summary]` marks the element as part of the resource summary.

/// Declares a catalogue structure.
///
/// # Usage
/// ```rust,ignore
/// fhir_structure! {
///     /// A human-readable name.
///     element HumanName {
///         use_: optional Code = "use",
///         family: optional String = "family",
///         given: repeated String = "given",
///     }
/// }
/// ```
///
/// The leading keyword picks the base fields that are prepended:
/// `resource` (id, meta, implicitRules, language), `domain_resource` (adds text,
/// contained, extension, modifierExtension), `element` (id, extension) and
/// `backbone` (id, extension, modifierExtension).
#[macro_export]
macro_rules! fhir_structure {
    (
        $(#[$meta:meta])*
        resource $name:ident { $($body:tt)* }
    ) => {
        $crate::fhir_structure! {
            @emit $(#[$meta])* $name, $crate::types::StructureKind::Resource, {
                /// Logical id of this resource.
                id: optional $crate::primitives::Id = "id" [summary],
                meta: optional $crate::model::Meta = "meta" [summary],
                implicit_rules: optional $crate::primitives::Uri = "implicitRules" [summary],
                language: optional $crate::primitives::Code = "language",
                $($body)*
            }
        }

        impl $crate::model::ResourceType for $name {
            const RESOURCE_TYPE: &'static str = stringify!($name);

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> Option<&$crate::model::Meta> {
                self.meta.as_ref()
            }
        }
    };

    (
        $(#[$meta:meta])*
        domain_resource $name:ident { $($body:tt)* }
    ) => {
        $crate::fhir_structure! {
            @emit $(#[$meta])* $name, $crate::types::StructureKind::DomainResource, {
                /// Logical id of this resource.
                id: optional $crate::primitives::Id = "id" [summary],
                meta: optional $crate::model::Meta = "meta" [summary],
                implicit_rules: optional $crate::primitives::Uri = "implicitRules" [summary],
                language: optional $crate::primitives::Code = "language",
                text: optional $crate::model::Narrative = "text",
                /// Inline resources, decoded through the same discriminator dispatch.
                contained: repeated $crate::model::Resource = "contained",
                extension: extensions $crate::model::Extension = "extension",
                modifier_extension: extensions $crate::model::Extension = "modifierExtension",
                $($body)*
            }
        }

        impl $crate::model::ResourceType for $name {
            const RESOURCE_TYPE: &'static str = stringify!($name);

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> Option<&$crate::model::Meta> {
                self.meta.as_ref()
            }

            fn contained(&self) -> &[$crate::model::Resource] {
                &self.contained
            }

            fn extension(&self) -> &[$crate::model::Extension] {
                &self.extension
            }
        }
    };

    (
        $(#[$meta:meta])*
        element $name:ident { $($body:tt)* }
    ) => {
        $crate::fhir_structure! {
            @emit $(#[$meta])* $name, $crate::types::StructureKind::ComplexType, {
                id: optional ::std::string::String = "id",
                extension: extensions $crate::model::Extension = "extension",
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        backbone $name:ident { $($body:tt)* }
    ) => {
        $crate::fhir_structure! {
            @emit $(#[$meta])* $name, $crate::types::StructureKind::BackboneElement, {
                id: optional ::std::string::String = "id",
                extension: extensions $crate::model::Extension = "extension",
                modifier_extension: extensions $crate::model::Extension = "modifierExtension" [summary],
                $($body)*
            }
        }
    };

    (
        @emit $(#[$meta:meta])* $name:ident, $kind:expr, {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $fkind:ident $fty:ty = $wire:literal $([$flag:ident])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $crate::__fhir_field_type!($fkind $fty),
            )*
            /// Members not described by the schema, kept in wire order.
            pub extra: $crate::codec::JsonObject,
        }

        impl $name {
            const FIELDS: &'static [$crate::types::FieldSchema] = &[
                $(
                    $crate::__fhir_field_schema!($fkind $fty, $wire)
                        .with_summary($crate::__fhir_summary_flag!($($flag)?)),
                )*
            ];
        }

        impl $crate::codec::FhirValue for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn decode_value(
                value: ::serde_json::Value,
                ctx: &mut $crate::codec::DecodeContext<'_>,
            ) -> $crate::error::Result<Self> {
                $crate::codec::decode_structure(value, ctx)
            }

            fn encode_value(
                &self,
                ctx: &mut $crate::codec::EncodeContext<'_>,
            ) -> $crate::error::Result<::serde_json::Value> {
                $crate::codec::encode_structure(self, ctx)
            }

            fn is_empty(&self) -> bool {
                *self == Self::default()
            }
        }

        impl $crate::codec::FhirStructure for $name {
            const SCHEMA: &'static $crate::types::StructureSchema = &$crate::types::StructureSchema {
                name: stringify!($name),
                kind: $kind,
                fields: Self::FIELDS,
            };

            fn read_fields(
                &mut self,
                reader: &mut $crate::codec::ObjectReader<'_, '_>,
            ) -> $crate::error::Result<()> {
                $( self.$field = reader.$fkind($wire)?; )*
                self.extra = reader.finish()?;
                Ok(())
            }

            fn write_fields(
                &self,
                writer: &mut $crate::codec::ObjectWriter<'_, '_>,
            ) -> $crate::error::Result<()> {
                $( writer.$fkind($wire, &self.$field)?; )*
                writer.extra(&self.extra);
                Ok(())
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fhir_field_type {
    (required $t:ty) => { $t };
    (optional $t:ty) => { ::std::option::Option<$t> };
    (repeated $t:ty) => { ::std::vec::Vec<$t> };
    (extensions $t:ty) => { ::std::vec::Vec<$t> };
    (choice $t:ty) => { ::std::option::Option<$t> };
    (required_choice $t:ty) => { ::std::option::Option<$t> };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fhir_summary_flag {
    () => { false };
    (summary) => { true };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fhir_field_schema {
    (required $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::scalar(
            $wire,
            $crate::types::FieldKind::Required,
            <$t as $crate::codec::FhirValue>::TYPE_NAME,
        )
    };
    (optional $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::scalar(
            $wire,
            $crate::types::FieldKind::Optional,
            <$t as $crate::codec::FhirValue>::TYPE_NAME,
        )
    };
    (repeated $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::scalar(
            $wire,
            $crate::types::FieldKind::Repeated,
            <$t as $crate::codec::FhirValue>::TYPE_NAME,
        )
    };
    (extensions $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::scalar(
            $wire,
            $crate::types::FieldKind::Extensions,
            <$t as $crate::codec::FhirValue>::TYPE_NAME,
        )
    };
    (choice $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::choice(
            $wire,
            $crate::types::FieldKind::OptionalChoice,
            <$t as $crate::types::ChoiceType>::NAME,
            <$t as $crate::types::ChoiceType>::ALTERNATIVES,
        )
    };
    (required_choice $t:ty, $wire:literal) => {
        $crate::types::FieldSchema::choice(
            $wire,
            $crate::types::FieldKind::RequiredChoice,
            <$t as $crate::types::ChoiceType>::NAME,
            <$t as $crate::types::ChoiceType>::ALTERNATIVES,
        )
    };
}

/// Declares a choice type: one variant per permitted alternative, keyed by wire suffix.
///
/// # Usage
/// ```rust,ignore
/// fhir_choice! {
///     DeceasedChoice {
///         Boolean(bool) = "Boolean",
///         DateTime(DateTime) = "DateTime",
///     }
/// }
/// ```
#[macro_export]
macro_rules! fhir_choice {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident ( $ty:ty ) = $suffix:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        #[allow(clippy::large_enum_variant)]
        pub enum $name {
            $( $variant($ty), )+
        }

        impl $crate::types::ChoiceType for $name {
            const NAME: &'static str = stringify!($name);
            const ALTERNATIVES: &'static [&'static str] = &[$($suffix),+];

            fn suffix(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $suffix, )+
                }
            }

            fn decode_alternative(
                suffix: &str,
                value: ::serde_json::Value,
                ctx: &mut $crate::codec::DecodeContext<'_>,
            ) -> $crate::error::Result<::std::option::Option<Self>> {
                match suffix {
                    $(
                        $suffix => <$ty as $crate::codec::FhirValue>::decode_value(value, ctx)
                            .map(|decoded| Some(Self::$variant(decoded))),
                    )+
                    _ => Ok(None),
                }
            }

            fn encode_alternative(
                &self,
                ctx: &mut $crate::codec::EncodeContext<'_>,
            ) -> $crate::error::Result<::serde_json::Value> {
                match self {
                    $( Self::$variant(value) => $crate::codec::FhirValue::encode_value(value, ctx), )+
                }
            }
        }
    };
}

/// Declares the closed set of resource variants.
///
/// Generates the [`Resource`](crate::model::Resource) sum type, its conversions, and
/// the `VARIANTS` descriptor table the registry is built from.
#[macro_export]
macro_rules! fhir_catalogue {
    ( $( $variant:ident ),+ $(,)? ) => {
        /// A decoded resource of any registered variant.
        #[derive(Debug, Clone, PartialEq)]
        #[allow(clippy::large_enum_variant)]
        pub enum Resource {
            $( $variant($variant), )+
        }

        $(
            impl ::std::convert::From<$variant> for Resource {
                fn from(resource: $variant) -> Self {
                    Resource::$variant(resource)
                }
            }

            impl ::std::convert::TryFrom<Resource> for $variant {
                type Error = $crate::error::FhirCodecError;

                fn try_from(resource: Resource) -> $crate::error::Result<Self> {
                    match resource {
                        Resource::$variant(inner) => Ok(inner),
                        other => Err($crate::error::FhirCodecError::ResourceTypeMismatch {
                            expected: stringify!($variant).to_string(),
                            found: other.resource_type().to_string(),
                        }),
                    }
                }
            }
        )+

        impl Resource {
            /// The discriminator this instance was registered under.
            pub fn resource_type(&self) -> &'static str {
                match self {
                    $( Resource::$variant(_) => <$variant as $crate::model::ResourceType>::RESOURCE_TYPE, )+
                }
            }

            pub fn schema(&self) -> &'static $crate::types::StructureSchema {
                match self {
                    $( Resource::$variant(_) => <$variant as $crate::codec::FhirStructure>::SCHEMA, )+
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $( Resource::$variant(inner) => $crate::model::ResourceType::id(inner), )+
                }
            }

            pub fn meta(&self) -> Option<&$crate::model::Meta> {
                match self {
                    $( Resource::$variant(inner) => $crate::model::ResourceType::meta(inner), )+
                }
            }

            pub fn contained(&self) -> &[Resource] {
                match self {
                    $( Resource::$variant(inner) => $crate::model::ResourceType::contained(inner), )+
                }
            }

            pub fn extension(&self) -> &[$crate::model::Extension] {
                match self {
                    $( Resource::$variant(inner) => $crate::model::ResourceType::extension(inner), )+
                }
            }

            pub fn as_any(&self) -> &dyn ::std::any::Any {
                match self {
                    $( Resource::$variant(inner) => inner, )+
                }
            }

            pub(crate) fn read_fields(
                &mut self,
                reader: &mut $crate::codec::ObjectReader<'_, '_>,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Resource::$variant(inner) => $crate::codec::FhirStructure::read_fields(inner, reader), )+
                }
            }

            pub(crate) fn write_fields(
                &self,
                writer: &mut $crate::codec::ObjectWriter<'_, '_>,
            ) -> $crate::error::Result<()> {
                match self {
                    $( Resource::$variant(inner) => $crate::codec::FhirStructure::write_fields(inner, writer), )+
                }
            }
        }

        /// Descriptor table for every registered variant.
        pub static VARIANTS: &[$crate::types::VariantDescriptor] = &[
            $( $crate::types::VariantDescriptor::of::<$variant>(), )+
        ];
    };
}
