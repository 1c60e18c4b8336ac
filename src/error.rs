use thiserror::Error;

#[derive(Error, Debug)]
pub enum FhirCodecError {
    #[error("Malformed payload at {path}: {message}")]
    MalformedPayload { path: String, message: String },

    #[error("Missing discriminator: `resourceType` is absent or empty at {path}")]
    MissingDiscriminator { path: String },

    #[error("Unknown resource type `{resource_type}` at {path}")]
    UnknownVariant { resource_type: String, path: String },

    #[error("Missing required field: {path}")]
    MissingRequiredField { path: String },

    #[error("Ambiguous choice `{base_name}[x]` at {path}: found {}", .suffixes.join(", "))]
    AmbiguousChoice {
        path: String,
        base_name: String,
        suffixes: Vec<String>,
    },

    #[error("Choice `{base_name}[x]` at {path} does not permit type `{suffix}`")]
    UnknownChoiceAlternative {
        path: String,
        base_name: String,
        suffix: String,
    },

    #[error("Unknown field: {path}")]
    UnknownField { path: String },

    #[error("Resource type mismatch: expected `{expected}`, found `{found}`")]
    ResourceTypeMismatch { expected: String, found: String },

    #[error("Registration error: {message}")]
    Registration { message: String },

    #[error("Invalid reference `{reference}`: {message}")]
    InvalidReference { reference: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FhirCodecError {
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// True when the payload itself is not well-formed for the field it was read into.
    ///
    /// An unknown choice suffix counts as malformed input for that field.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedPayload { .. }
                | Self::UnknownChoiceAlternative { .. }
                | Self::Serialization(_)
        )
    }

    /// Element path the error refers to, when it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MalformedPayload { path, .. }
            | Self::MissingDiscriminator { path }
            | Self::UnknownVariant { path, .. }
            | Self::MissingRequiredField { path }
            | Self::AmbiguousChoice { path, .. }
            | Self::UnknownChoiceAlternative { path, .. }
            | Self::UnknownField { path } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FhirCodecError>;
