pub mod config;

pub use config::{CodecConfig, FhirVersion, RequiredFieldPolicy, SummaryMode, UnknownFieldPolicy};
