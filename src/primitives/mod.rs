//! Primitive value codecs.

pub mod temporal;

use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;

use crate::codec::{DecodeContext, EncodeContext, FhirValue, json_kind};
use crate::error::Result;

pub use temporal::{Date, DateTime, Instant, Precision, Time};

// String-valued primitives share the `String` codec; the aliases document intent.
pub type Base64Binary = String;
pub type Canonical = String;
pub type Code = String;
pub type Id = String;
pub type Markdown = String;
pub type Oid = String;
pub type Uri = String;
pub type Url = String;
pub type Uuid = String;

impl FhirValue for String {
    const TYPE_NAME: &'static str = "string";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match value {
            Value::String(value) => Ok(value),
            other => Err(ctx.malformed(format!("expected a string, found {}", json_kind(&other)))),
        }
    }

    fn encode_value(&self, _ctx: &mut EncodeContext<'_>) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl FhirValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        match value {
            Value::Bool(value) => Ok(value),
            other => Err(ctx.malformed(format!("expected a boolean, found {}", json_kind(&other)))),
        }
    }

    fn encode_value(&self, _ctx: &mut EncodeContext<'_>) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

fn integer(value: &Value, ctx: &DecodeContext<'_>) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| ctx.malformed(format!("`{number}` is not an integer"))),
        other => Err(ctx.malformed(format!("expected an integer, found {}", json_kind(other)))),
    }
}

impl FhirValue for i32 {
    const TYPE_NAME: &'static str = "integer";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        let wide = integer(&value, ctx)?;
        i32::try_from(wide).map_err(|_| ctx.malformed(format!("integer {wide} is out of range")))
    }

    fn encode_value(&self, _ctx: &mut EncodeContext<'_>) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

/// `unsignedInt` and `positiveInt`.
impl FhirValue for u32 {
    const TYPE_NAME: &'static str = "unsignedInt";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        let wide = integer(&value, ctx)?;
        u32::try_from(wide)
            .map_err(|_| ctx.malformed(format!("unsigned integer {wide} is out of range")))
    }

    fn encode_value(&self, _ctx: &mut EncodeContext<'_>) -> Result<Value> {
        Ok(Value::from(*self))
    }
}

/// Most significant digits a [`Decimal`] holds without rounding.
const MAX_DECIMAL_DIGITS: usize = 28;

/// Digits that must be kept to reproduce `text` exactly: integer digits past any
/// leading zeros plus every fractional digit, including trailing zeros.
fn significant_digits(text: &str) -> usize {
    let mantissa = text.split(['e', 'E']).next().unwrap_or_default();
    let unsigned = mantissa.trim_start_matches(['-', '+']);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    integer.trim_start_matches('0').len() + fraction.len()
}

/// Decimals keep their written scale: `1.50` decodes and encodes as `1.50`.
///
/// Values needing more than 28 digits are rejected rather than rounded.
impl FhirValue for Decimal {
    const TYPE_NAME: &'static str = "decimal";

    fn decode_value(value: Value, ctx: &mut DecodeContext<'_>) -> Result<Self> {
        let number = match value {
            Value::Number(number) => number,
            other => {
                return Err(ctx.malformed(format!("expected a decimal, found {}", json_kind(&other))));
            }
        };

        let text = number.to_string();
        if significant_digits(&text) > MAX_DECIMAL_DIGITS {
            return Err(ctx.malformed(format!(
                "`{text}` needs more than {MAX_DECIMAL_DIGITS} digits of precision"
            )));
        }

        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| ctx.malformed(format!("`{text}` is not a representable decimal")))
    }

    fn encode_value(&self, ctx: &mut EncodeContext<'_>) -> Result<Value> {
        Number::from_str(&self.to_string())
            .map(Value::Number)
            .map_err(|_| ctx.malformed(format!("decimal {self} has no JSON form")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodecConfig;
    use crate::types::ResourceTypeRegistry;
    use serde_json::json;

    fn decode<T: FhirValue>(value: Value) -> Result<T> {
        let config = CodecConfig::default();
        let mut ctx = DecodeContext::new(&config, ResourceTypeRegistry::global());
        T::decode_value(value, &mut ctx)
    }

    fn encode<T: FhirValue>(value: &T) -> Value {
        let config = CodecConfig::default();
        let mut ctx = EncodeContext::new(&config, ResourceTypeRegistry::global());
        value.encode_value(&mut ctx).unwrap()
    }

    #[test]
    fn test_decimal_scale_survives() {
        let payload: Value = serde_json::from_str("1.50").unwrap();
        let decimal: Decimal = decode(payload).unwrap();
        assert_eq!(decimal.scale(), 2);
        assert_eq!(serde_json::to_string(&encode(&decimal)).unwrap(), "1.50");
    }

    #[test]
    fn test_decimal_scientific_notation() {
        let payload: Value = serde_json::from_str("1.5e2").unwrap();
        let decimal: Decimal = decode(payload).unwrap();
        assert_eq!(decimal, Decimal::from(150));
    }

    #[test]
    fn test_decimal_precision_limit() {
        assert_eq!(significant_digits("-0.0050"), 4);
        assert_eq!(significant_digits("1200.5e3"), 5);

        let exact: Value = serde_json::from_str("0.1234567890123456789012345678").unwrap();
        let decimal: Decimal = decode(exact).unwrap();
        assert_eq!(decimal.to_string(), "0.1234567890123456789012345678");

        let too_long: Value = serde_json::from_str("0.12345678901234567890123456789012").unwrap();
        assert!(decode::<Decimal>(too_long).unwrap_err().is_malformed());
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(decode::<i32>(json!(-7)).unwrap(), -7);
        assert!(decode::<i32>(json!(4_294_967_296_i64)).unwrap_err().is_malformed());
        assert!(decode::<u32>(json!(-1)).unwrap_err().is_malformed());
        assert!(decode::<i32>(json!(1.5)).unwrap_err().is_malformed());
    }

    #[test]
    fn test_wrong_json_kind() {
        assert!(decode::<String>(json!(12)).unwrap_err().is_malformed());
        assert!(decode::<bool>(json!("true")).unwrap_err().is_malformed());
        assert!(decode::<Date>(json!(2024)).unwrap_err().is_malformed());
    }

    #[test]
    fn test_primitive_validation_toggle() {
        assert!(decode::<Date>(json!("2024-13")).is_err());

        let config = CodecConfig::default().with_primitive_validation(false);
        let mut ctx = DecodeContext::new(&config, ResourceTypeRegistry::global());
        let date = Date::decode_value(json!("2024-13"), &mut ctx).unwrap();
        assert_eq!(date.as_str(), "2024-13");
    }
}
