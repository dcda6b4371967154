// src/common/coerce.rs

//! Coerção "à la JavaScript" dos campos que chegam de registros antigos.
//!
//! Os dados persistidos foram escritos por várias versões do front-end:
//! preços como string, quantidades ausentes, ids numéricos. Aqui tudo
//! vira um valor bem tipado, e o que não der para interpretar vira zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

/// Converte um valor JSON em número. Falhas (o equivalente a NaN) viram zero.
pub fn to_decimal(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from(u)
            } else {
                n.as_f64().and_then(Decimal::from_f64).unwrap_or(Decimal::ZERO)
            }
        }
        Some(Value::String(s)) => parse_decimal(s),
        Some(Value::Bool(true)) => Decimal::ONE,
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

/// Quantidades são inteiras e nunca negativas: trunca em direção a zero e
/// limita em 0.
pub fn to_quantity(value: Option<&Value>) -> i64 {
    to_decimal(value).trunc().to_i64().unwrap_or(0).max(0)
}

/// Ids opacos: strings não vazias ou números legados.
pub fn to_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

// --- Adaptadores para `#[serde(deserialize_with = ...)]` ---

pub fn de_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(to_decimal(value.as_ref()))
}

pub fn de_opt_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().map(|v| to_decimal(Some(v))))
}

pub fn de_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(to_quantity(value.as_ref()))
}

pub fn de_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(to_decimal(value.as_ref()).to_f64().unwrap_or(0.0))
}

pub fn de_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    to_id(value.as_ref()).ok_or_else(|| D::Error::custom("missing id"))
}

/// Texto opcional: números viram texto, qualquer outra coisa vira `None`.
pub fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_opt_string(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(to_decimal(Some(&json!(10))), Decimal::from(10));
        assert_eq!(to_decimal(Some(&json!("12.50"))), Decimal::from_str("12.50").unwrap());
        assert_eq!(to_decimal(Some(&json!(" 7 "))), Decimal::from(7));
        assert_eq!(to_decimal(Some(&json!(2.5))), Decimal::from_str("2.5").unwrap());
    }

    #[test]
    fn garbage_defaults_to_zero() {
        assert_eq!(to_decimal(Some(&json!("abc"))), Decimal::ZERO);
        assert_eq!(to_decimal(Some(&json!(""))), Decimal::ZERO);
        assert_eq!(to_decimal(Some(&json!(null))), Decimal::ZERO);
        assert_eq!(to_decimal(Some(&json!({"a": 1}))), Decimal::ZERO);
        assert_eq!(to_decimal(None), Decimal::ZERO);
    }

    #[test]
    fn quantities_are_truncated_and_never_negative() {
        assert_eq!(to_quantity(Some(&json!("3"))), 3);
        assert_eq!(to_quantity(Some(&json!(2.9))), 2);
        assert_eq!(to_quantity(Some(&json!(-4))), 0);
        assert_eq!(to_quantity(None), 0);
    }

    #[test]
    fn ids_must_be_non_empty() {
        assert_eq!(to_id(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(to_id(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(to_id(Some(&json!(""))), None);
        assert_eq!(to_id(Some(&json!(null))), None);
    }
}
