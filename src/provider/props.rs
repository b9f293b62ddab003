//! Decoding helpers for declarations.
//!
//! The orchestrator stringifies scalars, so `true` may arrive as `"true"` and
//! `86400` as `"86400"`. These helpers are meant for `deserialize_with`.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    fn into_flag(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Text(text) => text == "true",
            Self::Number(_) => false,
        }
    }

    fn into_number<E: serde::de::Error>(self) -> Result<Number, E> {
        match self {
            Self::Number(number) => Ok(number),
            Self::Text(text) => serde_json::from_str::<Number>(text.trim())
                .map_err(|_| E::custom(format!("expected a number, got {text:?}"))),
            Self::Bool(value) => Err(E::custom(format!("expected a number, got {value}"))),
        }
    }
}

/// `true`, `"true"` → true; anything else → false.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.is_some_and(Scalar::into_flag))
}

/// Like [`flag`] but keeps absence (and `null`) as `None`.
pub fn opt_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_flag))
}

/// Integer given as a number or numeric string.
pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let number = scalar.into_number::<D::Error>()?;

    number
        .as_i64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0)
                .map(|value| value as i64)
        })
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {number}")))
}

/// Float given as a number or numeric string.
pub fn opt_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let Some(scalar) = Option::<Scalar>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let number = scalar.into_number::<D::Error>()?;

    number
        .as_f64()
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("expected a number, got {number}")))
}

/// Required float given as a number or numeric string.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    opt_number(deserializer)?.ok_or_else(|| D::Error::custom("expected a number, got null"))
}

/// Drop `null` members recursively so absent declaration fields stay absent
/// in request bodies.
#[must_use]
pub fn without_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(without_nulls).collect()),
        other => other,
    }
}
