//! Host-side values and the coercion rules at the script boundary
//!
//! Script → host:
//! - `undefined` → `Undefined`, `null` → `Null`, booleans → `Bool`
//! - integer-valued numbers within ±(2^53 - 1) → `Int`, other numbers
//!   (NaN and infinities included) → `Float`
//! - strings → `String`
//! - arrays of at most [`MAX_ARRAY_LEN`] elements → `Array`, element-wise
//! - plain objects → `Object`, own enumerable string keys
//! - functions, symbols, bigints, longer arrays → coercion error
//!
//! Exceptions thrown while reading (getters, proxies) surface as
//! [`ScriptError::Exception`] carrying the script's message.
//!
//! Host → script is the inverse. `Int` values outside the 32-bit range
//! become script floats; outside ±(2^53 - 1) they are rejected.

use crate::error::{Result, ScriptError};
use rquickjs::{Array, CatchResultExt, Ctx, Object, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nesting limit when reading script values; also stops on cycles.
pub const MAX_DEPTH: usize = 64;

/// Longest array read into the host.
pub const MAX_ARRAY_LEN: usize = 1 << 20;

/// `Number.MAX_SAFE_INTEGER`
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// A script value after it crossed into the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostValue {
    Null,
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<HostValue>),
    Object(BTreeMap<String, HostValue>),
}

impl HostValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Undefined => "undefined",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Int(i) => Some(*i as f64),
            HostValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Int(value.into())
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Int(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Float(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(values: Vec<T>) -> Self {
        HostValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => HostValue::Int(i),
                None => HostValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(map) => HostValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, HostValue::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Name of a script value's type, for error messages.
pub fn type_name(value: &Value<'_>) -> String {
    format!("{:?}", value.type_of()).to_lowercase()
}

/// Surface an exception thrown by script code (a getter, a proxy trap)
/// with the script's own message.
pub(crate) fn caught<'js, T>(ctx: &Ctx<'js>, result: rquickjs::Result<T>) -> Result<T> {
    result.catch(ctx).map_err(|e| ScriptError::Exception {
        message: e.to_string(),
    })
}

/// Read a script value into the host.
pub fn from_js<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> Result<HostValue> {
    from_js_at(ctx, value, 0)
}

fn from_js_at<'js>(ctx: &Ctx<'js>, value: &Value<'js>, depth: usize) -> Result<HostValue> {
    if depth > MAX_DEPTH {
        return Err(ScriptError::Coercion {
            expected: "a value nested at most 64 levels deep",
            found: "a deeper or cyclic structure".to_owned(),
        });
    }

    if value.is_undefined() {
        return Ok(HostValue::Undefined);
    }
    if value.is_null() {
        return Ok(HostValue::Null);
    }
    if let Some(b) = value.as_bool() {
        return Ok(HostValue::Bool(b));
    }
    if let Some(i) = value.as_int() {
        return Ok(HostValue::Int(i.into()));
    }
    if let Some(f) = value.as_float() {
        return Ok(number(f));
    }
    if let Some(s) = value.as_string() {
        return Ok(HostValue::String(s.to_string()?));
    }
    if value.is_function() {
        return Err(ScriptError::Coercion {
            expected: "a host value",
            found: type_name(value),
        });
    }
    if let (Some(array), Some(object)) = (value.as_array(), value.as_object()) {
        // `Array::len` asserts an int length; read it as a plain number.
        let length: Value = caught(ctx, object.get("length"))?;
        let length = length
            .as_int()
            .map(f64::from)
            .or_else(|| length.as_float())
            .unwrap_or(f64::NAN);
        if !(0.0..=MAX_ARRAY_LEN as f64).contains(&length) {
            return Err(ScriptError::Coercion {
                expected: "an array of at most 1048576 elements",
                found: format!("an array of length {length}"),
            });
        }

        let mut items = Vec::new();
        for i in 0..length as usize {
            let item: Value = caught(ctx, array.get(i))?;
            items.push(from_js_at(ctx, &item, depth + 1)?);
        }
        return Ok(HostValue::Array(items));
    }
    if let Some(object) = value.as_object() {
        let mut fields = BTreeMap::new();
        for key in object.keys::<String>() {
            let key = caught(ctx, key)?;
            let item: Value = caught(ctx, object.get(key.as_str()))?;
            fields.insert(key, from_js_at(ctx, &item, depth + 1)?);
        }
        return Ok(HostValue::Object(fields));
    }

    Err(ScriptError::Coercion {
        expected: "a host value",
        found: type_name(value),
    })
}

/// Integer-valued floats in the safe range read back as `Int`.
fn number(f: f64) -> HostValue {
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER as f64 {
        HostValue::Int(f as i64)
    } else {
        HostValue::Float(f)
    }
}

/// Build the script image of a host value.
pub fn to_js<'js>(ctx: &Ctx<'js>, value: &HostValue) -> Result<Value<'js>> {
    let value = match value {
        HostValue::Undefined => Value::new_undefined(ctx.clone()),
        HostValue::Null => Value::new_null(ctx.clone()),
        HostValue::Bool(b) => Value::new_bool(ctx.clone(), *b),
        HostValue::Int(i) => match i32::try_from(*i) {
            Ok(small) => Value::new_int(ctx.clone(), small),
            Err(_) if i.unsigned_abs() <= MAX_SAFE_INTEGER as u64 => {
                Value::new_float(ctx.clone(), *i as f64)
            }
            Err(_) => {
                return Err(ScriptError::Coercion {
                    expected: "an integer within ±(2^53 - 1)",
                    found: i.to_string(),
                })
            }
        },
        HostValue::Float(f) => Value::new_float(ctx.clone(), *f),
        HostValue::String(s) => rquickjs::String::from_str(ctx.clone(), s)?.into_value(),
        HostValue::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (i, item) in items.iter().enumerate() {
                array.set(i, to_js(ctx, item)?)?;
            }
            array.into_value()
        }
        HostValue::Object(fields) => {
            let object = Object::new(ctx.clone())?;
            for (key, item) in fields {
                object.set(key.as_str(), to_js(ctx, item)?)?;
            }
            object.into_value()
        }
    };
    Ok(value)
}
