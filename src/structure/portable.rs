// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Conversion of backend-native values into portable JSON
//!
//! Backends hand back fixed-width numbers, `ndarray` tensors, tuples and
//! nested maps. [`NativeValue::to_portable`] turns any such tree into plain
//! `serde_json::Value` numbers, arrays and objects.

use ndarray::{ArrayD, Axis};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A value as produced by an OCR backend
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float64(f64),
    Str(String),
    IntArray(ArrayD<i64>),
    FloatArray(ArrayD<f64>),
    Float32Array(ArrayD<f32>),
    Tuple(Vec<NativeValue>),
    Seq(Vec<NativeValue>),
    Map(BTreeMap<String, NativeValue>),
    /// Already portable, passed through untouched
    Json(Value),
}

impl NativeValue {
    /// Recursively convert into portable JSON
    pub fn to_portable(&self) -> Value {
        match self {
            NativeValue::Null => Value::Null,
            NativeValue::Bool(b) => Value::Bool(*b),
            NativeValue::Int(i) => Value::from(*i),
            NativeValue::UInt(u) => Value::from(*u),
            NativeValue::Float32(f) => f32_to_json(*f),
            NativeValue::Float64(f) => f64_to_json(*f),
            NativeValue::Str(s) => Value::String(s.clone()),
            NativeValue::IntArray(array) => array_to_json(array, |v| Value::from(*v)),
            NativeValue::FloatArray(array) => array_to_json(array, |v| f64_to_json(*v)),
            NativeValue::Float32Array(array) => array_to_json(array, |v| f32_to_json(*v)),
            NativeValue::Tuple(items) | NativeValue::Seq(items) => {
                Value::Array(items.iter().map(NativeValue::to_portable).collect())
            }
            NativeValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_portable()))
                    .collect::<Map<String, Value>>(),
            ),
            NativeValue::Json(value) => value.clone(),
        }
    }

    /// Build a map from `(key, value)` pairs
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, NativeValue)>) -> Self {
        NativeValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Non-finite floats have no JSON representation and become `null`
fn f64_to_json(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Widen through the shortest decimal form so `0.95f32` stays `0.95`
fn f32_to_json(f: f32) -> Value {
    if !f.is_finite() {
        return Value::Null;
    }
    let widened = f.to_string().parse::<f64>().unwrap_or(f as f64);
    f64_to_json(widened)
}

fn array_to_json<T, F>(array: &ArrayD<T>, leaf: F) -> Value
where
    T: Clone,
    F: Fn(&T) -> Value + Copy,
{
    if array.ndim() == 0 {
        return array.iter().next().map(leaf).unwrap_or(Value::Null);
    }
    Value::Array(
        array
            .axis_iter(Axis(0))
            .map(|sub| array_to_json(&sub.to_owned(), leaf))
            .collect(),
    )
}

impl Serialize for NativeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_portable().serialize(serializer)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty; $($t:ty),*) => {
        $(impl From<$t> for NativeValue {
            fn from(v: $t) -> Self {
                NativeValue::$variant(<$wide>::from(v))
            }
        })*
    };
}

impl_from_int!(Int, i64; i8, i16, i32, i64);
impl_from_int!(UInt, u64; u8, u16, u32, u64);

impl From<f32> for NativeValue {
    fn from(v: f32) -> Self {
        NativeValue::Float32(v)
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        NativeValue::Float64(v)
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        NativeValue::Bool(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        NativeValue::Str(v.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        NativeValue::Str(v)
    }
}

impl From<ArrayD<i64>> for NativeValue {
    fn from(v: ArrayD<i64>) -> Self {
        NativeValue::IntArray(v)
    }
}

impl From<ArrayD<f32>> for NativeValue {
    fn from(v: ArrayD<f32>) -> Self {
        NativeValue::Float32Array(v)
    }
}

impl From<ArrayD<f64>> for NativeValue {
    fn from(v: ArrayD<f64>) -> Self {
        NativeValue::FloatArray(v)
    }
}

impl From<Value> for NativeValue {
    fn from(v: Value) -> Self {
        NativeValue::Json(v)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(NativeValue::Null)
    }
}

impl<A: Into<NativeValue>, B: Into<NativeValue>> From<(A, B)> for NativeValue {
    fn from((a, b): (A, B)) -> Self {
        NativeValue::Tuple(vec![a.into(), b.into()])
    }
}

impl<T: Into<NativeValue>> From<Vec<T>> for NativeValue {
    fn from(v: Vec<T>) -> Self {
        NativeValue::Seq(v.into_iter().map(Into::into).collect())
    }
}
