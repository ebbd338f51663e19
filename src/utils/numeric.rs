//! Numeric-aware JSON encoding.
//!
//! `ndarray` arrays serialize through serde as `{"v":1,"dim":[..],"data":[..]}`
//! (when they serialize at all). The encoder here turns numeric scalars into
//! plain JSON numbers and arrays of any dimension into nested lists, so the
//! saved file reads the same as if plain numbers and lists had been written.
//!
//! Use it per value with [`Numeric`], or per field with
//! `#[serde(serialize_with = "storekit::utils::numeric::as_list")]`.

use ndarray::{ArrayBase, ArrayViewD, Data, Dimension};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// Conversion of a numeric value into its plain JSON form.
pub trait NumericJson {
    fn to_json(&self) -> Value;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {
        $(
            impl NumericJson for $t {
                fn to_json(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl NumericJson for f32 {
    fn to_json(&self) -> Value {
        f64::from(*self).to_json()
    }
}

impl NumericJson for f64 {
    fn to_json(&self) -> Value {
        // JSON has no NaN or infinity
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

impl NumericJson for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl<A, S, D> NumericJson for ArrayBase<S, D>
where
    A: NumericJson,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn to_json(&self) -> Value {
        view_to_json(&self.view().into_dyn())
    }
}

fn view_to_json<A: NumericJson>(view: &ArrayViewD<'_, A>) -> Value {
    if view.ndim() == 0 {
        return view.iter().next().map_or(Value::Null, NumericJson::to_json);
    }
    Value::Array(view.outer_iter().map(|row| view_to_json(&row)).collect())
}

/// Wraps a numeric value so it serializes through [`NumericJson`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeric<T>(pub T);

impl<T: NumericJson> Serialize for Numeric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_json().serialize(serializer)
    }
}

/// `serialize_with` hook for struct fields holding numeric values.
///
/// # Errors
///
/// Returns the serializer's error.
pub fn as_list<T: NumericJson, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.to_json().serialize(serializer)
}
