//! JSON dictionaries on local disk or in a bucket.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::core::models::Location;
use crate::errors::StorageError;
use crate::storage::Storage;
use crate::utils::mime::content_type_for;

/// String-keyed JSON mapping, the default payload of [`Storage::load_dict`].
pub type Dict = serde_json::Map<String, Value>;

/// Options handed to the JSON serializer on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Pretty-print with this many spaces per level; compact when `None`.
    pub indent: Option<usize>,
    /// Emit object keys in sorted order.
    pub sort_keys: bool,
}

impl JsonOptions {
    #[must_use]
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    #[must_use]
    pub fn sort_keys(mut self, sort: bool) -> Self {
        self.sort_keys = sort;
        self
    }
}

/// Serializes `value` to JSON text according to `options`.
///
/// # Errors
///
/// Returns `Serialization` if the value cannot be represented as JSON, e.g. a
/// map with non-string keys.
pub fn to_json_bytes<T: Serialize + ?Sized>(
    value: &T,
    options: &JsonOptions,
) -> Result<Vec<u8>, StorageError> {
    let serialize_err = |e: serde_json::Error| StorageError::Serialization(format!("json: {e}"));

    if options.sort_keys {
        let sorted = sort_value(serde_json::to_value(value).map_err(serialize_err)?);
        return write_json(&sorted, options.indent).map_err(serialize_err);
    }
    write_json(value, options.indent).map_err(serialize_err)
}

fn sort_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_value(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

fn write_json<T: Serialize + ?Sized>(
    value: &T,
    indent: Option<usize>,
) -> Result<Vec<u8>, serde_json::Error> {
    let Some(spaces) = indent else {
        return serde_json::to_vec(value);
    };
    let indent = b" ".repeat(spaces);
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Parses JSON bytes into `T`.
///
/// # Errors
///
/// Returns `MalformedContent` for invalid UTF-8, invalid JSON, or JSON that
/// does not match `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::MalformedContent(format!("json: {e}")))
}

impl Storage {
    /// Reads a JSON document from `location`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing file or key, `MalformedContent` for
    /// unparsable content, or the backend's error.
    pub async fn load_dict<T: DeserializeOwned>(&self, location: &Location) -> Result<T, StorageError> {
        let bytes = self.read_bytes(location).await?;
        from_json_bytes(&bytes).map_err(|e| match e {
            StorageError::MalformedContent(msg) => {
                StorageError::MalformedContent(format!("{location}: {msg}"))
            }
            other => other,
        })
    }

    /// Writes `value` as JSON to `location`, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `value` cannot be encoded, or the backend's error.
    pub async fn save_dict<T: Serialize + ?Sized>(
        &self,
        value: &T,
        location: &Location,
        options: &JsonOptions,
    ) -> Result<(), StorageError> {
        let body = to_json_bytes(value, options)?;
        let content_type = location.file_name().map(content_type_for);
        self.write_bytes(location, body, content_type.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn indent_controls_layout() {
        let value = json!({"a": [1, 2]});
        let compact = to_json_bytes(&value, &JsonOptions::default()).unwrap();
        assert_eq!(compact, br#"{"a":[1,2]}"#);

        let pretty = to_json_bytes(&value, &JsonOptions::default().indent(2)).unwrap();
        assert_eq!(
            String::from_utf8(pretty).unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn sort_keys_orders_struct_fields() {
        #[derive(Serialize)]
        struct Args {
            zeta: u8,
            alpha: u8,
        }
        let args = Args { zeta: 1, alpha: 2 };

        let unsorted = to_json_bytes(&args, &JsonOptions::default()).unwrap();
        assert_eq!(unsorted, br#"{"zeta":1,"alpha":2}"#);

        let sorted = to_json_bytes(&args, &JsonOptions::default().sort_keys(true)).unwrap();
        assert_eq!(sorted, br#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn non_string_keys_fail_to_serialize() {
        let mut map = HashMap::new();
        map.insert(vec![1_u8], 1);
        let err = to_json_bytes(&map, &JsonOptions::default()).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = from_json_bytes::<Dict>(b"{not json").unwrap_err();
        assert!(matches!(err, StorageError::MalformedContent(_)));
    }
}
