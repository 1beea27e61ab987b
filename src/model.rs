//! Validated payload records.
//!
//! Every API model is a plain struct plus a static [`Schema`] that lists its
//! fields with their internal and wire names. [`Model`] builds on that table:
//! construction from untyped JSON checks structure, presence of required
//! fields and strict field types; serialization emits only present fields
//! under their wire names.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::Error;

/// One declared field of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name used by the Rust struct.
    pub name: &'static str,
    /// Name used on the wire.
    pub wire: &'static str,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, wire: &'static str) -> Self {
        Self {
            name,
            wire,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, wire: &'static str) -> Self {
        Self {
            name,
            wire,
            required: false,
        }
    }
}

/// Field table of a model, mapping internal names to wire names and back.
#[derive(Debug)]
pub struct Schema {
    pub model: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub const fn new(model: &'static str, fields: &'static [Field]) -> Self {
        Self { model, fields }
    }

    /// Wire name for an internal field name.
    #[must_use]
    pub fn wire(&self, name: &str) -> Option<&'static str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.wire)
    }

    /// Internal field name for a wire name.
    #[must_use]
    pub fn internal(&self, wire: &str) -> Option<&'static str> {
        self.fields.iter().find(|f| f.wire == wire).map(|f| f.name)
    }

    pub fn required(&self) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// Closed set of string literals accepted for an enum-typed field.
pub trait WireEnum: Sized + Copy {
    /// All accepted wire literals.
    const ALLOWED: &'static [&'static str];

    fn as_wire(self) -> &'static str;

    fn from_wire(value: &str) -> Option<Self>;
}

/// A validated, serializable API payload.
pub trait Model: Sized {
    fn schema() -> &'static Schema;

    /// Read the declared fields. Required fields are known to be present.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when a field has the wrong type.
    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error>;

    fn write_fields(&self, out: &mut FieldWriter);

    /// Construct from untyped JSON.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for non-object input, `Validation` for a missing or
    /// mistyped field.
    fn from_value(value: &Value) -> Result<Self, Error> {
        let schema = Self::schema();
        let map = value.as_object().ok_or(Error::TypeMismatch {
            model: schema.model,
            expected: "object",
            found: json_kind(value),
        })?;

        for field in schema.required() {
            if map.get(field.wire).map_or(true, Value::is_null) {
                return Err(Error::validation(
                    schema.model,
                    field.wire,
                    "field is required",
                ));
            }
        }

        Self::from_fields(&Fields { schema, map })
    }

    /// Structured output holding only present fields, keyed by wire name.
    fn to_value(&self) -> Value {
        let mut out = FieldWriter::default();
        self.write_fields(&mut out);
        Value::Object(out.map)
    }

    /// Parse a single JSON text.
    ///
    /// # Errors
    ///
    /// `Decode` for malformed text, otherwise as [`Model::from_value`].
    fn from_json(text: &str) -> Result<Self, Error> {
        Self::from_json_slice(text.as_bytes())
    }

    /// Parse a JSON document from raw bytes.
    ///
    /// # Errors
    ///
    /// `Decode` for malformed text, otherwise as [`Model::from_value`].
    fn from_json_slice(bytes: &[u8]) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(bytes).map_err(|source| Error::Decode {
            model: Self::schema().model,
            source,
        })?;
        Self::from_value(&value)
    }

    /// Compact JSON text. Keys are sorted, so the output is stable.
    fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

/// Read access to the fields of one JSON object, checked against a schema.
pub struct Fields<'a> {
    schema: &'static Schema,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn get(&self, field: &Field) -> Option<&'a Value> {
        self.map.get(field.wire).filter(|v| !v.is_null())
    }

    fn present(&self, field: &Field) -> Result<&'a Value, Error> {
        self.get(field)
            .ok_or_else(|| Error::validation(self.schema.model, field.wire, "field is required"))
    }

    fn mistyped(&self, field: &Field, expected: &str, value: &Value) -> Error {
        Error::validation(
            self.schema.model,
            field.wire,
            format!("expected {expected}, found {}", json_kind(value)),
        )
    }

    fn as_str(&self, field: &Field, value: &'a Value) -> Result<String, Error> {
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| self.mistyped(field, "string", value))
    }

    fn as_i64(&self, field: &Field, value: &Value) -> Result<i64, Error> {
        // Strict: 404.0 and "404" are both rejected.
        if let Some(n) = value.as_i64() {
            return Ok(n);
        }
        if value.is_u64() {
            return Err(Error::validation(
                self.schema.model,
                field.wire,
                format!("integer {value} out of i64 range"),
            ));
        }
        Err(self.mistyped(field, "integer", value))
    }

    fn as_datetime(&self, field: &Field, value: &Value) -> Result<DateTime<Utc>, Error> {
        let text = value
            .as_str()
            .ok_or_else(|| self.mistyped(field, "RFC 3339 date-time string", value))?;
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                Error::validation(
                    self.schema.model,
                    field.wire,
                    format!("invalid date-time `{text}`: {e}"),
                )
            })
    }

    fn as_enum<E: WireEnum>(&self, field: &Field, value: &Value) -> Result<E, Error> {
        let text = value
            .as_str()
            .ok_or_else(|| self.mistyped(field, "string", value))?;
        E::from_wire(text).ok_or_else(|| {
            Error::validation(
                self.schema.model,
                field.wire,
                format!("`{text}` is not one of {}", E::ALLOWED.join(", ")),
            )
        })
    }

    fn as_model<M: Model>(&self, field: &Field, value: &Value) -> Result<M, Error> {
        M::from_value(value).map_err(|e| nest(self.schema.model, field.wire, e))
    }

    pub fn required_str(&self, field: &Field) -> Result<String, Error> {
        let value = self.present(field)?;
        self.as_str(field, value)
    }

    pub fn optional_str(&self, field: &Field) -> Result<Option<String>, Error> {
        self.get(field).map(|v| self.as_str(field, v)).transpose()
    }

    pub fn required_i64(&self, field: &Field) -> Result<i64, Error> {
        let value = self.present(field)?;
        self.as_i64(field, value)
    }

    pub fn optional_i64(&self, field: &Field) -> Result<Option<i64>, Error> {
        self.get(field).map(|v| self.as_i64(field, v)).transpose()
    }

    pub fn required_bool(&self, field: &Field) -> Result<bool, Error> {
        let value = self.present(field)?;
        value
            .as_bool()
            .ok_or_else(|| self.mistyped(field, "boolean", value))
    }

    pub fn required_datetime(&self, field: &Field) -> Result<DateTime<Utc>, Error> {
        let value = self.present(field)?;
        self.as_datetime(field, value)
    }

    pub fn optional_datetime(&self, field: &Field) -> Result<Option<DateTime<Utc>>, Error> {
        self.get(field)
            .map(|v| self.as_datetime(field, v))
            .transpose()
    }

    pub fn required_enum<E: WireEnum>(&self, field: &Field) -> Result<E, Error> {
        let value = self.present(field)?;
        self.as_enum(field, value)
    }

    pub fn optional_enum<E: WireEnum>(&self, field: &Field) -> Result<Option<E>, Error> {
        self.get(field).map(|v| self.as_enum(field, v)).transpose()
    }

    pub fn required_model<M: Model>(&self, field: &Field) -> Result<M, Error> {
        let value = self.present(field)?;
        self.as_model(field, value)
    }

    pub fn required_list<M: Model>(&self, field: &Field) -> Result<Vec<M>, Error> {
        let value = self.present(field)?;
        let items = value
            .as_array()
            .ok_or_else(|| self.mistyped(field, "array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                M::from_value(item)
                    .map_err(|e| nest(self.schema.model, &format!("{}[{i}]", field.wire), e))
            })
            .collect()
    }

    /// Wire keys present in the input that the schema does not declare.
    pub fn undeclared(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.map
            .keys()
            .map(String::as_str)
            .filter(|k| self.schema.internal(k).is_none())
    }
}

/// Builds the structured output of a model.
///
/// Absent optional values are skipped, never written as `null`.
#[derive(Default)]
pub struct FieldWriter {
    map: Map<String, Value>,
}

impl FieldWriter {
    pub fn put_str(&mut self, field: &Field, value: &str) {
        self.map
            .insert(field.wire.to_string(), Value::String(value.to_string()));
    }

    pub fn put_opt_str(&mut self, field: &Field, value: Option<&str>) {
        if let Some(v) = value {
            self.put_str(field, v);
        }
    }

    pub fn put_i64(&mut self, field: &Field, value: i64) {
        self.map.insert(field.wire.to_string(), Value::from(value));
    }

    pub fn put_bool(&mut self, field: &Field, value: bool) {
        self.map.insert(field.wire.to_string(), Value::Bool(value));
    }

    pub fn put_datetime(&mut self, field: &Field, value: &DateTime<Utc>) {
        self.put_str(field, &value.to_rfc3339_opts(SecondsFormat::AutoSi, true));
    }

    pub fn put_opt_datetime(&mut self, field: &Field, value: Option<&DateTime<Utc>>) {
        if let Some(v) = value {
            self.put_datetime(field, v);
        }
    }

    pub fn put_enum<E: WireEnum>(&mut self, field: &Field, value: E) {
        self.put_str(field, value.as_wire());
    }

    pub fn put_opt_enum<E: WireEnum>(&mut self, field: &Field, value: Option<E>) {
        if let Some(v) = value {
            self.put_enum(field, v);
        }
    }

    pub fn put_model<M: Model>(&mut self, field: &Field, value: &M) {
        self.map.insert(field.wire.to_string(), value.to_value());
    }

    pub fn put_list<M: Model>(&mut self, field: &Field, values: &[M]) {
        let items = values.iter().map(Model::to_value).collect();
        self.map.insert(field.wire.to_string(), Value::Array(items));
    }
}

/// JSON kind name used in error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Re-home an error raised by a nested model onto the outer field path.
fn nest(model: &'static str, path: &str, error: Error) -> Error {
    match error {
        Error::Validation { field, reason, .. } => {
            Error::validation(model, format!("{path}.{field}"), reason)
        }
        Error::TypeMismatch {
            expected, found, ..
        } => Error::validation(model, path, format!("expected {expected}, found {found}")),
        other => other,
    }
}

/// Implement `serde::Serialize`/`Deserialize` through [`Model`], so models
/// nested in user types get the same validation.
macro_rules! impl_serde_via_model {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serde::Serialize::serialize(&$crate::model::Model::to_value(self), serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                    <$ty as $crate::model::Model>::from_value(&value).map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

pub(crate) use impl_serde_via_model;
