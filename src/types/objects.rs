//! Object-level data models.

use crate::error::Error;
use crate::model::{impl_serde_via_model, Field, FieldWriter, Fields, Model, Schema};

const STATUS_CODE: Field = Field::required("status_code", "status_code");
const MESSAGE: Field = Field::required("message", "message");
const PATH: Field = Field::optional("path", "path");

static OBJECT_ERROR_SCHEMA: Schema =
    Schema::new("ObjectError", &[STATUS_CODE, MESSAGE, PATH]);

/// A single per-object failure reported by a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectError {
    /// HTTP status code associated with the operation on `path`
    pub status_code: i64,
    /// Short message explaining `status_code`
    pub message: String,
    /// Affected path, when the failure concerns a specific object
    pub path: Option<String>,
}

impl ObjectError {
    pub fn new(status_code: i64, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            path: None,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl Model for ObjectError {
    fn schema() -> &'static Schema {
        &OBJECT_ERROR_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            status_code: fields.required_i64(&STATUS_CODE)?,
            message: fields.required_str(&MESSAGE)?,
            path: fields.optional_str(&PATH)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_i64(&STATUS_CODE, self.status_code);
        out.put_str(&MESSAGE, &self.message);
        out.put_opt_str(&PATH, self.path.as_deref());
    }
}

const ERRORS: Field = Field::required("errors", "errors");

static OBJECT_ERROR_LIST_SCHEMA: Schema = Schema::new("ObjectErrorList", &[ERRORS]);

/// Per-object failures of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectErrorList {
    pub errors: Vec<ObjectError>,
}

impl Model for ObjectErrorList {
    fn schema() -> &'static Schema {
        &OBJECT_ERROR_LIST_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            errors: fields.required_list(&ERRORS)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_list(&ERRORS, &self.errors);
    }
}

impl_serde_via_model!(ObjectError, ObjectErrorList);
