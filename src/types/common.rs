//! Models shared across API groups.

use crate::error::Error;
use crate::model::{impl_serde_via_model, Field, FieldWriter, Fields, Model, Schema};

const HAS_MORE: Field = Field::required("has_more", "has_more");
const NEXT_OFFSET: Field = Field::required("next_offset", "next_offset");
// The wire key `results` is a count; the struct keeps `results` for the items
// of list responses.
const RESULT_COUNT: Field = Field::required("result_count", "results");
const MAX_PER_PAGE: Field = Field::required("max_per_page", "max_per_page");

static PAGINATION_SCHEMA: Schema = Schema::new(
    "Pagination",
    &[HAS_MORE, NEXT_OFFSET, RESULT_COUNT, MAX_PER_PAGE],
);

/// Page metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Next page is available
    pub has_more: bool,
    /// Token used to retrieve the next page
    pub next_offset: String,
    /// Number of values found in the results
    pub result_count: i64,
    /// Maximal number of entries per page
    pub max_per_page: i64,
}

impl Model for Pagination {
    fn schema() -> &'static Schema {
        &PAGINATION_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            has_more: fields.required_bool(&HAS_MORE)?,
            next_offset: fields.required_str(&NEXT_OFFSET)?,
            result_count: fields.required_i64(&RESULT_COUNT)?,
            max_per_page: fields.required_i64(&MAX_PER_PAGE)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_bool(&HAS_MORE, self.has_more);
        out.put_str(&NEXT_OFFSET, &self.next_offset);
        out.put_i64(&RESULT_COUNT, self.result_count);
        out.put_i64(&MAX_PER_PAGE, self.max_per_page);
    }
}

const MESSAGE: Field = Field::required("message", "message");

static API_ERROR_BODY_SCHEMA: Schema = Schema::new("Error", &[MESSAGE]);

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub message: String,
}

impl Model for ApiErrorBody {
    fn schema() -> &'static Schema {
        &API_ERROR_BODY_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            message: fields.required_str(&MESSAGE)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_str(&MESSAGE, &self.message);
    }
}

impl_serde_via_model!(Pagination, ApiErrorBody);
