//! Pull request-related data models.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::model::{
    impl_serde_via_model, Field, FieldWriter, Fields, Model, Schema, WireEnum,
};
use crate::types::common::Pagination;

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullRequestStatus {
    Open,
    Closed,
    Merged,
}

impl PullRequestStatus {
    /// `merged` is final; nothing leaves it.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Merged
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || (self == Self::Open && next != Self::Open)
    }
}

impl WireEnum for PullRequestStatus {
    const ALLOWED: &'static [&'static str] = &["open", "closed", "merged"];

    fn as_wire(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "merged" => Some(Self::Merged),
            _ => None,
        }
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// State filter accepted by the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullRequestsState {
    Open,
    Closed,
    #[default]
    All,
}

impl WireEnum for PullRequestsState {
    const ALLOWED: &'static [&'static str] = &["open", "closed", "all"];

    fn as_wire(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

const ID: Field = Field::required("id", "id");
const STATUS: Field = Field::required("status", "status");
const TITLE: Field = Field::required("title", "title");
const DESCRIPTION: Field = Field::required("description", "description");
const AUTHOR: Field = Field::required("author", "author");
const SOURCE_BRANCH: Field = Field::required("source_branch", "source_branch");
const DESTINATION_BRANCH: Field = Field::required("destination_branch", "destination_branch");
const CREATION_DATE: Field = Field::required("creation_date", "creation_date");
const CLOSED_DATE: Field = Field::optional("closed_date", "closed_date");
const MERGED_COMMIT_ID: Field = Field::optional("merged_commit_id", "merged_commit_id");

static PULL_REQUEST_SCHEMA: Schema = Schema::new(
    "PullRequest",
    &[
        ID,
        STATUS,
        TITLE,
        DESCRIPTION,
        AUTHOR,
        SOURCE_BRANCH,
        DESTINATION_BRANCH,
        CREATION_DATE,
        CLOSED_DATE,
        MERGED_COMMIT_ID,
    ],
);

/// Pull request information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Server-assigned identifier
    pub id: String,
    pub status: PullRequestStatus,
    pub title: String,
    pub description: String,
    /// User who opened the pull request
    pub author: String,
    pub source_branch: String,
    pub destination_branch: String,
    pub creation_date: DateTime<Utc>,
    /// When the pull request was closed or merged
    pub closed_date: Option<DateTime<Utc>>,
    /// Commit created by the merge, if merged
    pub merged_commit_id: Option<String>,
}

impl Model for PullRequest {
    fn schema() -> &'static Schema {
        &PULL_REQUEST_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            id: fields.required_str(&ID)?,
            status: fields.required_enum(&STATUS)?,
            title: fields.required_str(&TITLE)?,
            description: fields.required_str(&DESCRIPTION)?,
            author: fields.required_str(&AUTHOR)?,
            source_branch: fields.required_str(&SOURCE_BRANCH)?,
            destination_branch: fields.required_str(&DESTINATION_BRANCH)?,
            creation_date: fields.required_datetime(&CREATION_DATE)?,
            closed_date: fields.optional_datetime(&CLOSED_DATE)?,
            merged_commit_id: fields.optional_str(&MERGED_COMMIT_ID)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_str(&ID, &self.id);
        out.put_enum(&STATUS, self.status);
        out.put_str(&TITLE, &self.title);
        out.put_str(&DESCRIPTION, &self.description);
        out.put_str(&AUTHOR, &self.author);
        out.put_str(&SOURCE_BRANCH, &self.source_branch);
        out.put_str(&DESTINATION_BRANCH, &self.destination_branch);
        out.put_datetime(&CREATION_DATE, &self.creation_date);
        out.put_opt_datetime(&CLOSED_DATE, self.closed_date.as_ref());
        out.put_opt_str(&MERGED_COMMIT_ID, self.merged_commit_id.as_deref());
    }
}

const CREATION_TITLE: Field = Field::required("title", "title");
const CREATION_DESCRIPTION: Field = Field::optional("description", "description");

static PULL_REQUEST_CREATION_SCHEMA: Schema = Schema::new(
    "PullRequestCreation",
    &[
        CREATION_TITLE,
        CREATION_DESCRIPTION,
        SOURCE_BRANCH,
        DESTINATION_BRANCH,
    ],
);

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCreation {
    pub title: String,
    pub description: Option<String>,
    pub source_branch: String,
    pub destination_branch: String,
}

impl PullRequestCreation {
    pub fn new(
        title: impl Into<String>,
        source_branch: impl Into<String>,
        destination_branch: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            source_branch: source_branch.into(),
            destination_branch: destination_branch.into(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Model for PullRequestCreation {
    fn schema() -> &'static Schema {
        &PULL_REQUEST_CREATION_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            title: fields.required_str(&CREATION_TITLE)?,
            description: fields.optional_str(&CREATION_DESCRIPTION)?,
            source_branch: fields.required_str(&SOURCE_BRANCH)?,
            destination_branch: fields.required_str(&DESTINATION_BRANCH)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_str(&CREATION_TITLE, &self.title);
        out.put_opt_str(&CREATION_DESCRIPTION, self.description.as_deref());
        out.put_str(&SOURCE_BRANCH, &self.source_branch);
        out.put_str(&DESTINATION_BRANCH, &self.destination_branch);
    }
}

static PULL_REQUEST_CREATION_RESPONSE_SCHEMA: Schema =
    Schema::new("PullRequestCreationResponse", &[ID]);

/// Response of a create request: the server-assigned identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCreationResponse {
    pub id: String,
}

impl Model for PullRequestCreationResponse {
    fn schema() -> &'static Schema {
        &PULL_REQUEST_CREATION_RESPONSE_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            id: fields.required_str(&ID)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_str(&ID, &self.id);
    }
}

const PATCH_STATUS: Field = Field::optional("status", "status");
const PATCH_TITLE: Field = Field::optional("title", "title");
const PATCH_DESCRIPTION: Field = Field::optional("description", "description");

static PULL_REQUEST_BASIC_SCHEMA: Schema = Schema::new(
    "PullRequestBasic",
    &[PATCH_STATUS, PATCH_TITLE, PATCH_DESCRIPTION],
);

/// Wire keys of a pull request that no update may touch.
pub const IMMUTABLE_FIELDS: &[&str] = &[
    "id",
    "author",
    "source_branch",
    "destination_branch",
    "creation_date",
];

/// Partial update of a pull request. Unset fields are left unchanged.
///
/// The fields are public, so a patch asking for `merged` can be built, and
/// it still serializes. [`PullRequestBasic::validate`] and
/// [`Model::from_value`] reject it, so only patches that pass `validate`
/// survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PullRequestBasic {
    pub status: Option<PullRequestStatus>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PullRequestBasic {
    #[must_use]
    pub fn with_status(mut self, status: PullRequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the patch against what clients may change.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when the patch requests `merged`; merging
    /// is its own operation.
    pub fn validate(&self) -> Result<(), Error> {
        if self.status == Some(PullRequestStatus::Merged) {
            return Err(Error::validation(
                PULL_REQUEST_BASIC_SCHEMA.model,
                PATCH_STATUS.wire,
                "status cannot be set to `merged` by an update",
            ));
        }
        Ok(())
    }
}

impl Model for PullRequestBasic {
    fn schema() -> &'static Schema {
        &PULL_REQUEST_BASIC_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        let immutable = fields
            .undeclared()
            .find(|k| IMMUTABLE_FIELDS.iter().any(|f| f == k));
        if let Some(key) = immutable {
            return Err(Error::validation(
                PULL_REQUEST_BASIC_SCHEMA.model,
                key,
                "field is immutable and cannot be updated",
            ));
        }

        let patch = Self {
            status: fields.optional_enum(&PATCH_STATUS)?,
            title: fields.optional_str(&PATCH_TITLE)?,
            description: fields.optional_str(&PATCH_DESCRIPTION)?,
        };
        patch.validate()?;
        Ok(patch)
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_opt_enum(&PATCH_STATUS, self.status);
        out.put_opt_str(&PATCH_TITLE, self.title.as_deref());
        out.put_opt_str(&PATCH_DESCRIPTION, self.description.as_deref());
    }
}

const PAGINATION: Field = Field::required("pagination", "pagination");
const RESULTS: Field = Field::required("results", "results");

static PULL_REQUESTS_LIST_SCHEMA: Schema =
    Schema::new("PullRequestsList", &[PAGINATION, RESULTS]);

/// One page of pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestsList {
    pub pagination: Pagination,
    pub results: Vec<PullRequest>,
}

impl Model for PullRequestsList {
    fn schema() -> &'static Schema {
        &PULL_REQUESTS_LIST_SCHEMA
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self, Error> {
        Ok(Self {
            pagination: fields.required_model(&PAGINATION)?,
            results: fields.required_list(&RESULTS)?,
        })
    }

    fn write_fields(&self, out: &mut FieldWriter) {
        out.put_model(&PAGINATION, &self.pagination);
        out.put_list(&RESULTS, &self.results);
    }
}

impl_serde_via_model!(
    PullRequest,
    PullRequestCreation,
    PullRequestCreationResponse,
    PullRequestBasic,
    PullRequestsList,
);

/// Maximum page size accepted by the list operation.
pub const MAX_LIST_AMOUNT: u32 = 1000;

/// Query parameters of the list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPullRequestsParams {
    /// Return items prefixed with this value
    pub prefix: Option<String>,
    /// Return items after this value
    pub after: Option<String>,
    /// How many items to return per page
    pub amount: Option<u32>,
    /// Sent as the `status` query parameter
    pub status: Option<PullRequestsState>,
}

impl ListPullRequestsParams {
    #[must_use]
    pub fn with_status(mut self, status: PullRequestsState) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Render as query pairs.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when `amount` is outside `1..=1000`.
    pub fn to_query(&self) -> Result<Vec<(String, String)>, Error> {
        let mut query = Vec::new();
        if let Some(prefix) = &self.prefix {
            query.push(("prefix".to_string(), prefix.clone()));
        }
        if let Some(after) = &self.after {
            query.push(("after".to_string(), after.clone()));
        }
        if let Some(amount) = self.amount {
            if !(1..=MAX_LIST_AMOUNT).contains(&amount) {
                return Err(Error::validation(
                    "ListPullRequestsParams",
                    "amount",
                    format!("must be between 1 and {MAX_LIST_AMOUNT}, got {amount}"),
                ));
            }
            query.push(("amount".to_string(), amount.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status".to_string(), status.as_wire().to_string()));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn pull_request_json() -> serde_json::Value {
        json!({
            "id": "pr-123",
            "status": "open",
            "title": "Add daily partitions",
            "description": "Backfills 2024-01",
            "author": "etl-bot",
            "source_branch": "feature/partitions",
            "destination_branch": "main",
            "creation_date": "2024-01-15T10:30:00Z"
        })
    }

    #[test]
    fn test_pull_request_deserialize() {
        let pr = PullRequest::from_value(&pull_request_json()).expect("Should construct");

        assert_eq!(pr.id, "pr-123");
        assert_eq!(pr.status, PullRequestStatus::Open);
        assert_eq!(pr.source_branch, "feature/partitions");
        assert_eq!(
            pr.creation_date,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
        assert_eq!(pr.closed_date, None);
        assert_eq!(pr.merged_commit_id, None);
        assert_eq!(pr.to_value(), pull_request_json());
    }

    #[test]
    fn test_pull_request_with_offset_date_normalizes_to_utc() {
        let mut input = pull_request_json();
        input["creation_date"] = json!("2024-01-15T12:30:00+02:00");
        let pr = PullRequest::from_value(&input).expect("Should construct");

        assert_eq!(pr.to_value()["creation_date"], json!("2024-01-15T10:30:00Z"));
    }

    #[test]
    fn test_pull_request_rejects_unknown_status() {
        let mut input = pull_request_json();
        input["status"] = json!("draft");
        let err = PullRequest::from_value(&input).unwrap_err();

        assert_eq!(err.field(), Some("status"));
        assert!(err.to_string().contains("open, closed, merged"));
    }

    #[test]
    fn test_pull_request_rejects_bad_date() {
        let mut input = pull_request_json();
        input["creation_date"] = json!("yesterday");
        let err = PullRequest::from_value(&input).unwrap_err();
        assert_eq!(err.field(), Some("creation_date"));
    }

    #[test]
    fn test_status_transitions() {
        use PullRequestStatus::{Closed, Merged, Open};

        assert!(Open.can_transition_to(Closed));
        assert!(Open.can_transition_to(Merged));
        assert!(Closed.can_transition_to(Closed));
        assert!(!Closed.can_transition_to(Open));
        assert!(!Merged.can_transition_to(Open));
        assert!(!Merged.can_transition_to(Closed));
        assert!(Merged.is_terminal());
        assert!(!Closed.is_terminal());
    }

    #[test]
    fn test_creation_omits_absent_description() {
        let body = PullRequestCreation::new("Title", "feature", "main");
        assert_eq!(
            body.to_value(),
            json!({"title": "Title", "source_branch": "feature", "destination_branch": "main"})
        );

        let body = body.with_description("details");
        assert_eq!(body.to_value()["description"], json!("details"));
    }

    #[test]
    fn test_patch_rejects_branch_endpoints() {
        for key in ["source_branch", "destination_branch", "id"] {
            let mut input = json!({"title": "new title"});
            input[key] = json!("other");
            let err = PullRequestBasic::from_value(&input).unwrap_err();

            assert!(err.is_validation());
            assert_eq!(err.field(), Some(key));
        }
    }

    #[test]
    fn test_patch_rejects_merged_status() {
        let err = PullRequestBasic::from_value(&json!({"status": "merged"})).unwrap_err();
        assert_eq!(err.field(), Some("status"));

        let typed = PullRequestBasic::default().with_status(PullRequestStatus::Merged);
        assert!(typed.validate().is_err());
    }

    #[test]
    fn test_merged_patch_serializes_but_does_not_round_trip() {
        let typed = PullRequestBasic::default()
            .with_status(PullRequestStatus::Merged)
            .with_title("done");
        let value = typed.to_value();
        assert_eq!(value, json!({"status": "merged", "title": "done"}));

        let err = PullRequestBasic::from_value(&value).unwrap_err();
        assert_eq!(err.field(), Some("status"));
    }

    #[test]
    fn test_patch_close() {
        let patch = PullRequestBasic::from_value(&json!({"status": "closed"}))
            .expect("Should construct");
        assert_eq!(patch.status, Some(PullRequestStatus::Closed));
        assert_eq!(patch.to_json(), r#"{"status":"closed"}"#);
    }

    #[test]
    fn test_empty_patch_serializes_to_empty_object() {
        assert_eq!(PullRequestBasic::default().to_json(), "{}");
    }

    #[test]
    fn test_list_reports_index_of_bad_item() {
        let mut bad = pull_request_json();
        bad.as_object_mut().unwrap().remove("author");
        let input = json!({
            "pagination": {"has_more": false, "next_offset": "", "results": 2, "max_per_page": 100},
            "results": [pull_request_json(), bad]
        });
        let err = PullRequestsList::from_value(&input).unwrap_err();
        assert_eq!(err.field(), Some("results[1].author"));
    }

    #[test]
    fn test_list_params_query() {
        let params = ListPullRequestsParams::default()
            .with_status(PullRequestsState::Open)
            .with_amount(50)
            .with_after("pr-9");
        let query = params.to_query().expect("Should render");

        assert_eq!(
            query,
            vec![
                ("after".to_string(), "pr-9".to_string()),
                ("amount".to_string(), "50".to_string()),
                ("status".to_string(), "open".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_params_amount_bounds() {
        for amount in [0, MAX_LIST_AMOUNT + 1] {
            let err = ListPullRequestsParams::default()
                .with_amount(amount)
                .to_query()
                .unwrap_err();
            assert_eq!(err.field(), Some("amount"));
        }
        assert!(ListPullRequestsParams::default()
            .with_amount(MAX_LIST_AMOUNT)
            .to_query()
            .is_ok());
    }
}
