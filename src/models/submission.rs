//! # Submission Model
//!
//! One taxpayer's dispatch unit. Created when a dispatch message is consumed
//! and never mutated afterwards; the assembler hands it to storage by value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who submitted what; travels with every stage of the pipeline and is
/// persisted as `userContext.json` next to the return documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterContext {
    /// Filing-authority submission id, unique per submission
    pub submission_id: String,
    pub user_id: String,
    pub tax_return_id: Uuid,
    /// Sign date as dispatched (`YYYY-MM-DD`)
    pub sign_date: String,
}

impl SubmitterContext {
    pub fn new(
        submission_id: impl Into<String>,
        user_id: impl Into<String>,
        tax_return_id: Uuid,
        sign_date: impl Into<String>,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            user_id: user_id.into(),
            tax_return_id,
            sign_date: sign_date.into(),
        }
    }

    /// Parsed sign date, `None` when the dispatched value is not a calendar date
    pub fn signed_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.sign_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn ids(&self) -> TaxReturnIdAndSubmissionId {
        TaxReturnIdAndSubmissionId {
            tax_return_id: self.tax_return_id,
            submission_id: self.submission_id.clone(),
        }
    }
}

/// `userContext.json` as persisted: the context plus its arrival position in the batch.
///
/// Files written before positions were recorded read back as position 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmitterContext {
    #[serde(flatten)]
    pub context: SubmitterContext,
    #[serde(default)]
    pub arrival_sequence: u64,
}

impl StoredSubmitterContext {
    pub fn new(context: SubmitterContext, arrival_sequence: u64) -> Self {
        Self {
            context,
            arrival_sequence,
        }
    }
}

/// A submission ready to be batched: context plus the authority-ready documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub context: SubmitterContext,
    pub manifest_xml: String,
    pub return_xml: String,
}

impl Submission {
    pub fn new(
        context: SubmitterContext,
        manifest_xml: impl Into<String>,
        return_xml: impl Into<String>,
    ) -> Self {
        Self {
            context,
            manifest_xml: manifest_xml.into(),
            return_xml: return_xml.into(),
        }
    }

    pub fn submission_id(&self) -> &str {
        &self.context.submission_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReturnIdAndSubmissionId {
    pub tax_return_id: Uuid,
    pub submission_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_serializes_camel_case() {
        let tax_return_id = Uuid::new_v4();
        let context = SubmitterContext::new("sub-1", "user-1", tax_return_id, "2024-02-15");
        let json = serde_json::to_value(&context).unwrap();

        assert_eq!(json["submissionId"], "sub-1");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["taxReturnId"], tax_return_id.to_string());
        assert_eq!(json["signDate"], "2024-02-15");
    }

    #[test]
    fn test_signed_on_parses_calendar_dates_only() {
        let context = SubmitterContext::new("s", "u", Uuid::nil(), "2024-02-15");
        assert_eq!(
            context.signed_on(),
            NaiveDate::from_ymd_opt(2024, 2, 15)
        );

        let garbled = SubmitterContext::new("s", "u", Uuid::nil(), "signDate1");
        assert_eq!(garbled.signed_on(), None);
    }

    #[test]
    fn test_stored_context_keeps_arrival_sequence_beside_context() {
        let context = SubmitterContext::new("sub-2", "user-2", Uuid::nil(), "2024-02-15");
        let json = serde_json::to_value(StoredSubmitterContext::new(context.clone(), 4)).unwrap();
        assert_eq!(json["submissionId"], "sub-2");
        assert_eq!(json["arrivalSequence"], 4);

        let legacy = serde_json::to_vec(&context).unwrap();
        let stored: StoredSubmitterContext = serde_json::from_slice(&legacy).unwrap();
        assert_eq!(stored.context, context);
        assert_eq!(stored.arrival_sequence, 0);
    }
}
