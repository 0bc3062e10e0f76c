//! Proposal submission models and DTOs.

use std::fmt;
use std::str::FromStr;

use commandcentered_core::error::CoreError;
use commandcentered_core::submission::Submission;
use commandcentered_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Review status of a submission. New submissions start as `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Reviewing,
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewing => "reviewing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "reviewing" => Ok(Self::Reviewing),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown submission status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `proposal_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalSubmission {
    pub id: DbId,
    pub template_id: DbId,
    pub selections_json: serde_json::Value,
    pub pricing_json: serde_json::Value,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Insert payload for a validated, priced submission.
#[derive(Debug, Clone)]
pub struct CreateProposalSubmission {
    pub template_id: DbId,
    pub selections_json: serde_json::Value,
    pub pricing_json: serde_json::Value,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl CreateProposalSubmission {
    pub fn from_submission(template_id: DbId, submission: &Submission) -> Result<Self, CoreError> {
        let to_json = |value: serde_json::Result<serde_json::Value>| {
            value.map_err(|e| CoreError::Internal(format!("Failed to encode submission: {e}")))
        };
        let pricing = &submission.pricing;
        Ok(Self {
            template_id,
            selections_json: to_json(serde_json::to_value(&submission.values))?,
            pricing_json: to_json(serde_json::to_value(pricing))?,
            subtotal_cents: pricing.subtotal.cents(),
            tax_cents: pricing.tax_amount.map_or(0, |tax| tax.cents()),
            discount_cents: pricing.discount_amount.cents(),
            total_cents: pricing.total.cents(),
        })
    }
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Request body for moving a submission through review.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubmissionStatus {
    pub status: SubmissionStatus,
}

#[cfg(test)]
mod tests {
    use commandcentered_core::form::FormValues;
    use commandcentered_core::money::Money;
    use commandcentered_core::pricing::PricingResult;

    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            SubmissionStatus::Submitted,
            SubmissionStatus::Reviewing,
            SubmissionStatus::Accepted,
            SubmissionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<SubmissionStatus>().unwrap(), status);
        }
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn insert_payload_stores_cents() {
        let submission = Submission {
            values: [("quantity", 5.0)].into_iter().collect::<FormValues>(),
            pricing: PricingResult {
                subtotal: Money::from_decimal(500.5),
                line_items: Vec::new(),
                tax_amount: Some(Money::from_cents(4_004)),
                discount_amount: Money::ZERO,
                total: Money::from_cents(54_054),
                currency_symbol: "$".into(),
                unmatched_tiers: Vec::new(),
            },
        };
        let row = CreateProposalSubmission::from_submission(3, &submission).unwrap();
        assert_eq!(row.subtotal_cents, 50_050);
        assert_eq!(row.tax_cents, 4_004);
        assert_eq!(row.total_cents, 54_054);
        assert_eq!(row.selections_json["quantity"], 5.0);
        assert_eq!(row.pricing_json["total"], 540.54);
    }
}
