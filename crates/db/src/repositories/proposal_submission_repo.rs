//! Repository for the `proposal_submissions` table.

use commandcentered_core::types::DbId;
use sqlx::PgPool;

use crate::models::proposal_submission::{
    CreateProposalSubmission, ProposalSubmission, SubmissionStatus,
};

/// Column list for proposal_submissions queries.
const COLUMNS: &str = "id, template_id, selections_json, pricing_json, \
    subtotal_cents, tax_cents, discount_cents, total_cents, status, \
    created_at, updated_at";

/// Provides persistence for client submissions.
pub struct ProposalSubmissionRepo;

impl ProposalSubmissionRepo {
    /// Record a submission with status `submitted`. Returns the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProposalSubmission,
    ) -> Result<ProposalSubmission, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposal_submissions
                (template_id, selections_json, pricing_json,
                 subtotal_cents, tax_cents, discount_cents, total_cents, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalSubmission>(&query)
            .bind(input.template_id)
            .bind(&input.selections_json)
            .bind(&input.pricing_json)
            .bind(input.subtotal_cents)
            .bind(input.tax_cents)
            .bind(input.discount_cents)
            .bind(input.total_cents)
            .bind(SubmissionStatus::Submitted.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProposalSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposal_submissions WHERE id = $1");
        sqlx::query_as::<_, ProposalSubmission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Submissions for one template, newest first.
    pub async fn list_for_template(
        pool: &PgPool,
        template_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProposalSubmission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposal_submissions
             WHERE template_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProposalSubmission>(&query)
            .bind(template_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move a submission to `status`. Returns `None` if it does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: SubmissionStatus,
    ) -> Result<Option<ProposalSubmission>, sqlx::Error> {
        let query = format!(
            "UPDATE proposal_submissions SET status = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProposalSubmission>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
