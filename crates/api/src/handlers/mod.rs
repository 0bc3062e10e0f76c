pub mod proposal_submissions;
pub mod proposal_templates;
pub mod public_proposals;
