//! Outbound side of the analysis pipeline: submitting documents to the
//! external workflow's webhook.

pub mod webhook;

pub use webhook::{SubmitError, WebhookClient};
