// ABOUTME: Transaction lifecycle tracking: sign, broadcast, await receipt.
// ABOUTME: Exposes a four-state lifecycle and the correlation id found in the receipt.

mod error;
mod tracker;

pub use error::{TxError, short_revert_message};
pub use tracker::{Submission, TxSnapshot, TxStatus, TxTracker, extract_correlation_id};
