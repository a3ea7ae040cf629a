//! Batch indexing outcomes.

use tracing::warn;

use crate::{
    command::{encode_add, Command},
    document::{Document, IndexingOptions},
    error::{DocumentFailure, MultiError},
    reply::Reply,
    Result, SearchError,
};

/// Encode one `FT.ADD` per document, in submission order.
///
/// An encoding failure rejects the whole batch before anything is sent.
pub fn encode_batch(index: &str, docs: &[Document], opts: &IndexingOptions) -> Result<Vec<Command>> {
    docs.iter().map(|doc| encode_add(index, doc, opts)).collect()
}

/// Fold the per-command replies of a batch into a single outcome.
///
/// Returns `Ok(())` when every document was accepted, otherwise a
/// [`SearchError::Batch`] whose [`MultiError`] has exactly one slot per
/// submitted document.
pub fn collect_outcomes(index: &str, docs: &[Document], replies: Vec<Reply>) -> Result<()> {
    if replies.len() != docs.len() {
        return Err(SearchError::Decode(format!(
            "batch of {} documents got {} replies",
            docs.len(),
            replies.len()
        )));
    }

    let mut merr = MultiError::new(docs.len());
    for (position, (doc, reply)) in docs.iter().zip(replies).enumerate() {
        if let Reply::Error(message) = reply {
            merr.set(position, DocumentFailure::new(&doc.id, message));
        }
    }

    if merr.has_failures() {
        warn!(
            index = %index,
            failed = merr.failed_count(),
            batch_size = docs.len(),
            "Documents rejected"
        );
        return Err(merr.into());
    }
    Ok(())
}
