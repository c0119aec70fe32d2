use std::sync::Arc;

use tracing::{debug, warn};

use super::index::{IndexError, VectorIndex};
use crate::workflows::retention::backend::{BackendError, EmbeddingModel};

/// Returned when the customer's partition holds no documents.
pub const NO_RECORD_FOUND: &str = "No record found.";

/// Query text used to retrieve a customer's complaint history.
pub fn complaint_query(customer_id: &str) -> String {
    format!("Complaint from customer {customer_id}")
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Embedding(#[from] BackendError),
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Embeds free text and returns the closest stored document in a partition.
///
/// The lookup never fails: misses produce [`NO_RECORD_FOUND`] and backend or
/// index errors are rendered as `"Error: ..."` text for downstream stages.
#[derive(Clone)]
pub struct SimilarityLookup {
    embedder: Arc<dyn EmbeddingModel>,
    index: Arc<dyn VectorIndex>,
}

impl SimilarityLookup {
    pub fn new(embedder: Arc<dyn EmbeddingModel>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    pub fn best_match(&self, query_text: &str, partition: &str) -> String {
        match self.try_best_match(query_text, partition) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(partition, "no stored context for customer");
                NO_RECORD_FOUND.to_string()
            }
            Err(err) => {
                warn!(partition, error = %err, "similarity lookup failed, continuing with error text");
                format!("Error: {err}")
            }
        }
    }

    pub fn try_best_match(
        &self,
        query_text: &str,
        partition: &str,
    ) -> Result<Option<String>, LookupError> {
        let vector = self.embedder.embed(query_text)?;
        let hits = self.index.query(&vector, partition, 1)?;
        Ok(hits.into_iter().next())
    }
}
