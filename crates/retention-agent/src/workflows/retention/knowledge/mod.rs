mod index;
mod ingest;
mod lookup;

pub use index::{InMemoryVectorIndex, IndexError, StoredDocument, VectorIndex};
pub use ingest::{
    ComplaintIngestor, IngestError, IngestReport, SkippedComplaint, COMPLAINT_FILE_SUFFIX,
};
pub use lookup::{complaint_query, LookupError, SimilarityLookup, NO_RECORD_FOUND};
