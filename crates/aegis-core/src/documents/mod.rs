//! Plan-document processing and storage
//!
//! Text-side processing (chunking, classification, the scanned-PDF
//! heuristic) plus SQLite storage for documents and their retrieval
//! chunks. PDF parsing and OCR themselves are external collaborators;
//! this module works on extracted text.
//!
//! # Module Structure
//!
//! - `text`: pure text processing and classification
//! - `store`: document and chunk storage

mod store;
mod text;

#[cfg(test)]
mod tests;

pub use store::{ChunkRecord, DocumentRecord, DocumentStore};
pub use text::{
    chunk_text, detect_document_type, is_likely_scanned, DocumentStatus, DocumentType, CHUNK_OVERLAP,
    CHUNK_SIZE, MAX_FILE_SIZE, MIN_TEXT_THRESHOLD,
};
