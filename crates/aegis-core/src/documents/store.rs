//! Document and chunk storage

use super::text::{DocumentStatus, DocumentType};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A stored document's metadata (file content itself is not kept; only
/// extracted text survives processing)
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    /// Document ID
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Original file name
    pub file_name: String,
    /// Classification derived from the file name
    pub doc_type: DocumentType,
    /// Processing status
    pub status: DocumentStatus,
    /// Extracted text (set once processing succeeds)
    #[serde(skip_serializing)]
    pub raw_text: Option<String>,
    /// Upload timestamp
    pub created_at: DateTime<Utc>,
}

/// A retrieval chunk of a processed document
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Chunk ID
    pub id: String,
    /// Owning document
    pub document_id: String,
    /// File name of the owning document (for citations)
    pub file_name: String,
    /// Position within the document
    pub chunk_index: u32,
    /// Chunk text
    pub content: String,
    /// Embedding vector, when one was computed
    pub embedding: Option<Vec<f32>>,
}

/// SQLite-backed document store
pub struct DocumentStore {
    pool: SqlitePool,
}

impl DocumentStore {
    /// Create a store over an existing pool and initialize the schema
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        info!("document store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                doc_type TEXT NOT NULL,
                status TEXT NOT NULL,
                raw_text TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_user_id ON documents(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_document_chunks_document_id \
             ON document_chunks(document_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a document row in `uploaded` state
    pub async fn insert(
        &self,
        user_id: &str,
        file_name: &str,
        doc_type: DocumentType,
    ) -> Result<DocumentRecord> {
        let record = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            file_name: file_name.to_string(),
            doc_type,
            status: DocumentStatus::Uploaded,
            raw_text: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO documents (id, user_id, file_name, doc_type, status, raw_text, created_at)
            VALUES (?, ?, ?, ?, ?, NULL, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.file_name)
        .bind(record.doc_type.as_str())
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        debug!(document_id = %record.id, file_name = %record.file_name, "document created");
        Ok(record)
    }

    /// Update a document's processing status
    pub async fn set_status(&self, document_id: &str, status: DocumentStatus) -> Result<()> {
        let result = sqlx::query("UPDATE documents SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("document {document_id}")));
        }
        debug!(document_id = %document_id, status = status.as_str(), "document status updated");
        Ok(())
    }

    /// Store a document's extracted text
    pub async fn set_raw_text(&self, document_id: &str, raw_text: &str) -> Result<()> {
        let result = sqlx::query("UPDATE documents SET raw_text = ? WHERE id = ?")
            .bind(raw_text)
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("document {document_id}")));
        }
        Ok(())
    }

    /// Replace a document's retrieval chunks
    pub async fn replace_chunks(
        &self,
        document_id: &str,
        chunks: &[(String, Option<Vec<f32>>)],
    ) -> Result<()> {
        sqlx::query("DELETE FROM document_chunks WHERE document_id = ?")
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        for (index, (content, embedding)) in chunks.iter().enumerate() {
            let embedding_json = match embedding {
                Some(vector) => Some(serde_json::to_string(vector)?),
                None => None,
            };

            sqlx::query(
                r#"
                INSERT INTO document_chunks (id, document_id, chunk_index, content, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(format!("chunk_{}_{}", document_id, index))
            .bind(document_id)
            .bind(index as i64)
            .bind(content)
            .bind(embedding_json)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        }

        debug!(document_id = %document_id, chunks = chunks.len(), "document chunks replaced");
        Ok(())
    }

    /// A user's documents, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<DocumentRecord>> {
        let rows: Vec<(String, String, String, String, String, Option<String>, DateTime<Utc>)> =
            sqlx::query_as(
                r#"
                SELECT id, user_id, file_name, doc_type, status, raw_text, created_at
                FROM documents
                WHERE user_id = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    /// Extracted text of a user's completed documents
    pub async fn texts_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT raw_text FROM documents
            WHERE user_id = ? AND status = 'completed' AND raw_text IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(text,)| text).collect())
    }

    /// Retrieval chunks across all of a user's completed documents
    pub async fn chunks_for_user(&self, user_id: &str) -> Result<Vec<ChunkRecord>> {
        let rows: Vec<(String, String, String, i64, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT c.id, c.document_id, d.file_name, c.chunk_index, c.content, c.embedding
            FROM document_chunks c
            JOIN documents d ON d.id = c.document_id
            WHERE d.user_id = ? AND d.status = 'completed'
            ORDER BY d.created_at DESC, c.chunk_index ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, document_id, file_name, chunk_index, content, embedding)| {
                let embedding = match embedding {
                    Some(json) => Some(serde_json::from_str(&json)?),
                    None => None,
                };
                Ok(ChunkRecord {
                    id,
                    document_id,
                    file_name,
                    chunk_index: chunk_index as u32,
                    content,
                    embedding,
                })
            })
            .collect()
    }

    fn row_to_document(
        row: (String, String, String, String, String, Option<String>, DateTime<Utc>),
    ) -> Result<DocumentRecord> {
        let (id, user_id, file_name, doc_type, status, raw_text, created_at) = row;
        Ok(DocumentRecord {
            id,
            user_id,
            file_name,
            doc_type: DocumentType::from_str(&doc_type).map_err(Error::Database)?,
            status: DocumentStatus::from_str(&status).map_err(Error::Database)?,
            raw_text,
            created_at,
        })
    }
}
