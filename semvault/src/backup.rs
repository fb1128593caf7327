use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use semvault_core::{Document, Metadata};

use crate::collection::SCAN_PAGE_SIZE;
use crate::{CollectionError, VectorCollection};

/// Restore re-adds in chunks through the regular batch-add path.
const RESTORE_BATCH_SIZE: usize = 50;

/// One line of a backup file: the full document, minus the embedding
/// (restore re-embeds with the collection's bound provider).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BackupRecord {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl From<Document> for BackupRecord {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            content: doc.content,
            metadata: doc.metadata,
        }
    }
}

impl From<BackupRecord> for Document {
    fn from(record: BackupRecord) -> Self {
        Document {
            id: record.id,
            content: record.content,
            metadata: record.metadata,
            embedding: None,
        }
    }
}

impl VectorCollection {
    /// Writes every document as one JSON object per line to `path`,
    /// overwriting any existing file. Pages stream from the backend scan
    /// straight to disk; the whole collection is never buffered. Write
    /// order is the backend scan order. Returns the number of records
    /// written.
    pub async fn export_backup(&self, path: impl AsRef<Path>) -> Result<usize, CollectionError> {
        let file = File::create(path.as_ref()).await?;
        let mut writer = BufWriter::new(file);
        let mut written = 0_usize;

        let mut offset = None;
        loop {
            let page = self.store.scan(offset, SCAN_PAGE_SIZE).await?;
            for doc in page.documents {
                let record = BackupRecord::from(doc);
                let line = serde_json::to_string(&record).map_err(|err| {
                    CollectionError::Backend(format!("failed to encode backup record: {err}"))
                })?;
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                written += 1;
            }
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        writer.flush().await?;
        Ok(written)
    }

    /// Restores a backup written by [`export_backup`](Self::export_backup).
    ///
    /// The entire file is parsed before anything is written or cleared, so
    /// a malformed line aborts with the collection untouched. With
    /// `clear_existing`, the clear completes before any record is re-added;
    /// records then flow through [`add_documents`](Self::add_documents) in
    /// batches, under the same provider binding and atomic-batch policy.
    /// Returns the number of records imported.
    ///
    /// The file does not carry the embedding provider's identity. Restoring
    /// against a provider other than the one that produced the backup
    /// succeeds but shifts similarity behavior; keep the binding consistent.
    pub async fn import_backup(
        &self,
        path: impl AsRef<Path>,
        clear_existing: bool,
    ) -> Result<usize, CollectionError> {
        let file = File::open(path.as_ref()).await?;
        let mut lines = BufReader::new(file).lines();

        let mut docs: Vec<Document> = Vec::new();
        let mut line_number = 0_usize;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            let record: BackupRecord = serde_json::from_str(&line).map_err(|err| {
                CollectionError::MalformedBackupRecord {
                    line: line_number,
                    reason: err.to_string(),
                }
            })?;
            if record.id.trim().is_empty() {
                return Err(CollectionError::MalformedBackupRecord {
                    line: line_number,
                    reason: "record has empty id".to_string(),
                });
            }
            if record.content.is_empty() {
                return Err(CollectionError::MalformedBackupRecord {
                    line: line_number,
                    reason: "record has empty content".to_string(),
                });
            }
            docs.push(record.into());
        }

        if clear_existing {
            self.clear_collection(true).await?;
        }

        let imported = docs.len();
        for chunk in docs.chunks(RESTORE_BATCH_SIZE) {
            self.add_documents(chunk.to_vec()).await?;
        }

        Ok(imported)
    }
}
