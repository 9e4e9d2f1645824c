//! Local filesystem storage implementation.
//!
//! Writes one record per line. The file is replaced atomically: content goes
//! to a sibling `.tmp` file first, which is then renamed over the target.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::TaggedWord;
use crate::storage::{RecordSink, WriteMetadata};

/// A record with a single-line text form.
pub trait LineRecord {
    fn line(&self) -> &str;
}

impl LineRecord for TaggedWord {
    fn line(&self) -> &str {
        &self.text
    }
}

/// Plain text sink; every write replaces the file.
#[derive(Debug, Clone)]
pub struct TextFileSink {
    path: PathBuf,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Target file, for logs and write metadata.
    pub fn location(&self) -> String {
        self.path.display().to_string()
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: LineRecord + Sync> RecordSink<T> for TextFileSink {
    async fn write(&self, records: &[T]) -> Result<WriteMetadata> {
        let mut content = String::new();
        for record in records {
            content.push_str(record.line());
            content.push('\n');
        }
        self.write_bytes(content.as_bytes()).await?;

        log::info!("{} lines written to {}", records.len(), TextFileSink::location(self));
        Ok(WriteMetadata::new(records.len(), TextFileSink::location(self)))
    }

    fn location(&self) -> String {
        TextFileSink::location(self)
    }
}
