//! Output sinks for ordered document contents.

use reqcat_core::document::DocumentId;
use reqcat_core::{Error, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Receives documents in final order and persists them.
pub trait Sink {
    /// Append one document's content followed by the separator.
    fn write_document(&mut self, id: &DocumentId, content: &[u8]) -> Result<()>;

    /// Commit everything written so far and return the byte count. A sink
    /// dropped without `finish` must not leave a usable artifact behind.
    fn finish(self) -> Result<u64>
    where
        Self: Sized;
}

/// Writes to a staging file next to the output, then renames it into place.
#[derive(Debug)]
pub struct FileSink {
    output: PathBuf,
    staging: PathBuf,
    separator: String,
    writer: Option<BufWriter<File>>,
    bytes_written: u64,
}

impl FileSink {
    pub fn create(
        output: impl Into<PathBuf>,
        staging: impl Into<PathBuf>,
        separator: impl Into<String>,
    ) -> Result<Self> {
        let output = output.into();
        let staging = staging.into();
        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = File::create(&staging).map_err(|e| Error::io(&staging, e))?;
        Ok(Self {
            output,
            staging,
            separator: separator.into(),
            writer: Some(BufWriter::new(file)),
            bytes_written: 0,
        })
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Sink for FileSink {
    fn write_document(&mut self, id: &DocumentId, content: &[u8]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(Error::io(
                &self.staging,
                std::io::Error::other("sink already finished"),
            ));
        };
        writer
            .write_all(content)
            .and_then(|()| writer.write_all(self.separator.as_bytes()))
            .map_err(|e| Error::io(&self.staging, e))?;
        self.bytes_written += (content.len() + self.separator.len()) as u64;
        tracing::debug!(document = %id, "wrote document");
        Ok(())
    }

    fn finish(mut self) -> Result<u64> {
        let committed = self
            .writer
            .take()
            .map_or(Ok(()), |writer| {
                writer
                    .into_inner()
                    .map_err(std::io::IntoInnerError::into_error)
                    .and_then(|file| file.sync_all())
            })
            .map_err(|e| Error::io(&self.staging, e))
            .and_then(|()| {
                fs::rename(&self.staging, &self.output).map_err(|e| Error::io(&self.output, e))
            });
        if let Err(e) = committed {
            let _ = fs::remove_file(&self.staging);
            return Err(e);
        }

        tracing::info!(
            output = %self.output.display(),
            bytes = self.bytes_written,
            "output written"
        );
        Ok(self.bytes_written)
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

/// Collects output in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    separator: String,
    buffer: Vec<u8>,
}

impl MemorySink {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            buffer: Vec::new(),
        }
    }

    pub fn contents(&self) -> &[u8] {
        &self.buffer
    }
}

impl Sink for MemorySink {
    fn write_document(&mut self, _id: &DocumentId, content: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(content);
        self.buffer.extend_from_slice(self.separator.as_bytes());
        Ok(())
    }

    fn finish(self) -> Result<u64> {
        Ok(self.buffer.len() as u64)
    }
}
