//! Catalog/export (§4.H): read-only access to the bank's original payloads.

use crate::error::{BnkError, Result};
use crate::types::BankFile;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

impl BankFile {
    /// Returns `audio_id -> original_size` for every entry in the index.
    pub fn catalog(&self) -> Result<BTreeMap<u32, u32>> {
        if !self.index_present {
            return Err(BnkError::MissingIndex);
        }
        Ok(self.audio_index.iter().map(|e| (e.id, e.size)).collect())
    }

    /// Writes the *original* payload for `audio_id` to `sink`, never a
    /// queued replacement.
    pub fn export<W: Write>(&self, audio_id: u32, sink: &mut W) -> Result<()> {
        if !self.index_present {
            return Err(BnkError::MissingIndex);
        }
        let entry = self
            .audio_index
            .iter()
            .find(|e| e.id == audio_id)
            .ok_or(BnkError::UnknownAudioId(audio_id))?;
        let start = entry.offset as usize;
        let end = start + entry.size as usize;
        let bytes = self
            .data_blob
            .get(start..end)
            .ok_or(BnkError::Truncated { offset: start })?;
        sink.write_all(bytes).map_err(BnkError::SinkFailure)?;
        Ok(())
    }

    /// Writes every original payload to `directory/<id>.wem`, creating the
    /// directory if needed.
    pub fn export_all(&self, directory: &Path) -> Result<()> {
        if !self.index_present {
            return Err(BnkError::MissingIndex);
        }
        std::fs::create_dir_all(directory)?;
        for entry in &self.audio_index {
            let path = directory.join(format!("{}.wem", entry.id));
            let mut file = std::fs::File::create(&path)?;
            self.export(entry.id, &mut file)?;
        }
        tracing::info!(count = self.audio_index.len(), dir = %directory.display(), "exported all payloads");
        Ok(())
    }
}
