//! The patcher (§4.F): applies a replacement plan and reserializes the bank
//! with a rebuilt index and concatenated data blob.

use crate::error::{BnkError, Result};
use crate::types::{BankFile, Endianness};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

/// A readable byte source of known length, abstracting over where a
/// replacement payload comes from (an in-memory buffer, a file, ...) so the
/// core never has to care.
pub trait ByteSource {
    fn len(&mut self) -> Result<u64>;
    fn read_all(&mut self) -> Result<Vec<u8>>;
}

impl ByteSource for Vec<u8> {
    fn len(&mut self) -> Result<u64> {
        Ok((self as &Vec<u8>).len() as u64)
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }
}

impl ByteSource for std::fs::File {
    fn len(&mut self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        use std::io::{Read, Seek, SeekFrom};
        self.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// The single configuration value the patcher needs. Resolution and
/// cataloging need none: the version is self-describing from `BKHD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    pub endianness: Endianness,
}

impl BankFile {
    /// Queues a replacement for `audio_id`. Last writer wins. Fails with
    /// [`BnkError::UnknownAudioId`] if the id is not in the audio index.
    pub fn queue_replacement(
        &mut self,
        audio_id: u32,
        source: Box<dyn ByteSource>,
    ) -> Result<()> {
        let entry = self
            .audio_index
            .iter_mut()
            .find(|e| e.id == audio_id)
            .ok_or(BnkError::UnknownAudioId(audio_id))?;
        entry.replacement = Some(source);
        tracing::debug!(audio_id, "queued replacement");
        Ok(())
    }

    /// Writes the bank back out per the layout in SPEC_FULL.md §4.F:
    /// header chunk, rebuilt `DIDX`, concatenated `DATA`, trailing bytes.
    ///
    /// Every replacement source is read to completion *before* a single byte
    /// is written to `sink`, so a `ReplacementUnreadable` failure never
    /// leaves a partially-written sink: serialization is atomic from the
    /// caller's perspective.
    pub fn serialize<W: Write>(&mut self, sink: &mut W, options: &PatchOptions) -> Result<()> {
        if !self.index_present {
            return Err(BnkError::MissingIndex);
        }
        match options.endianness {
            Endianness::Little => self.serialize_with::<LittleEndian, W>(sink),
            Endianness::Big => self.serialize_with::<BigEndian, W>(sink),
        }
    }

    fn serialize_with<O: ByteOrder, W: Write>(&mut self, sink: &mut W) -> Result<()> {
        let span = tracing::debug_span!("patch_apply", entries = self.audio_index.len());
        let _enter = span.enter();

        let mut bodies: Vec<Vec<u8>> = Vec::with_capacity(self.audio_index.len());
        for entry in self.audio_index.iter_mut() {
            let bytes = if let Some(source) = entry.replacement.as_mut() {
                let bytes = source
                    .read_all()
                    .map_err(|_| BnkError::ReplacementUnreadable(entry.id))?;
                tracing::debug!(audio_id = entry.id, new_size = bytes.len(), "applying replacement");
                bytes
            } else {
                let start = entry.offset as usize;
                let end = start + entry.size as usize;
                self.data_blob
                    .get(start..end)
                    .ok_or(BnkError::Truncated { offset: start })?
                    .to_vec()
            };
            bodies.push(bytes);
        }

        let mut rebuilt: Vec<(u32, u32, u32)> = Vec::with_capacity(self.audio_index.len());
        let mut running: u32 = 0;
        for (entry, body) in self.audio_index.iter().zip(bodies.iter()) {
            let size = body.len() as u32;
            rebuilt.push((entry.id, running, size));
            running += size;
        }

        tracing::info!(
            total_entries = rebuilt.len(),
            total_bytes = running,
            "rebuilt audio index"
        );

        // 1. BKHD, re-framed.
        write_chunk::<O, W>(sink, b"BKHD", &self.header_bytes)?;

        // 2. DIDX, rebuilt.
        let mut didx_body = Vec::with_capacity(rebuilt.len() * 12);
        for (id, offset, size) in &rebuilt {
            write_u32::<O, _>(&mut didx_body, *id)?;
            write_u32::<O, _>(&mut didx_body, *offset)?;
            write_u32::<O, _>(&mut didx_body, *size)?;
        }
        write_chunk::<O, W>(sink, b"DIDX", &didx_body)?;

        // 3. DATA, concatenated in index order.
        let mut data_body = Vec::with_capacity(running as usize);
        for body in &bodies {
            data_body.extend_from_slice(body);
        }
        write_chunk::<O, W>(sink, b"DATA", &data_body)?;

        // 4. trailing bytes verbatim.
        sink.write_all(&self.trailing_bytes)
            .map_err(BnkError::SinkFailure)?;

        Ok(())
    }
}

fn write_chunk<O: ByteOrder, W: Write>(sink: &mut W, tag: &[u8; 4], payload: &[u8]) -> Result<()> {
    sink.write_all(tag).map_err(BnkError::SinkFailure)?;
    write_u32::<O, _>(sink, payload.len() as u32).map_err(BnkError::SinkFailure)?;
    sink.write_all(payload).map_err(BnkError::SinkFailure)?;
    Ok(())
}

fn write_u32<O: ByteOrder, W: Write>(w: &mut W, v: u32) -> std::io::Result<()> {
    w.write_u32::<O>(v)
}
