//! The top-level chunk scanner (§4.B): walks `tag | size | payload` triples.
//!
//! Two traversal policies are modeled as an explicit enum rather than a
//! boolean flag, since a plausible third policy (a validating scan that
//! rejects any unknown chunk outright) would not be nameable as a bool.
use crate::error::{BnkError, Result};
use byteorder::ByteOrder;

const KNOWN_TAGS: [[u8; 4]; 4] = [*b"BKHD", *b"DIDX", *b"DATA", *b"HIRC"];

pub(crate) struct TopLevelChunk<'a> {
    pub tag: [u8; 4],
    pub payload: &'a [u8],
}

pub(crate) struct ChunkScan<'a> {
    pub chunks: Vec<TopLevelChunk<'a>>,
    /// Byte offset (within the scanned buffer) where scanning stopped.
    /// Equal to `buf.len()` unless the patch policy halted on an unknown tag.
    pub trailing_start: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ScanPolicy {
    /// Halts at the first unrecognized tag; everything from there on is
    /// `trailing_bytes`. Used by the patching pipeline, which must preserve
    /// unknown trailing chunks verbatim rather than try to interpret them.
    Patch,
    /// Skips over unrecognized chunks and keeps scanning to find `HIRC`
    /// wherever it appears. Used by the hierarchy pass, which does not care
    /// about anything past the chunks it understands.
    Hierarchy,
}

/// Strips the optional 12-byte `"AKBK"` envelope that may precede `BKHD`.
pub(crate) fn strip_akbk_envelope(buf: &[u8]) -> Result<&[u8]> {
    if buf.len() >= 4 && &buf[0..4] == b"AKBK" {
        if buf.len() < 12 {
            return Err(BnkError::Truncated { offset: 4 });
        }
        Ok(&buf[12..])
    } else {
        Ok(buf)
    }
}

pub(crate) fn scan_chunks<O: ByteOrder>(buf: &[u8], policy: ScanPolicy) -> Result<ChunkScan<'_>> {
    let mut pos = 0usize;
    let mut chunks = Vec::new();

    while pos < buf.len() {
        if pos + 8 > buf.len() {
            return Err(BnkError::Truncated { offset: pos });
        }
        let tag = [buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]];
        let size = O::read_u32(&buf[pos + 4..pos + 8]) as usize;
        let payload_start = pos + 8;
        let payload_end = payload_start
            .checked_add(size)
            .filter(|&end| end <= buf.len())
            .ok_or(BnkError::Truncated {
                offset: payload_start,
            })?;

        let known = KNOWN_TAGS.contains(&tag);
        if !known && matches!(policy, ScanPolicy::Patch) {
            return Ok(ChunkScan {
                chunks,
                trailing_start: pos,
            });
        }

        chunks.push(TopLevelChunk {
            tag,
            payload: &buf[payload_start..payload_end],
        });
        pos = payload_end;
    }

    Ok(ChunkScan {
        chunks,
        trailing_start: buf.len(),
    })
}
