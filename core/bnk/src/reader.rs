//! Bank model construction (§4.E): parses a byte buffer into a [`BankFile`]
//! in two independent passes — a chunk scan for header/index/data/trailing
//! bytes, and a hierarchy parse over `HIRC` if present. Patching does not
//! need the hierarchy pass; resolution does not need the data blob contents.

use crate::error::{BnkError, Result};
use crate::hirc::{VersionGates, parse_hirc_objects};
use crate::scanner::{ScanPolicy, scan_chunks, strip_akbk_envelope};
use crate::types::{Action, BankFile, Container, Endianness, Event, HircObject, IndexEntry, Sound};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::collections::{HashMap, HashSet};

impl BankFile {
    /// Parses a bank byte stream. `endianness` governs every multi-byte
    /// integer read; it is never auto-detected.
    pub fn parse(buf: &[u8], endianness: Endianness) -> Result<Self> {
        match endianness {
            Endianness::Little => parse_with::<LittleEndian>(buf),
            Endianness::Big => parse_with::<BigEndian>(buf),
        }
    }
}

fn parse_with<O: ByteOrder>(buf: &[u8]) -> Result<BankFile> {
    let span = tracing::debug_span!("bank_scan", file_size = buf.len());
    let _enter = span.enter();

    let body = strip_akbk_envelope(buf)?;
    if body.len() < 4 || &body[0..4] != b"BKHD" {
        return Err(BnkError::BadHeader);
    }

    let patch_scan = scan_chunks::<O>(body, ScanPolicy::Patch)?;

    let mut version = None;
    let mut header_bytes = None;
    let mut audio_index = Vec::new();
    let mut data_blob = Vec::new();
    let mut index_present = false;

    for chunk in &patch_scan.chunks {
        match &chunk.tag {
            b"BKHD" => {
                if chunk.payload.len() < 4 {
                    return Err(BnkError::BadHeader);
                }
                version = Some(O::read_u32(&chunk.payload[0..4]));
                header_bytes = Some(chunk.payload.to_vec());
            }
            b"DIDX" => {
                audio_index = parse_didx::<O>(chunk.payload)?;
                index_present = true;
            }
            b"DATA" => {
                data_blob = chunk.payload.to_vec();
            }
            _ => {}
        }
    }

    let version = version.ok_or(BnkError::BadHeader)?;
    let header_bytes = header_bytes.ok_or(BnkError::BadHeader)?;
    let trailing_bytes = body[patch_scan.trailing_start..].to_vec();
    let audio_file_ids: HashSet<u32> = audio_index.iter().map(|e| e.id).collect();

    tracing::debug!(version, entries = audio_index.len(), "scanned top-level chunks");

    let hierarchy_scan = scan_chunks::<O>(body, ScanPolicy::Hierarchy)?;
    let hirc_payload = hierarchy_scan.chunks.iter().find(|c| &c.tag == b"HIRC");

    let (events, actions, sounds, containers, unknown_object_count) = match hirc_payload {
        Some(chunk) => {
            let gates = VersionGates::new(version);
            let objects = parse_hirc_objects::<O>(chunk.payload, &gates)?;
            project_hierarchy(objects)
        }
        None => (Vec::new(), HashMap::new(), HashMap::new(), HashMap::new(), 0),
    };

    tracing::debug!(
        events = events.len(),
        actions = actions.len(),
        sounds = sounds.len(),
        containers = containers.len(),
        "parsed hierarchy"
    );

    Ok(BankFile {
        version,
        header_bytes,
        audio_index,
        data_blob,
        trailing_bytes,
        events,
        actions,
        sounds,
        containers,
        audio_file_ids,
        index_present,
        unknown_object_count,
    })
}

fn parse_didx<O: ByteOrder>(payload: &[u8]) -> Result<Vec<IndexEntry>> {
    if payload.len() % 12 != 0 {
        return Err(BnkError::Truncated {
            offset: payload.len(),
        });
    }
    let count = payload.len() / 12;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let rec = &payload[i * 12..i * 12 + 12];
        let id = O::read_u32(&rec[0..4]);
        let offset = O::read_u32(&rec[4..8]);
        let size = O::read_u32(&rec[8..12]);
        entries.push(IndexEntry {
            id,
            offset,
            size,
            replacement: None,
        });
    }
    Ok(entries)
}

type ProjectedHierarchy = (
    Vec<Event>,
    HashMap<u32, Action>,
    HashMap<u32, Sound>,
    HashMap<u32, Container>,
    usize,
);

fn project_hierarchy(objects: Vec<HircObject>) -> ProjectedHierarchy {
    let mut events = Vec::new();
    let mut actions = HashMap::new();
    let mut sounds = HashMap::new();
    let mut containers = HashMap::new();
    let mut unknown_count = 0;

    for obj in objects {
        match obj {
            HircObject::Event(e) => events.push(e),
            HircObject::Action(a) => {
                actions.insert(a.id, a);
            }
            HircObject::Sound(s) => {
                sounds.insert(s.id, s);
            }
            HircObject::Container(c) => {
                containers.insert(c.id, c);
            }
            HircObject::Unknown { .. } => unknown_count += 1,
        }
    }

    (events, actions, sounds, containers, unknown_count)
}
