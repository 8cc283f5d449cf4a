//! The in-memory bank model (§3 of the data model): index entries and the
//! object-hierarchy tables the patcher and resolver each work over.

use crate::ByteSource;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub type AudioSourceId = u32;
pub type EventId = u32;
pub type ActionId = u32;
pub type SoundId = u32;
pub type ContainerId = u32;

/// Action type value that denotes a "play" action; only actions of this type
/// are followed by the resolver.
pub const ACTION_TYPE_PLAY: u16 = 1027;

/// Endianness of a bank's multi-byte integers. Default little-endian;
/// configured explicitly by the caller, never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// One entry in the `DIDX` audio index.
///
/// At parse time `offset + size <= len(data_blob)` and `(offset, size)`
/// slices exactly the original payload for `id`. `replacement`, once queued,
/// overrides that payload on the next `serialize`; the on-disk `offset`/`size`
/// of the entry are recomputed from serialization order at that point, not
/// stored here.
pub struct IndexEntry {
    pub id: AudioSourceId,
    pub offset: u32,
    pub size: u32,
    pub replacement: Option<Box<dyn ByteSource>>,
}

impl std::fmt::Debug for IndexEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexEntry")
            .field("id", &self.id)
            .field("offset", &self.offset)
            .field("size", &self.size)
            .field("replacement", &self.replacement.is_some())
            .finish()
    }
}

/// An event entry point. `resolved_audio_ids` is empty until
/// [`crate::BankFile::resolve_events`] runs.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub id: EventId,
    pub actions: Vec<ActionId>,
    pub resolved_audio_ids: HashSet<AudioSourceId>,
}

/// A behavior descriptor. Fields are optional because short records are
/// tolerated rather than rejected; a `None` field means the record ended
/// before that field could be read.
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub id: ActionId,
    pub action_type: Option<u16>,
    pub target: Option<u32>,
}

/// A leaf that plays a single audio source.
#[derive(Debug, Clone, Default)]
pub struct Sound {
    pub id: SoundId,
    pub source: Option<AudioSourceId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaylistItem {
    pub id: u32,
    pub weight: i32,
}

/// The five single-byte booleans carried either as separate fields
/// (version <= 89) or packed into one bitvector byte, bits 0..4 in this
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerFlags {
    pub is_using_weight: bool,
    pub reset_playlist_at_each_play: bool,
    pub is_restart_backward: bool,
    pub is_continuous: bool,
    pub is_global: bool,
}

/// A node grouping children with a playlist; may nest. Only `children` and
/// `playlist` influence event resolution — the rest is retained for fidelity
/// (round-tripping diagnostics, future editing) and is `None`/empty if the
/// record was too short to carry it.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub id: ContainerId,
    pub loop_count: Option<i16>,
    pub transition_time: Option<f32>,
    pub transition_mod_min: Option<f32>,
    pub transition_mod_max: Option<f32>,
    pub avoid_repeat_count: Option<u16>,
    pub transition_mode: Option<u8>,
    pub random_mode: Option<u8>,
    pub mode: Option<u8>,
    pub flags: ContainerFlags,
    pub children: Vec<u32>,
    pub playlist: Vec<PlaylistItem>,
}

/// A tagged HIRC record. Object types this crate does not model are kept as
/// `Unknown` so a future diagnostic (e.g. "what object types appear in this
/// bank") can still see them without the resolver or patcher depending on
/// their contents.
#[derive(Debug, Clone)]
pub enum HircObject {
    Event(Event),
    Action(Action),
    Sound(Sound),
    Container(Container),
    Unknown { obj_type: u8, raw: Vec<u8> },
}

/// Aggregate counts/sizes over a parsed bank.
#[derive(Debug, Clone, Serialize)]
pub struct BankStats {
    pub version: u32,
    pub audio_entry_count: usize,
    pub data_blob_bytes: usize,
    pub event_count: usize,
    pub action_count: usize,
    pub sound_count: usize,
    pub container_count: usize,
    pub unknown_object_count: usize,
    pub trailing_bytes: usize,
}

/// The parsed bank container (§3). Populated in two independent passes: a
/// chunk scan collecting header/index/data/trailing bytes, and a hierarchy
/// parse over the `HIRC` chunk if one is present anywhere in the file.
#[derive(Debug, Default)]
pub struct BankFile {
    pub version: u32,
    pub header_bytes: Vec<u8>,
    pub audio_index: Vec<IndexEntry>,
    pub data_blob: Vec<u8>,
    pub trailing_bytes: Vec<u8>,

    pub events: Vec<Event>,
    pub actions: HashMap<ActionId, Action>,
    pub sounds: HashMap<SoundId, Sound>,
    pub containers: HashMap<ContainerId, Container>,
    pub audio_file_ids: HashSet<AudioSourceId>,

    pub(crate) index_present: bool,
    pub(crate) unknown_object_count: usize,
}

impl BankFile {
    pub fn stats(&self) -> BankStats {
        BankStats {
            version: self.version,
            audio_entry_count: self.audio_index.len(),
            data_blob_bytes: self.data_blob.len(),
            event_count: self.events.len(),
            action_count: self.actions.len(),
            sound_count: self.sounds.len(),
            container_count: self.containers.len(),
            unknown_object_count: self.unknown_object_count,
            trailing_bytes: self.trailing_bytes.len(),
        }
    }
}
