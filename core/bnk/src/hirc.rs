//! The object-record parser (§4.D): dispatches each `HIRC` entry on object
//! type and version to yield a typed [`HircObject`].
//!
//! Every record advances the outer cursor by exactly its declared `size`
//! regardless of how many bytes the inner parser consumed, so a malformed or
//! partially-understood record never desynchronizes the stream. Field-level
//! truncation inside a record is recovery, not failure: missing fields become
//! `None` and the parser stops reading that field group.

use crate::cursor::ByteCursor;
use crate::error::{BnkError, Result};
use crate::types::{Action, Container, ContainerFlags, Event, HircObject, PlaylistItem, Sound};
use byteorder::ByteOrder;
use std::collections::HashSet;

const OBJ_SOUND: u8 = 0x02;
const OBJ_ACTION: u8 = 0x03;
const OBJ_EVENT: u8 = 0x04;
const OBJ_CONTAINER: u8 = 0x05;

/// The version-sensitive layout branch points, computed once per bank (§9:
/// "do not sprinkle the numeric thresholds through the parser").
#[derive(Debug, Clone, Copy)]
pub(crate) struct VersionGates {
    /// `type` field of the record header is `u8` rather than `u32`.
    pub byte_type_header: bool,
    /// Event action count is a base-128 varint rather than a plain `u32`.
    pub varint_action_count: bool,
    /// Container carries 4 extra loop-count bytes after the `i16`.
    pub container_extra_loop: bool,
    /// Container transition timing is three `f32`s rather than three `i32`s.
    pub container_float_transition: bool,
    /// Container flags are one bitvector byte rather than five bool bytes.
    pub container_bitvector_flags: bool,
    /// Container playlist count is `u16` rather than `u32`.
    pub container_u16_playlist_count: bool,
    /// Container playlist item weight is `i32` rather than `u8`.
    pub container_i32_weight: bool,
}

impl VersionGates {
    pub fn new(version: u32) -> Self {
        Self {
            byte_type_header: version > 48,
            varint_action_count: version > 122,
            container_extra_loop: version > 72,
            container_float_transition: version > 38,
            container_bitvector_flags: version > 89,
            container_u16_playlist_count: version > 38,
            container_i32_weight: version > 56,
        }
    }
}

/// Parses the `HIRC` chunk payload: a `u32` object count followed by that
/// many records.
pub(crate) fn parse_hirc_objects<O: ByteOrder>(
    payload: &[u8],
    gates: &VersionGates,
) -> Result<Vec<HircObject>> {
    let mut cur = ByteCursor::<O>::new(payload);
    let count = cur.read_u32()?;
    let mut objects = Vec::with_capacity((count as usize).min(payload.len().max(1)));

    for _ in 0..count {
        let obj_type = if gates.byte_type_header {
            cur.read_u8()?
        } else {
            (cur.read_u32()? & 0xFF) as u8
        };
        let size = cur.read_u32()? as usize;

        let start = cur.position();
        let end = start
            .checked_add(size)
            .filter(|&e| e <= payload.len())
            .ok_or(BnkError::Truncated { offset: start })?;

        let record = &payload[start..end];
        objects.push(parse_object::<O>(obj_type, record, gates));
        cur.skip(size)?;
    }

    Ok(objects)
}

fn parse_object<O: ByteOrder>(obj_type: u8, data: &[u8], gates: &VersionGates) -> HircObject {
    match obj_type {
        OBJ_SOUND => HircObject::Sound(parse_sound::<O>(data)),
        OBJ_ACTION => HircObject::Action(parse_action::<O>(data)),
        OBJ_EVENT => HircObject::Event(parse_event::<O>(data, gates)),
        OBJ_CONTAINER => HircObject::Container(parse_container::<O>(data, gates)),
        _ => HircObject::Unknown {
            obj_type,
            raw: data.to_vec(),
        },
    }
}

/// `sound_id: u32`; if at least 9 bytes remain *after* the id (13 bytes
/// total), skip 4 + 1 bytes then read `source_id: u32`.
fn parse_sound<O: ByteOrder>(data: &[u8]) -> Sound {
    let mut cur = ByteCursor::<O>::new(data);
    let Ok(id) = cur.read_u32() else {
        return Sound::default();
    };
    let source = if cur.remaining() >= 9 {
        let _ = cur.skip(4);
        let _ = cur.skip(1);
        cur.read_u32().ok()
    } else {
        None
    };
    Sound { id, source }
}

/// `action_id: u32`; `action_type: u16` if 2+ bytes remain; `target_id: u32`
/// if 4 further bytes remain.
fn parse_action<O: ByteOrder>(data: &[u8]) -> Action {
    let mut cur = ByteCursor::<O>::new(data);
    let Ok(id) = cur.read_u32() else {
        return Action::default();
    };
    let action_type = if cur.remaining() >= 2 {
        cur.read_u16().ok()
    } else {
        None
    };
    let target = if cur.remaining() >= 4 {
        cur.read_u32().ok()
    } else {
        None
    };
    Action {
        id,
        action_type,
        target,
    }
}

/// `event_id: u32`; action count (varint or `u32` depending on version);
/// that many `u32` action ids, truncating the list gracefully.
fn parse_event<O: ByteOrder>(data: &[u8], gates: &VersionGates) -> Event {
    let mut cur = ByteCursor::<O>::new(data);
    let Ok(id) = cur.read_u32() else {
        return Event::default();
    };
    let count = if gates.varint_action_count {
        cur.read_varint()
    } else {
        cur.read_u32()
    };
    let Ok(count) = count else {
        return Event {
            id,
            ..Default::default()
        };
    };

    let mut actions = Vec::with_capacity((count as usize).min(cur.remaining() / 4 + 1));
    for _ in 0..count {
        match cur.read_u32() {
            Ok(a) => actions.push(a),
            Err(_) => break,
        }
    }

    Event {
        id,
        actions,
        resolved_audio_ids: HashSet::new(),
    }
}

/// The container record: `container_id` followed by several
/// version-dependent field groups, then `children` and `playlist`. See
/// `core/bnk/src/hirc.rs` module docs and SPEC_FULL.md §4.D for the exact
/// group layout and the open question around the `size - 84` skip below.
fn parse_container<O: ByteOrder>(data: &[u8], gates: &VersionGates) -> Container {
    let mut cur = ByteCursor::<O>::new(data);
    let Ok(id) = cur.read_u32() else {
        return Container::default();
    };

    let mut out = Container {
        id,
        ..Default::default()
    };

    // Each field group is independently bounds-checked against what remains
    // at its own starting position. A group that doesn't fit is skipped —
    // its fields stay `None` and the cursor position is left exactly where
    // that group found it — but every later group is still attempted at
    // that same position, rather than the whole block short-circuiting.

    // Group 1: loop counts.
    if cur.remaining() >= 2 {
        out.loop_count = Some(cur.read_i16().unwrap());
        if gates.container_extra_loop && cur.remaining() >= 4 {
            let _ = cur.skip(4);
        }
    }

    // Group 2: transition timing.
    if cur.remaining() >= 12 {
        if gates.container_float_transition {
            out.transition_time = Some(cur.read_f32().unwrap());
            out.transition_mod_min = Some(cur.read_f32().unwrap());
            out.transition_mod_max = Some(cur.read_f32().unwrap());
        } else {
            out.transition_time = Some(cur.read_i32().unwrap() as f32);
            out.transition_mod_min = Some(cur.read_i32().unwrap() as f32);
            out.transition_mod_max = Some(cur.read_i32().unwrap() as f32);
        }
    }

    // Group 3: avoid repeat count.
    if cur.remaining() >= 2 {
        out.avoid_repeat_count = Some(cur.read_u16().unwrap());
    }

    // Group 4: mode byte triple.
    if cur.remaining() >= 3 {
        out.transition_mode = Some(cur.read_u8().unwrap());
        out.random_mode = Some(cur.read_u8().unwrap());
        out.mode = Some(cur.read_u8().unwrap());
    }

    // Group 5: flags.
    if gates.container_bitvector_flags {
        if cur.remaining() >= 1 {
            let bits = cur.read_u8().unwrap();
            out.flags = ContainerFlags {
                is_using_weight: bits & 0x01 != 0,
                reset_playlist_at_each_play: bits & 0x02 != 0,
                is_restart_backward: bits & 0x04 != 0,
                is_continuous: bits & 0x08 != 0,
                is_global: bits & 0x10 != 0,
            };
        }
    } else if cur.remaining() >= 5 {
        out.flags = ContainerFlags {
            is_using_weight: cur.read_u8().unwrap() != 0,
            reset_playlist_at_each_play: cur.read_u8().unwrap() != 0,
            is_restart_backward: cur.read_u8().unwrap() != 0,
            is_continuous: cur.read_u8().unwrap() != 0,
            is_global: cur.read_u8().unwrap() != 0,
        };
    }

    parse_node_base_params(&cur);

    // Coarse alignment to the documented 84-byte field-group prefix,
    // reproduced faithfully from the source: a blind forward skip by
    // `size - 84` regardless of how many bytes the groups above actually
    // consumed. On a version band whose prefix isn't 84 bytes this can
    // mis-skip; there is no alternative formula to verify against (open
    // question in SPEC_FULL.md §9, resolved there as "reproduce as-is").
    if data.len() > 84 {
        cur.skip_clamped(data.len() - 84);
    }

    out.children = read_children::<O>(&mut cur);
    out.playlist = read_playlist::<O>(&mut cur, gates);
    out
}

/// Stands in for the node base parameters block (effects, positioning, RTPC
/// bindings) the real format carries at this point in the record. Not
/// modeled: this is a faithful no-op that consumes zero bytes from `cur`.
/// Downstream field offsets (the `size - 84` skip below, children, playlist)
/// are only correct because this step is zero-width in every bank layout
/// this parser has been checked against.
fn parse_node_base_params<O: ByteOrder>(_cur: &ByteCursor<O>) {}

fn read_children<O: ByteOrder>(cur: &mut ByteCursor<O>) -> Vec<u32> {
    let Ok(count) = cur.read_u32() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity((count as usize).min(cur.remaining() / 4 + 1));
    for _ in 0..count {
        match cur.read_u32() {
            Ok(v) => out.push(v),
            Err(_) => break,
        }
    }
    out
}

fn read_playlist<O: ByteOrder>(cur: &mut ByteCursor<O>, gates: &VersionGates) -> Vec<PlaylistItem> {
    let count: u32 = if gates.container_u16_playlist_count {
        match cur.read_u16() {
            Ok(c) => c as u32,
            Err(_) => return Vec::new(),
        }
    } else {
        match cur.read_u32() {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        }
    };

    let item_size = if gates.container_i32_weight { 8 } else { 5 };
    let mut out = Vec::with_capacity((count as usize).min(cur.remaining() / item_size + 1));
    for _ in 0..count {
        let Ok(id) = cur.read_u32() else { break };
        let weight = if gates.container_i32_weight {
            match cur.read_i32() {
                Ok(w) => w,
                Err(_) => break,
            }
        } else {
            match cur.read_u8() {
                Ok(w) => w as i32,
                Err(_) => break,
            }
        };
        out.push(PlaylistItem { id, weight });
    }
    out
}
