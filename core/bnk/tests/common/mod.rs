//! Synthetic bank builders shared by the integration tests. No checked-in
//! binary fixtures: every scenario is constructed in-memory so the suite
//! runs hermetically.

pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn bkhd(version: u32) -> Vec<u8> {
    chunk(b"BKHD", &version.to_le_bytes())
}

pub fn didx(entries: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (id, offset, size) in entries {
        payload.extend_from_slice(&id.to_le_bytes());
        payload.extend_from_slice(&offset.to_le_bytes());
        payload.extend_from_slice(&size.to_le_bytes());
    }
    chunk(b"DIDX", &payload)
}

/// Builds a minimal bank: `BKHD | DIDX | DATA`, no HIRC, no trailing bytes.
/// `entries` are `(id, payload)` pairs; offsets are computed as a prefix sum.
pub fn build_bank(version: u32, entries: &[(u32, &[u8])]) -> Vec<u8> {
    let mut index = Vec::new();
    let mut data = Vec::new();
    let mut offset = 0u32;
    for (id, bytes) in entries {
        index.push((*id, offset, bytes.len() as u32));
        data.extend_from_slice(bytes);
        offset += bytes.len() as u32;
    }

    let mut out = bkhd(version);
    out.extend(didx(&index));
    out.extend(chunk(b"DATA", &data));
    out
}

/// Appends a `HIRC` chunk (built from pre-encoded object records) to a bank
/// produced by [`build_bank`].
pub fn with_hirc(mut bank: Vec<u8>, objects: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = (objects.len() as u32).to_le_bytes().to_vec();
    for obj in objects {
        payload.extend_from_slice(obj);
    }
    bank.extend(chunk(b"HIRC", &payload));
    bank
}

/// Encodes one HIRC object record header + body for `version > 48` (the
/// `u8` type / `u32` size header used throughout these fixtures).
fn hirc_record(obj_type: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![obj_type];
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Big-endian base-128 varint encoding, the inverse of `ByteCursor::read_varint`.
fn write_varint(mut value: u32, out: &mut Vec<u8>) {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    groups.reverse();
    out.extend_from_slice(&groups);
}

/// Encodes an event record for the every-fixture-uses-version-140 world,
/// where the action count is a varint (`version > 122`).
pub fn encode_event(id: u32, action_ids: &[u32]) -> Vec<u8> {
    let mut body = id.to_le_bytes().to_vec();
    write_varint(action_ids.len() as u32, &mut body);
    for a in action_ids {
        body.extend_from_slice(&a.to_le_bytes());
    }
    hirc_record(0x04, &body)
}

pub fn encode_action(id: u32, action_type: u16, target: u32) -> Vec<u8> {
    let mut body = id.to_le_bytes().to_vec();
    body.extend_from_slice(&action_type.to_le_bytes());
    body.extend_from_slice(&target.to_le_bytes());
    hirc_record(0x03, &body)
}

/// The parser only treats `source_id` as present when at least 9 bytes
/// follow the sound id (13 bytes total): 4 skipped, 1 skipped, 4 read as
/// `source_id`. This encodes exactly that many bytes, no padding past the
/// boundary.
pub fn encode_sound(id: u32, source: u32) -> Vec<u8> {
    let mut body = id.to_le_bytes().to_vec();
    body.extend_from_slice(&[0u8; 4]);
    body.push(0);
    body.extend_from_slice(&source.to_le_bytes());
    hirc_record(0x02, &body)
}

/// Encodes a container record using the "modern" (version > 122) layout:
/// bitvector flags, float transition timing, i32 playlist weights.
///
/// Keeps the total record size at or under 84 bytes so the container
/// parser's `size - 84` realignment skip (see `src/hirc.rs`) never engages —
/// that skip is a faithfully-reproduced source quirk, not something a test
/// fixture should need to outwit. Callers needing more than a couple of
/// children/playlist entries should add a dedicated fixture instead of
/// growing this one past that boundary.
pub fn encode_container(id: u32, children: &[u32], playlist: &[(u32, i32)]) -> Vec<u8> {
    let mut body = id.to_le_bytes().to_vec();
    body.extend_from_slice(&0i16.to_le_bytes()); // loop_count
    body.extend_from_slice(&[0u8; 4]); // extra loop bytes, version > 72
    body.extend_from_slice(&0.0f32.to_le_bytes()); // transition_time
    body.extend_from_slice(&0.0f32.to_le_bytes()); // trans_mod_min
    body.extend_from_slice(&0.0f32.to_le_bytes()); // trans_mod_max
    body.extend_from_slice(&0u16.to_le_bytes()); // avoid_repeat_count
    body.extend_from_slice(&[0u8, 0u8, 0u8]); // mode triple
    body.push(0); // flags bitvector

    body.extend_from_slice(&(children.len() as u32).to_le_bytes());
    for c in children {
        body.extend_from_slice(&c.to_le_bytes());
    }
    body.extend_from_slice(&(playlist.len() as u16).to_le_bytes());
    for (pid, weight) in playlist {
        body.extend_from_slice(&pid.to_le_bytes());
        body.extend_from_slice(&weight.to_le_bytes());
    }

    assert!(
        body.len() <= 84,
        "container fixture grew past the size-84 realignment boundary"
    );
    hirc_record(0x05, &body)
}
