//! Event resolution end to end: parses a full synthetic bank (index + HIRC)
//! and checks the resolver walks action -> container -> sound edges the way
//! §4.G describes, including the playlist/children tie-break and resolver
//! soundness against the audio index.

mod common;

use bnk::{ACTION_TYPE_PLAY, BankFile, Endianness};
use common::{build_bank, encode_action, encode_container, encode_event, encode_sound, with_hirc};

#[test]
fn resolves_event_via_container_playlist() {
    let bank_bytes = build_bank(140, &[(0xDEAD, &[0; 4])]);
    let bank_bytes = with_hirc(
        bank_bytes,
        &[
            encode_event(1, &[10]),
            encode_action(10, ACTION_TYPE_PLAY, 100),
            encode_container(100, &[], &[(200, 1)]),
            encode_sound(200, 0xDEAD),
        ],
    );

    let mut bank = BankFile::parse(&bank_bytes, Endianness::Little).unwrap();
    let out = bank.resolve_events();

    assert_eq!(out.get("1").unwrap(), &vec![0xDEADu32]);
    assert!(bank.events[0].resolved_audio_ids.contains(&0xDEAD));
}

#[test]
fn resolves_event_via_container_children_fallback() {
    let bank_bytes = build_bank(140, &[(0xDEAD, &[0; 4])]);
    let bank_bytes = with_hirc(
        bank_bytes,
        &[
            encode_event(1, &[10]),
            encode_action(10, ACTION_TYPE_PLAY, 100),
            encode_container(100, &[200], &[]),
            encode_sound(200, 0xDEAD),
        ],
    );

    let mut bank = BankFile::parse(&bank_bytes, Endianness::Little).unwrap();
    let out = bank.resolve_events();

    assert_eq!(out.get("1").unwrap(), &vec![0xDEADu32]);
}

#[test]
fn events_with_no_resolvable_audio_come_back_empty_not_absent() {
    let bank_bytes = build_bank(140, &[]);
    let bank_bytes = with_hirc(bank_bytes, &[encode_event(1, &[])]);

    let mut bank = BankFile::parse(&bank_bytes, Endianness::Little).unwrap();
    let out = bank.resolve_events();

    assert_eq!(out.get("1"), Some(&Vec::<u32>::new()));
}

#[test]
fn resolved_ids_are_always_members_of_the_audio_index() {
    let bank_bytes = build_bank(140, &[(0xDEAD, &[0; 4])]);
    let bank_bytes = with_hirc(
        bank_bytes,
        &[
            encode_event(1, &[10, 20]),
            encode_action(10, ACTION_TYPE_PLAY, 200),
            // Action 20 plays a sound whose source isn't in the index; it
            // must not appear in the resolved set (resolver soundness).
            encode_action(20, ACTION_TYPE_PLAY, 201),
            encode_sound(200, 0xDEAD),
            encode_sound(201, 0xBEEF),
        ],
    );

    let mut bank = BankFile::parse(&bank_bytes, Endianness::Little).unwrap();
    let out = bank.resolve_events();

    assert_eq!(out.get("1").unwrap(), &vec![0xDEADu32]);
}

#[test]
fn multiple_events_resolve_independently() {
    let bank_bytes = build_bank(140, &[(0xA, &[0]), (0xB, &[0])]);
    let bank_bytes = with_hirc(
        bank_bytes,
        &[
            encode_event(1, &[10]),
            encode_event(2, &[11]),
            encode_action(10, ACTION_TYPE_PLAY, 100),
            encode_action(11, ACTION_TYPE_PLAY, 101),
            encode_sound(100, 0xA),
            encode_sound(101, 0xB),
        ],
    );

    let mut bank = BankFile::parse(&bank_bytes, Endianness::Little).unwrap();
    let out = bank.resolve_events();

    assert_eq!(out.get("1").unwrap(), &vec![0xAu32]);
    assert_eq!(out.get("2").unwrap(), &vec![0xBu32]);
}
