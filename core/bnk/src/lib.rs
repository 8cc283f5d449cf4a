//! Parses, analyzes, and rewrites Wwise-format audio soundbank files.
//!
//! Two capabilities sit on top of a shared chunk/object-record parser:
//! a patching pipeline ([`BankFile::queue_replacement`] +
//! [`BankFile::serialize`]) that swaps embedded audio payloads by id and
//! rebuilds the audio index, and an event resolver
//! ([`BankFile::resolve_events`]) that walks the object hierarchy to find
//! every audio source an event could play.
//!
//! This crate does not decode audio payloads, validate replacement bytes as
//! audio, edit the object hierarchy, parse a command line, or configure a
//! `tracing` subscriber — those are all collaborator concerns. It does emit
//! structured `tracing` events at the natural seams (bank scan, patch apply,
//! resolve) so a caller that installs a subscriber gets that context for
//! free.

mod catalog;
mod cursor;
mod error;
mod hirc;
mod patcher;
mod reader;
mod resolver;
mod scanner;
mod types;

pub use error::{BnkError, Result};
pub use patcher::{ByteSource, PatchOptions};
pub use types::{
    ACTION_TYPE_PLAY, Action, ActionId, AudioSourceId, BankFile, BankStats, Container,
    ContainerFlags, ContainerId, Endianness, Event, EventId, HircObject, IndexEntry,
    PlaylistItem, Sound, SoundId,
};
