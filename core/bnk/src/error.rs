use thiserror::Error;

/// Error taxonomy for the parser, patcher, resolver and catalog.
///
/// Parsing recovers from truncation *inside* a HIRC object record (missing
/// fields become `None`); the variants here are for failures that cannot be
/// recovered from at the call site.
#[derive(Error, Debug)]
pub enum BnkError {
    #[error("truncated bank: expected more data at offset {offset}")]
    Truncated { offset: usize },

    #[error("bad header: expected a BKHD chunk (optionally behind an AKBK envelope)")]
    BadHeader,

    #[error("bank has no DIDX chunk; patching, cataloging and export require an audio index")]
    MissingIndex,

    #[error("audio id {0} is not present in the bank's audio index")]
    UnknownAudioId(u32),

    #[error("replacement for audio id {0} could not be read")]
    ReplacementUnreadable(u32),

    #[error("failed to write to output sink")]
    SinkFailure(#[source] std::io::Error),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BnkError>;
