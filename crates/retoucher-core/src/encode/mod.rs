//! Image encoding for export and history snapshots.
//!
//! PNG is the only output format: it is lossless and keeps the alpha channel,
//! so an erased region survives export and an undo restores exact samples.

mod png;

pub use png::{encode_png, EncodeError, PNG_SIGNATURE};
