//! Sub-codecs for the opaque `RawData` blobs the outer property tree carries,
//! plus the splice glue that swaps structured records in and out of the tree.

pub mod connector;
pub mod group;
pub mod item_container_slots;

use crate::archive::Result;
use serde::{Deserialize, Serialize};

/// Opaque stand-in for a blob that could not (or should not) be decoded.
/// Encode re-emits the stored bytes unchanged; the error text is advisory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRecord {
    pub bytes: Vec<u8>,
    pub error: String,
}

/// Decode policy for codecs that support both failure granularities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Any read failure aborts the record; its raw bytes stay in the tree.
    Strict,
    /// Truncated fixed-width fields are replaced by defaults and counted
    /// sequences keep their readable prefix; only failures the guards cannot
    /// anticipate degrade the record to a [`FallbackRecord`].
    #[default]
    Lenient,
}

/// One blob-bearing slot of the property tree.
///
/// The decode shims replace `Bytes` with `Record` (or `Fallback`); the encode
/// shims do the mirror replacement before the outer tree writer runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RawData<T> {
    /// Raw payload exactly as stored in the save.
    Bytes(Vec<u8>),
    /// Structured record spliced in place of the payload.
    Record(T),
    /// Undecodable payload preserved verbatim.
    Fallback(FallbackRecord),
}

impl<T> RawData<T> {
    /// Moves the raw payload out for decoding. Already-spliced slots are
    /// left alone.
    pub fn take_bytes(&mut self) -> Option<Vec<u8>> {
        match self {
            RawData::Bytes(bytes) => Some(std::mem::take(bytes)),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&T> {
        match self {
            RawData::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Re-encodes the slot back to raw bytes: records go through the codec's
    /// encoder, fallbacks re-emit their stored bytes, raw slots are untouched.
    pub fn reencode(&mut self, encoder: impl FnOnce(&T) -> Result<Vec<u8>>) -> Result<()> {
        let bytes = match self {
            RawData::Bytes(_) => return Ok(()),
            RawData::Record(record) => encoder(record)?,
            RawData::Fallback(fallback) => fallback.bytes.clone(),
        };
        *self = RawData::Bytes(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reencode_leaves_raw_slots_untouched() {
        let mut slot: RawData<()> = RawData::Bytes(vec![1, 2, 3]);
        slot.reencode(|_| Ok(vec![9, 9])).unwrap();
        assert_eq!(slot, RawData::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn reencode_restores_fallback_bytes() {
        let mut slot: RawData<()> = RawData::Fallback(FallbackRecord {
            bytes: vec![7, 7, 7],
            error: "short read".into(),
        });
        slot.reencode(|_| Ok(Vec::new())).unwrap();
        assert_eq!(slot, RawData::Bytes(vec![7, 7, 7]));
    }
}
