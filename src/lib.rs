//! # Save RawData Codec Library
//!
//! This library provides **structured decoding and byte-faithful re-encoding**
//! for the opaque `RawData` blobs embedded in Palworld save-game property
//! trees: social-group state, building-piece connectors, and item-container
//! slot permissions.
//!
//! ## Disclaimer
//!
//! - This library is **not affiliated with the game developer**.
//! - The blob layouts were **reverse-engineered**; unknown trailing regions
//!   are preserved verbatim rather than interpreted.
//! - Full validation of re-encoded saves can **only be done by loading them
//!   in the game**.
//!
//! ## Purpose
//!
//! - The structs in [`structs`] are **plain data containers** intended as a
//!   stable schema for inspecting or editing blob contents.
//! - All decoding and encoding goes through the sub-codecs in [`rawdata`];
//!   the bounded cursor in [`archive`] carries the wire primitives.
//! - An unmodified record always re-encodes to the exact original bytes;
//!   payloads that cannot be understood round-trip as opaque fallbacks
//!   instead of failing the surrounding save conversion.
//!
//! ## Example
//! ```rust
//! use pal_rawdata::rawdata::{connector, RawData};
//! use pal_rawdata::structs::ConnectorRecord;
//!
//! // A zero-length connector payload is the canonical "no connectors" state.
//! let mut slot = RawData::Bytes(Vec::new());
//! connector::decode_in_place(&mut slot);
//! assert_eq!(slot.as_record(), Some(&ConnectorRecord::Empty));
//!
//! // Splicing back restores the original bytes.
//! connector::encode_in_place(&mut slot).unwrap();
//! assert_eq!(slot, RawData::Bytes(Vec::new()));
//! ```

pub mod archive;
pub mod rawdata;
pub mod structs;

pub use archive::{Error, Reader, Writer};
pub use rawdata::{FallbackRecord, RawData, Strictness};
