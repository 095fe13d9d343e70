//! Item-container-slot blob codec: per-slot access permissions plus the
//! container's corruption progress.

use tracing::warn;

use crate::archive::{Reader, Result, Writer};
use crate::rawdata::{FallbackRecord, RawData};
use crate::structs::{ItemSlotRecord, Permission};

/// Decodes one slot blob. A zero-length payload decodes to the explicit
/// no-data sentinel (`None`), which encodes back to zero bytes; any failure
/// degrades to a byte-preserving fallback.
pub fn decode_bytes(bytes: Vec<u8>) -> RawData<Option<ItemSlotRecord>> {
    if bytes.is_empty() {
        return RawData::Record(None);
    }
    let result = {
        let mut reader = Reader::new(&bytes);
        read_slots(&mut reader)
    };
    match result {
        Ok(record) => RawData::Record(Some(record)),
        Err(e) => {
            warn!(error = %e, "keeping item container slots as raw fallback");
            RawData::Fallback(FallbackRecord {
                bytes,
                error: e.to_string(),
            })
        }
    }
}

pub fn encode_bytes(record: &Option<ItemSlotRecord>) -> Result<Vec<u8>> {
    let Some(record) = record else {
        return Ok(Vec::new());
    };
    let mut w = Writer::new();
    w.tarray(&record.permission.type_a, |w, b| w.u8(*b))?;
    w.tarray(&record.permission.type_b, |w, b| w.u8(*b))?;
    w.tarray(&record.permission.item_static_ids, |w, s| w.fstring(s))?;
    w.f32(record.corruption_progress_value)?;
    w.write_all(&record.trailing_unparsed_data)?;
    Ok(w.into_bytes())
}

/// Decode shim: replaces a raw slot with its structured record.
pub fn decode_in_place(value: &mut RawData<Option<ItemSlotRecord>>) {
    if let Some(bytes) = value.take_bytes() {
        *value = decode_bytes(bytes);
    }
}

/// Encode shim: replaces a structured slot with its raw bytes.
pub fn encode_in_place(value: &mut RawData<Option<ItemSlotRecord>>) -> Result<()> {
    value.reencode(encode_bytes)
}

fn read_slots(r: &mut Reader<'_>) -> Result<ItemSlotRecord> {
    let permission = Permission {
        type_a: r.tarray(|r| r.u8())?,
        type_b: r.tarray(|r| r.u8())?,
        item_static_ids: r.tarray(|r| r.fstring())?,
    };
    let corruption_progress_value = r.f32()?;
    let trailing_unparsed_data = r.read_to_end();
    Ok(ItemSlotRecord {
        permission,
        corruption_progress_value,
        trailing_unparsed_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ItemSlotRecord {
        ItemSlotRecord {
            permission: Permission {
                type_a: vec![1, 0, 1],
                type_b: vec![0],
                item_static_ids: vec!["PalSphere".into(), "回復薬".into()],
            },
            corruption_progress_value: 0.25,
            trailing_unparsed_data: Vec::new(),
        }
    }

    #[test]
    fn zero_length_blob_is_the_no_data_sentinel() {
        let decoded = decode_bytes(Vec::new());
        assert_eq!(decoded.as_record(), Some(&None));
        assert_eq!(encode_bytes(&None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn slot_record_roundtrips() {
        let bytes = encode_bytes(&Some(sample())).unwrap();
        let decoded = decode_bytes(bytes.clone());
        assert_eq!(decoded.as_record(), Some(&Some(sample())));
        assert_eq!(encode_bytes(decoded.as_record().unwrap()).unwrap(), bytes);
    }

    #[test]
    fn trailing_bytes_are_preserved() {
        let mut bytes = encode_bytes(&Some(sample())).unwrap();
        bytes.extend_from_slice(&[9, 8, 7]);
        let decoded = decode_bytes(bytes.clone());
        let record = decoded.as_record().unwrap().as_ref().unwrap();
        assert_eq!(record.trailing_unparsed_data, vec![9, 8, 7]);
        assert_eq!(encode_bytes(&Some(record.clone())).unwrap(), bytes);
    }

    #[test]
    fn malformed_blob_falls_back_with_bytes_intact() {
        // A count that overruns the payload.
        let bytes = vec![0xFF, 0xFF, 0xFF, 0x7F, 1, 2, 3];
        let mut slot = decode_bytes(bytes.clone());
        assert!(matches!(slot, RawData::Fallback(_)));
        encode_in_place(&mut slot).unwrap();
        assert_eq!(slot, RawData::Bytes(bytes));
    }

    #[test]
    fn shims_swap_record_and_bytes_in_place() {
        let bytes = encode_bytes(&Some(sample())).unwrap();
        let mut slot = RawData::Bytes(bytes.clone());
        decode_in_place(&mut slot);
        assert_eq!(slot.as_record(), Some(&Some(sample())));
        encode_in_place(&mut slot).unwrap();
        assert_eq!(slot, RawData::Bytes(bytes));
    }
}
