//! Building-piece connector blob codec.
//!
//! Unlike the group blob, the connector payload carries no discriminant: the
//! primary section is always present and secondary sections are read until
//! the window is exhausted. Stairs conventionally carry 2 secondary sections
//! and roofs 4; other counts decode fine and are only flagged.

use tracing::warn;

use crate::archive::{Reader, Result, Writer};
use crate::rawdata::{FallbackRecord, RawData};
use crate::structs::{ConnectInfoItem, Connector, ConnectorRecord};

/// Decodes one connector blob. A zero-length payload is the canonical
/// "no connectors" state; any failure degrades to a byte-preserving fallback.
pub fn decode_bytes(bytes: Vec<u8>) -> RawData<ConnectorRecord> {
    if bytes.is_empty() {
        return RawData::Record(ConnectorRecord::Empty);
    }
    let result = {
        let mut reader = Reader::new(&bytes);
        read_connector(&mut reader)
    };
    match result {
        Ok(record) => RawData::Record(record),
        Err(e) => {
            warn!(error = %e, "keeping connector record as raw fallback");
            RawData::Fallback(FallbackRecord {
                bytes,
                error: e.to_string(),
            })
        }
    }
}

pub fn encode_bytes(record: &ConnectorRecord) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    match record {
        ConnectorRecord::Empty => {}
        ConnectorRecord::Connected {
            supported_level,
            connect,
            other_connectors,
        } => {
            w.i32(*supported_level)?;
            write_connector(&mut w, connect)?;
            for other in other_connectors {
                write_connector(&mut w, other)?;
            }
        }
    }
    Ok(w.into_bytes())
}

/// Decode shim: replaces a raw slot with its structured record.
pub fn decode_in_place(value: &mut RawData<ConnectorRecord>) {
    if let Some(bytes) = value.take_bytes() {
        *value = decode_bytes(bytes);
    }
}

/// Encode shim: replaces a structured slot with its raw bytes.
pub fn encode_in_place(value: &mut RawData<ConnectorRecord>) -> Result<()> {
    value.reencode(encode_bytes)
}

fn read_connector(r: &mut Reader<'_>) -> Result<ConnectorRecord> {
    let supported_level = r.i32()?;
    let connect = read_section(r)?;
    let mut other_connectors = Vec::new();
    while !r.eof() {
        other_connectors.push(read_section(r)?);
    }
    if !matches!(other_connectors.len(), 0 | 2 | 4) {
        warn!(
            count = other_connectors.len(),
            "unknown connector type with unexpected section count"
        );
    }
    Ok(ConnectorRecord::Connected {
        supported_level,
        connect,
        other_connectors,
    })
}

fn read_section(r: &mut Reader<'_>) -> Result<Connector> {
    Ok(Connector {
        index: r.u8()?,
        any_place: r.tarray(read_connect_info)?,
    })
}

fn read_connect_info(r: &mut Reader<'_>) -> Result<ConnectInfoItem> {
    Ok(ConnectInfoItem {
        connect_to_model_instance_id: r.guid()?,
        index: r.u8()?,
    })
}

fn write_connector(w: &mut Writer, section: &Connector) -> Result<()> {
    w.u8(section.index)?;
    w.tarray(&section.any_place, |w, item| {
        w.guid(&item.connect_to_model_instance_id)?;
        w.u8(item.index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn section(index: u8, targets: u8) -> Connector {
        Connector {
            index,
            any_place: (0..targets)
                .map(|n| ConnectInfoItem {
                    connect_to_model_instance_id: Uuid::from_bytes([n + 1; 16]),
                    index: n,
                })
                .collect(),
        }
    }

    fn stairs() -> ConnectorRecord {
        ConnectorRecord::Connected {
            supported_level: 2,
            connect: section(0, 1),
            other_connectors: vec![section(1, 2), section(2, 0)],
        }
    }

    #[test]
    fn empty_blob_roundtrips_to_zero_bytes() {
        let decoded = decode_bytes(Vec::new());
        assert_eq!(decoded.as_record(), Some(&ConnectorRecord::Empty));
        assert_eq!(encode_bytes(&ConnectorRecord::Empty).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn stairs_roundtrip() {
        let bytes = encode_bytes(&stairs()).unwrap();
        let decoded = decode_bytes(bytes.clone());
        assert_eq!(decoded.as_record(), Some(&stairs()));
        assert_eq!(encode_bytes(decoded.as_record().unwrap()).unwrap(), bytes);
    }

    #[test]
    fn unconventional_section_count_decodes_anyway() {
        let record = ConnectorRecord::Connected {
            supported_level: 1,
            connect: section(0, 0),
            other_connectors: vec![section(1, 1), section(2, 1), section(3, 1)],
        };
        let bytes = encode_bytes(&record).unwrap();
        let decoded = decode_bytes(bytes.clone());
        assert_eq!(decoded.as_record(), Some(&record));
        assert_eq!(encode_bytes(decoded.as_record().unwrap()).unwrap(), bytes);
    }

    #[test]
    fn truncated_blob_falls_back_with_bytes_intact() {
        let bytes = encode_bytes(&stairs()).unwrap();
        let truncated = bytes[..bytes.len() - 7].to_vec();
        let mut slot = decode_bytes(truncated.clone());
        assert!(matches!(slot, RawData::Fallback(_)));
        encode_in_place(&mut slot).unwrap();
        assert_eq!(slot, RawData::Bytes(truncated));
    }

    #[test]
    fn shims_swap_record_and_bytes_in_place() {
        let bytes = encode_bytes(&stairs()).unwrap();
        let mut slot = RawData::Bytes(bytes.clone());
        decode_in_place(&mut slot);
        assert_eq!(slot.as_record(), Some(&stairs()));
        encode_in_place(&mut slot).unwrap();
        assert_eq!(slot, RawData::Bytes(bytes));
    }

    #[test]
    fn any_successful_decode_reencodes_identically() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..200 {
            let len = rng.random_range(0..96);
            let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            match decode_bytes(bytes.clone()) {
                RawData::Record(record) => {
                    assert_eq!(encode_bytes(&record).unwrap(), bytes);
                }
                RawData::Fallback(fallback) => assert_eq!(fallback.bytes, bytes),
                RawData::Bytes(_) => unreachable!(),
            }
        }
    }
}
