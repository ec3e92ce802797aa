//! Packed instance decoding
//!
//! World Creator stores each object group as a base64 blob of little-endian
//! float32 values, nine per instance. Bytes beyond the declared count are
//! ignored; fewer bytes than declared is an error for the whole group.

use super::types::{InstanceRecord, ObjectGroup, RECORD_FIELDS, RECORD_SIZE};
use crate::error::RecordError;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Standard alphabet, padding optional on decode
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parse a `DataCount` value into a record count
pub fn parse_data_count(value: &str) -> Result<usize, RecordError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| RecordError::MalformedCount(value.to_string()))
}

/// Decode `count` records from a base64 payload
pub fn decode_records(data: &str, count: usize) -> Result<Vec<InstanceRecord>, RecordError> {
    let compact: Vec<u8> = data
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = BASE64.decode(&compact)?;

    let required = count.saturating_mul(RECORD_SIZE);
    if bytes.len() < required {
        return Err(RecordError::Truncated {
            declared: count,
            required,
            actual: bytes.len(),
        });
    }

    let records = bytes[..required]
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let mut fields = [0f32; RECORD_FIELDS];
            for (field, raw) in fields.iter_mut().zip(chunk.chunks_exact(4)) {
                *field = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }
            InstanceRecord::from_fields(fields)
        })
        .collect();

    Ok(records)
}

/// Pack records back into the World Creator base64 layout
pub fn encode_records(records: &[InstanceRecord]) -> String {
    let bytes: Vec<u8> = records
        .iter()
        .flat_map(|r| r.to_fields())
        .flat_map(f32::to_le_bytes)
        .collect();
    BASE64.encode(bytes)
}

impl ObjectGroup {
    /// Decode every instance of this group
    pub fn records(&self) -> Result<Vec<InstanceRecord>, RecordError> {
        let count = parse_data_count(&self.data_count)?;
        decode_records(&self.data, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: f32) -> InstanceRecord {
        InstanceRecord::from_fields([
            seed,
            seed * 0.5,
            -seed,
            0.0,
            1.25,
            0.0,
            0.38268343,
            0.0,
            0.9238795,
        ])
    }

    #[test]
    fn test_parse_data_count() {
        assert_eq!(parse_data_count("12").unwrap(), 12);
        assert_eq!(parse_data_count(" 3 ").unwrap(), 3);
        assert_eq!(parse_data_count("0").unwrap(), 0);
        assert!(matches!(
            parse_data_count("-1"),
            Err(RecordError::MalformedCount(_))
        ));
        assert!(matches!(
            parse_data_count("abc"),
            Err(RecordError::MalformedCount(_))
        ));
        assert!(parse_data_count("").is_err());
    }

    #[test]
    fn test_decode_field_order() {
        let encoded = encode_records(&[InstanceRecord::from_fields([
            100.0, 5.0, 50.0, 0.0, 2.5, 0.0, 0.0, 0.0, 1.0,
        ])]);
        let records = decode_records(&encoded, 1).unwrap();
        assert_eq!(records.len(), 1);
        let r = records[0];
        assert_eq!(r.x, 100.0);
        assert_eq!(r.height, 5.0);
        assert_eq!(r.depth, 50.0);
        assert_eq!(r.scale, 2.5);
        assert_eq!(r.rotation, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let records: Vec<_> = (0..5).map(|i| sample(i as f32 * 13.7 + 0.1)).collect();
        let encoded = encode_records(&records);
        let decoded = decode_records(&encoded, records.len()).unwrap();
        assert_eq!(decoded, records);
        assert_eq!(encode_records(&decoded), encoded);
    }

    #[test]
    fn test_excess_bytes_ignored() {
        let records = vec![sample(1.0), sample(2.0), sample(3.0)];
        let encoded = encode_records(&records);
        let decoded = decode_records(&encoded, 2).unwrap();
        assert_eq!(decoded, records[..2].to_vec());
    }

    #[test]
    fn test_truncated_payload() {
        let encoded = encode_records(&[sample(1.0)]);
        match decode_records(&encoded, 2) {
            Err(RecordError::Truncated {
                declared,
                required,
                actual,
            }) => {
                assert_eq!(declared, 2);
                assert_eq!(required, 72);
                assert_eq!(actual, 36);
            }
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_and_missing_padding() {
        let encoded = encode_records(&[sample(4.0)]);
        let wrapped = format!("\n  {}\n  {}\n", &encoded[..20], &encoded[20..]);
        assert_eq!(decode_records(&wrapped, 1).unwrap(), vec![sample(4.0)]);

        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(decode_records(unpadded, 1).unwrap(), vec![sample(4.0)]);
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decode_records("not*base64!", 1),
            Err(RecordError::Base64(_))
        ));
    }

    #[test]
    fn test_zero_count_on_empty_payload() {
        assert!(decode_records("", 0).unwrap().is_empty());
    }

    #[test]
    fn test_group_records() {
        let group = ObjectGroup {
            tag: "Pine".to_string(),
            data_count: "1".to_string(),
            data: encode_records(&[sample(7.0)]),
        };
        assert_eq!(group.records().unwrap(), vec![sample(7.0)]);

        let bad = ObjectGroup {
            data_count: "one".to_string(),
            ..group
        };
        assert!(matches!(bad.records(), Err(RecordError::MalformedCount(_))));
    }
}
