//! Encoding and decoding of the vendor value formats carried inside SNMP `Opaque` values.
//!
//! Floating point setpoints and measurements are exchanged as a small TLV:
//! `0x9f 0x78 0x04 <4-byte big-endian IEEE-754 float>`. The outer `Opaque` wrapper is
//! added and removed by the transport.

use core::cmp::Ordering;

use thiserror::Error;

/// Type tag of the vendor FLOATTYPE.
pub const FLOAT_TAG: [u8; 2] = [0x9f, 0x78];
/// Type tag of the vendor DOUBLETYPE.
pub const DOUBLE_TAG: [u8; 2] = [0x9f, 0x79];
/// Payload length of a FLOATTYPE value.
pub const FLOAT_LEN: u8 = 0x04;
/// BER tag of an `Opaque` wrapper.
pub const OPAQUE_TAG: u8 = 0x44;

/// Truncation used by [`decode_ber_numeric`] when none is given.
pub const DEFAULT_PRECISION: u32 = 4;

/// Failures to interpret bytes received from the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Not a FLOATTYPE value: {0:02x?}")]
    NotFloatType(Vec<u8>),
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
    #[error("Numeric payload is {0} bytes, expected 4 or 8")]
    PayloadLength(usize),
    #[error("Length field says {declared} bytes but {available} are present")]
    Truncated { declared: usize, available: usize },
    #[error("{0} bytes follow the declared length")]
    TrailingBytes(usize),
    #[error("Unexpected value type: {0}")]
    UnexpectedType(&'static str),
    #[error("Response carried no value")]
    MissingValue,
}

/// Encode `value` as a FLOATTYPE TLV.
pub fn encode_float(value: f32) -> [u8; 7] {
    let mut tlv = [0u8; 7];
    tlv[0..2].copy_from_slice(&FLOAT_TAG);
    tlv[2] = FLOAT_LEN;
    tlv[3..7].copy_from_slice(&value.to_be_bytes());
    tlv
}

/// Decode a FLOATTYPE TLV back into a float.
pub fn decode_float(wire: &[u8]) -> Result<f32, DecodeError> {
    if wire.len() < 7 || wire[0..2] != FLOAT_TAG || wire[2] != FLOAT_LEN {
        return Err(DecodeError::NotFloatType(wire.to_vec()));
    }
    let mut payload = [0u8; 4];
    payload.copy_from_slice(&wire[3..7]);
    Ok(f32::from_be_bytes(payload))
}

/// Decode a hex encoded BER numeric, e.g. `440b9f7908405ec00000000000` for 123.0.
///
/// Accepts an optional `0x` prefix, an optional `Opaque` wrapper and an optional FLOATTYPE/DOUBLETYPE tag.
/// The payload width follows the embedded length field: 4 bytes decode as single precision, 8 bytes as
/// double precision. The result is truncated, not rounded, to `precision` decimal digits.
pub fn decode_ber_numeric(hex_str: &str, precision: u32) -> Result<f64, DecodeError> {
    let trimmed = hex_str.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;

    let payload = unwrap_tlv(&bytes, &[OPAQUE_TAG])?;
    let payload = match payload.get(0..2) {
        Some(tag) if tag == FLOAT_TAG || tag == DOUBLE_TAG => unwrap_tlv(payload, tag)?,
        _ => payload,
    };

    let value = match payload.len() {
        4 => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(payload);
            f32::from_be_bytes(raw) as f64
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(payload);
            f64::from_be_bytes(raw)
        }
        n => return Err(DecodeError::PayloadLength(n)),
    };
    Ok(truncate(value, precision))
}

/// Strip `tag` and its one byte length field from `data`.
///
/// Input that is already a bare 4 or 8 byte payload is returned as is, since a float such as 1000.0
/// (`447a0000`) may start with the tag byte. A wrapper must account for every byte that follows it.
fn unwrap_tlv<'a>(data: &'a [u8], tag: &[u8]) -> Result<&'a [u8], DecodeError> {
    if matches!(data.len(), 4 | 8) || !data.starts_with(tag) {
        return Ok(data);
    }
    let (&len, body) = data[tag.len()..].split_first().ok_or(DecodeError::Truncated {
        declared: 1,
        available: 0,
    })?;
    let len = len as usize;
    match len.cmp(&body.len()) {
        Ordering::Equal => Ok(body),
        Ordering::Greater => Err(DecodeError::Truncated {
            declared: len,
            available: body.len(),
        }),
        Ordering::Less => Err(DecodeError::TrailingBytes(body.len() - len)),
    }
}

fn truncate(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(precision as i32);
    (value * scale).trunc() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_float_layout() {
        // 123.0f32 == 0x42f60000
        assert_eq!(encode_float(123.0), [0x9f, 0x78, 0x04, 0x42, 0xf6, 0x00, 0x00]);
        assert_eq!(encode_float(-1.0), [0x9f, 0x78, 0x04, 0xbf, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn float_round_trip() {
        let smallest_subnormal = f32::from_bits(1);
        for value in [0.0, 1.0, -1.0, 123.0, 3.4e38, smallest_subnormal] {
            let decoded = decode_float(&encode_float(value)).unwrap();
            assert_eq!(decoded.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn decode_float_rejects_other_tags() {
        let wire = [0x9f, 0x79, 0x04, 0x42, 0xf6, 0x00, 0x00];
        assert!(matches!(decode_float(&wire), Err(DecodeError::NotFloatType(_))));

        let wrong_len = [0x9f, 0x78, 0x08, 0x42, 0xf6, 0x00, 0x00];
        assert!(decode_float(&wrong_len).is_err());

        let short = [0x9f, 0x78, 0x04, 0x42, 0xf6, 0x00];
        assert!(decode_float(&short).is_err());
    }

    #[test]
    fn decode_ber_double_in_opaque() {
        let value = decode_ber_numeric("440b9f7908405ec00000000000", DEFAULT_PRECISION).unwrap();
        assert_eq!(value, 123.0);

        let value = decode_ber_numeric("0x9f7908405ec00000000000", DEFAULT_PRECISION).unwrap();
        assert_eq!(value, 123.0);
    }

    #[test]
    fn decode_ber_float_variants() {
        assert_eq!(decode_ber_numeric("44079f780442f60000", 4).unwrap(), 123.0);
        assert_eq!(decode_ber_numeric("9f780442f60000", 4).unwrap(), 123.0);
        assert_eq!(decode_ber_numeric("42f60000", 4).unwrap(), 123.0);
        assert_eq!(decode_ber_numeric("405ec00000000000", 4).unwrap(), 123.0);
    }

    #[test]
    fn decode_ber_truncates() {
        // 0x3faaaaab == 1.3333334f32
        assert_eq!(decode_ber_numeric("3faaaaab", 4).unwrap(), 1.3333);
        assert_eq!(decode_ber_numeric("3faaaaab", 1).unwrap(), 1.3);
        // truncation goes towards zero for negatives
        assert_eq!(decode_ber_numeric("bfaaaaab", 2).unwrap(), -1.33);
    }

    #[test]
    fn decode_ber_rejects_bad_payloads() {
        assert_eq!(decode_ber_numeric("42f600", 4), Err(DecodeError::PayloadLength(3)));
        assert!(matches!(decode_ber_numeric("zz", 4), Err(DecodeError::InvalidHex(_))));
        assert_eq!(
            decode_ber_numeric("9f780842f60000", 4),
            Err(DecodeError::Truncated {
                declared: 8,
                available: 4
            })
        );
        assert_eq!(
            decode_ber_numeric("440b9f7908405ec00000000000ffff", 4),
            Err(DecodeError::TrailingBytes(2))
        );
    }

    #[test]
    fn bare_floats_starting_with_the_opaque_tag() {
        // 0x447a0000 == 1000.0f32
        assert_eq!(decode_ber_numeric("447a0000", 4).unwrap(), 1000.0);
        // 0x44020000 == 520.0f32, the second byte looks like a length
        assert_eq!(decode_ber_numeric("44020000", 4).unwrap(), 520.0);
        assert_eq!(decode_ber_numeric("4404447a0000", 4).unwrap(), 1000.0);
    }
}
