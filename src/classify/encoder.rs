// Model input encoding
// Packs a beat's feature vector into the flat f32 byte layout the model reads

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of features in one beat segment
pub const BEAT_LENGTH: usize = 2160;

/// Size in bytes of one encoded beat
pub const ENCODED_LENGTH: usize = BEAT_LENGTH * std::mem::size_of::<f32>();

#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    #[error("Expected {expected} features, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Encoded buffer is {0} bytes, not a whole number of f32 values")]
    TruncatedBuffer(usize),
}

/// Byte order of the encoded floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Host byte order (what the on-device model expects)
    #[default]
    Native,
    Little,
    Big,
}

impl Endianness {
    /// Collapse `Native` to the concrete order of this host
    pub fn resolve(self) -> Self {
        match self {
            Endianness::Native if cfg!(target_endian = "big") => Endianness::Big,
            Endianness::Native => Endianness::Little,
            other => other,
        }
    }
}

/// An encoded beat, ready for the inference engine
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBeat {
    bytes: Vec<u8>,
    endianness: Endianness,
}

impl EncodedBeat {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Recover the feature values
    pub fn decode(&self) -> Result<Vec<f32>, EncodingError> {
        decode_with(&self.bytes, self.endianness)
    }
}

/// Encode in host byte order
pub fn encode(features: &[f32]) -> Result<EncodedBeat, EncodingError> {
    encode_with(features, Endianness::Native)
}

/// Encode with an explicit byte order
pub fn encode_with(features: &[f32], endianness: Endianness) -> Result<EncodedBeat, EncodingError> {
    if features.len() != BEAT_LENGTH {
        return Err(EncodingError::LengthMismatch {
            expected: BEAT_LENGTH,
            actual: features.len(),
        });
    }

    let mut bytes = vec![0u8; ENCODED_LENGTH];
    match endianness {
        Endianness::Native => NativeEndian::write_f32_into(features, &mut bytes),
        Endianness::Little => LittleEndian::write_f32_into(features, &mut bytes),
        Endianness::Big => BigEndian::write_f32_into(features, &mut bytes),
    }

    Ok(EncodedBeat { bytes, endianness })
}

/// Decode a raw buffer of packed f32 values
pub fn decode_with(bytes: &[u8], endianness: Endianness) -> Result<Vec<f32>, EncodingError> {
    let width = std::mem::size_of::<f32>();
    if bytes.len() % width != 0 {
        return Err(EncodingError::TruncatedBuffer(bytes.len()));
    }

    let mut values = vec![0f32; bytes.len() / width];
    match endianness {
        Endianness::Native => NativeEndian::read_f32_into(bytes, &mut values),
        Endianness::Little => LittleEndian::read_f32_into(bytes, &mut values),
        Endianness::Big => BigEndian::read_f32_into(bytes, &mut values),
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<f32> {
        (0..BEAT_LENGTH).map(|i| i as f32 * 0.001 - 1.0).collect()
    }

    #[test]
    fn test_encoded_size() {
        let encoded = encode(&ramp()).unwrap();
        assert_eq!(encoded.len(), BEAT_LENGTH * 4);
        assert_eq!(encoded.len(), ENCODED_LENGTH);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let result = encode(&vec![0.0; BEAT_LENGTH - 1]);
        assert_eq!(
            result,
            Err(EncodingError::LengthMismatch {
                expected: BEAT_LENGTH,
                actual: BEAT_LENGTH - 1,
            })
        );

        assert!(encode(&[]).is_err());
        assert!(encode(&vec![0.0; BEAT_LENGTH + 1]).is_err());
    }

    #[test]
    fn test_little_endian_layout_pinned() {
        let mut features = vec![0.0f32; BEAT_LENGTH];
        features[0] = 1.0; // 0x3F800000
        features[1] = -2.5; // 0xC0200000

        let encoded = encode_with(&features, Endianness::Little).unwrap();
        assert_eq!(&encoded.as_bytes()[0..4], &[0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(&encoded.as_bytes()[4..8], &[0x00, 0x00, 0x20, 0xC0]);
    }

    #[test]
    fn test_big_endian_layout_pinned() {
        let mut features = vec![0.0f32; BEAT_LENGTH];
        features[0] = 1.0;
        features[1] = -2.5;

        let encoded = encode_with(&features, Endianness::Big).unwrap();
        assert_eq!(&encoded.as_bytes()[0..4], &[0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(&encoded.as_bytes()[4..8], &[0xC0, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_native_matches_host_order() {
        let features = ramp();
        let native = encode(&features).unwrap();
        let pinned = encode_with(&features, Endianness::Native.resolve()).unwrap();
        assert_eq!(native.as_bytes(), pinned.as_bytes());

        let expected: Vec<u8> = features.iter().flat_map(|f| f.to_ne_bytes()).collect();
        assert_eq!(native.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_decode_is_bit_exact() {
        let mut features = ramp();
        features[10] = f32::MIN_POSITIVE;
        features[11] = -0.0;
        features[12] = f32::MAX;

        for order in [Endianness::Native, Endianness::Little, Endianness::Big] {
            let decoded = encode_with(&features, order).unwrap().decode().unwrap();
            let original_bits: Vec<u32> = features.iter().map(|f| f.to_bits()).collect();
            let decoded_bits: Vec<u32> = decoded.iter().map(|f| f.to_bits()).collect();
            assert_eq!(original_bits, decoded_bits);
        }
    }

    #[test]
    fn test_decode_rejects_partial_float() {
        assert_eq!(
            decode_with(&[0u8; 7], Endianness::Little),
            Err(EncodingError::TruncatedBuffer(7))
        );
    }
}
