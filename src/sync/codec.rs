//! Wire codecs for the medication list
//!
//! Two encodings are supported:
//!
//! **Delimited** (legacy, what existing watches persist):
//! ```text
//! id,name,dosage,time,frequency|id,name,dosage,time,frequency|...
//! ```
//! No escaping. A field containing `,` or `|` corrupts its record; such
//! records are skipped on decode.
//!
//! **Framed** (default):
//! ```text
//! magic "TCWS" (4) | version u8 (1) | count u32 LE (4)
//! then per record: length u32 LE | bincode(WatchMedication) | crc32 u32 LE
//! ```
//! The CRC covers length + data, the same framing the old on-disk log used.

use crate::sync::transport::DataValue;
use crate::watch::WatchMedication;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record separator in the delimited format
pub const RECORD_SEPARATOR: char = '|';
/// Field separator in the delimited format
pub const FIELD_SEPARATOR: char = ',';
/// Fields per delimited record
pub const FIELD_COUNT: usize = 5;

/// Magic bytes opening a framed payload
pub const FRAME_MAGIC: &[u8; 4] = b"TCWS";
/// Current framed format version
pub const FRAME_VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + 4;

/// Errors decoding a framed payload as a whole
///
/// Individual bad records never produce an error; they are skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Payload too short for frame header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("Invalid frame magic")]
    BadMagic,

    #[error("Unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("Payload is not valid UTF-8")]
    NotUtf8,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

/// Which encoding a payload uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    Delimited,
    #[default]
    Framed,
}

impl std::str::FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delimited" | "legacy" | "text" => Ok(WireFormat::Delimited),
            "framed" | "binary" => Ok(WireFormat::Framed),
            other => Err(format!("unknown wire format: {}", other)),
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireFormat::Delimited => write!(f, "delimited"),
            WireFormat::Framed => write!(f, "framed"),
        }
    }
}

// ═══════════════════════════════════════════
// Delimited
// ═══════════════════════════════════════════

/// Encode records in the legacy delimited format
pub fn encode_delimited(medications: &[WatchMedication]) -> String {
    medications
        .iter()
        .map(|m| {
            [
                m.id.as_str(),
                m.name.as_str(),
                m.dosage.as_str(),
                m.time.as_str(),
                m.frequency.as_str(),
            ]
            .join(",")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Decode the legacy delimited format
///
/// Records without exactly five fields are skipped; the rest still decode.
pub fn decode_delimited(data: &str) -> Vec<WatchMedication> {
    if data.is_empty() {
        return Vec::new();
    }

    data.split(RECORD_SEPARATOR)
        .enumerate()
        .filter_map(|(idx, record)| {
            let parts: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
            if parts.len() != FIELD_COUNT {
                tracing::debug!(
                    record = idx,
                    fields = parts.len(),
                    "Skipping malformed medication record"
                );
                return None;
            }
            Some(WatchMedication::new(
                parts[0], parts[1], parts[2], parts[3], parts[4],
            ))
        })
        .collect()
}

// ═══════════════════════════════════════════
// Framed
// ═══════════════════════════════════════════

fn record_crc(len: u32, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&len.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}

/// Encode records in the framed format
pub fn encode_framed(medications: &[WatchMedication]) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(HEADER_LEN + medications.len() * 64);
    buf.extend_from_slice(FRAME_MAGIC);
    buf.push(FRAME_VERSION);
    buf.extend_from_slice(&(medications.len() as u32).to_le_bytes());

    for medication in medications {
        let data = bincode::serialize(medication)?;
        let len = data.len() as u32;

        // Write: length (4) + data (N) + crc (4)
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&data);
        buf.extend_from_slice(&record_crc(len, &data).to_le_bytes());
    }

    Ok(buf)
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    buf.get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Decode the framed format
///
/// A record with a bad checksum or body is skipped. A truncated record ends
/// decoding and returns what was read before it.
pub fn decode_framed(buf: &[u8]) -> Result<Vec<WatchMedication>, CodecError> {
    if buf.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader(buf.len()));
    }
    if &buf[0..4] != FRAME_MAGIC {
        return Err(CodecError::BadMagic);
    }
    if buf[4] != FRAME_VERSION {
        return Err(CodecError::UnsupportedVersion(buf[4]));
    }

    let count = read_u32(buf, 5).unwrap_or(0) as usize;
    let mut pos = HEADER_LEN;
    let mut medications = Vec::with_capacity(count.min(1024));

    for idx in 0..count {
        let Some(len) = read_u32(buf, pos) else {
            tracing::warn!(record = idx, "Frame truncated before record length");
            break;
        };
        let start = pos + 4;
        let end = start + len as usize;

        let (Some(data), Some(stored_crc)) = (buf.get(start..end), read_u32(buf, end)) else {
            tracing::warn!(record = idx, len, "Frame truncated inside record");
            break;
        };
        pos = end + 4;

        if record_crc(len, data) != stored_crc {
            tracing::warn!(record = idx, "Skipping record with checksum mismatch");
            continue;
        }

        match bincode::deserialize::<WatchMedication>(data) {
            Ok(medication) => medications.push(medication),
            Err(e) => {
                tracing::warn!(record = idx, error = %e, "Skipping undecodable record");
            }
        }
    }

    Ok(medications)
}

// ═══════════════════════════════════════════
// Format-agnostic entry points
// ═══════════════════════════════════════════

/// An encoded medication list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedPayload {
    Text(String),
    Bytes(Vec<u8>),
}

/// Encode with the chosen format
pub fn encode(
    format: WireFormat,
    medications: &[WatchMedication],
) -> Result<EncodedPayload, CodecError> {
    match format {
        WireFormat::Delimited => Ok(EncodedPayload::Text(encode_delimited(medications))),
        WireFormat::Framed => Ok(EncodedPayload::Bytes(encode_framed(medications)?)),
    }
}

/// Decode bytes, detecting the framed format by its magic
///
/// Bytes without the magic are treated as UTF-8 delimited text.
pub fn decode_bytes(buf: &[u8]) -> Result<Vec<WatchMedication>, CodecError> {
    if buf.starts_with(FRAME_MAGIC) {
        return decode_framed(buf);
    }
    let text = std::str::from_utf8(buf).map_err(|_| CodecError::NotUtf8)?;
    Ok(decode_delimited(text))
}

/// Decode a payload value as received from the data layer
pub fn decode_any(value: &DataValue) -> Result<Vec<WatchMedication>, CodecError> {
    match value {
        DataValue::Text(text) => Ok(decode_delimited(text)),
        DataValue::Bytes(buf) => decode_bytes(buf),
        DataValue::Long(_) => Err(CodecError::Serialization(
            "expected text or bytes payload".to_string(),
        )),
    }
}
