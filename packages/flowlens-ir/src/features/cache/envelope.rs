//! Versioned binary envelope for L2 disk payloads (spec §6):
//! `{magic, version, parser_version, content_hash, payload_len, crc32, payload_bytes}`.
//!
//! `version` is the envelope's own schema-version counter, independent of
//! `parser_version` (open question 3, resolved in SPEC_FULL §9): bumping the
//! parser alone changes the cache *key* and naturally misses old entries;
//! bumping the binary layout bumps `version` and invalidates unconditionally.

use crc32fast::Hasher as Crc32;

use super::error::CacheError;

const MAGIC: [u8; 4] = *b"FLCE";
const ENVELOPE_VERSION: u16 = 1;

pub struct Envelope {
    pub parser_version: u32,
    pub content_hash: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.payload.len() + 64);
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&ENVELOPE_VERSION.to_le_bytes());
        buf.extend_from_slice(&self.parser_version.to_le_bytes());
        let hash_bytes = self.content_hash.as_bytes();
        buf.extend_from_slice(&(hash_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(hash_bytes);
        buf.extend_from_slice(&(self.payload.len() as u64).to_le_bytes());
        let mut crc = Crc32::new();
        crc.update(&self.payload);
        buf.extend_from_slice(&crc.finalize().to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CacheError> {
        let corrupt = || CacheError::CorruptPayload("malformed envelope".to_string());
        if bytes.len() < 4 + 2 + 4 + 4 {
            return Err(corrupt());
        }
        if bytes[0..4] != MAGIC {
            return Err(corrupt());
        }
        let mut offset = 4;
        let version = u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap());
        offset += 2;
        if version > ENVELOPE_VERSION {
            return Err(CacheError::CorruptPayload(format!(
                "envelope version {version} exceeds supported {ENVELOPE_VERSION}"
            )));
        }
        let parser_version = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        offset += 4;
        let hash_len =
            u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize;
        offset += 4;
        if bytes.len() < offset + hash_len + 8 + 4 {
            return Err(corrupt());
        }
        let content_hash = String::from_utf8(bytes[offset..offset + hash_len].to_vec())
            .map_err(|_| corrupt())?;
        offset += hash_len;
        let payload_len =
            u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap()) as usize;
        offset += 8;
        let expected_crc = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        offset += 4;
        if bytes.len() < offset + payload_len {
            return Err(corrupt());
        }
        let payload = bytes[offset..offset + payload_len].to_vec();
        let mut crc = Crc32::new();
        crc.update(&payload);
        if crc.finalize() != expected_crc {
            return Err(CacheError::CorruptPayload("crc32 mismatch".to_string()));
        }
        Ok(Self {
            parser_version,
            content_hash,
            payload,
        })
    }
}
