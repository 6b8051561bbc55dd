/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! Record and Spec-ID decoding
//!
//! Every length field read from the log is checked against a bound before any buffer of that
//! length is read: the remaining input, the configured event size limit, the digest count limit
//! or the Spec-ID algorithm table capacity.
//!
//! Both record layouts share the same outer frame (pcrIndex, eventType, digests, eventDataSize,
//! event); only the digest block differs. The `TcgDigestParse` implementations cover that part.

use std::collections::HashSet;
use log::{debug, warn};
use tpm_common_verifier::{AlgorithmId, DigestValue, TpmError, digest_size_of};
use crate::byte_reader::{ByteReader, ByteParseable};
use crate::event::model::{
    EventRecordV1, EventRecordV2, EventType, SpecIdAlgorithm, SpecIdHeader,
    MAX_DIGEST_COUNT, MAX_SPEC_ID_ALGORITHMS, SHA1_DIGEST_SIZE,
    SPEC_ID_EVENT_SIGNATURE_03, SPEC_ID_SIGNATURE_SIZE, TCG_EVENT_LEN_MAX,
};

/// Bounds applied while decoding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    /// Largest `eventDataSize` accepted, checked before the event data is read
    pub max_event_size: u32,
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self { max_event_size: TCG_EVENT_LEN_MAX }
    }
}

/// Reads the digest block of a record
pub trait TcgDigestParse {
    /// # Errors
    /// * `TpmError::Structure` if the block is malformed or inconsistent with the header
    /// * `TpmError::InsufficientData` if the block is truncated
    fn parse_digest(&self, reader: &mut ByteReader<'_>) -> Result<Vec<DigestValue>, TpmError>;
}

/// TCG_PCR_EVENT: a single SHA-1 digest, no algorithm tag
pub struct TcgDigestParseV1;

/// TCG_PCR_EVENT2: a counted list of tagged digests, validated against the Spec-ID header
pub struct TcgDigestParseV2<'h> {
    pub spec_id: &'h SpecIdHeader,
}

impl TcgDigestParse for TcgDigestParseV1 {
    fn parse_digest(&self, reader: &mut ByteReader<'_>) -> Result<Vec<DigestValue>, TpmError> {
        let digest = reader.read_bytes(SHA1_DIGEST_SIZE)
            .map_err(|e| e.in_field("digest"))?;
        Ok(vec![DigestValue::new(AlgorithmId::Sha1, digest)?])
    }
}

impl TcgDigestParse for TcgDigestParseV2<'_> {
    fn parse_digest(&self, reader: &mut ByteReader<'_>) -> Result<Vec<DigestValue>, TpmError> {
        let count = reader.read_u32().map_err(|e| e.in_field("digests.count"))?;
        let header_count = self.spec_id.number_of_algorithms();
        if count == 0 || count > MAX_DIGEST_COUNT {
            return Err(TpmError::structure(
                "digests.count",
                format!("count {} outside 1-{}", count, MAX_DIGEST_COUNT),
            ));
        }
        if count > header_count {
            return Err(TpmError::structure(
                "digests.count",
                format!("count {} exceeds the {} algorithms declared by the Spec ID header", count, header_count),
            ));
        }

        let mut seen: HashSet<AlgorithmId> = HashSet::with_capacity(count as usize);
        let mut digests: Vec<DigestValue> = Vec::with_capacity(count as usize);
        for i in 0..count {
            let field = format!("digests[{}]", i);
            let raw_id = reader.read_u16().map_err(|e| e.in_field(format!("{}.hashAlg", field)))?;
            let alg = AlgorithmId::try_from(raw_id).map_err(|e| e.in_field(format!("{}.hashAlg", field)))?;
            if !seen.insert(alg) {
                return Err(TpmError::structure(
                    format!("{}.hashAlg", field),
                    format!("{} appears more than once", alg),
                ));
            }
            if self.spec_id.declared_size(alg).is_none() {
                return Err(TpmError::structure(
                    format!("{}.hashAlg", field),
                    format!("{} is not declared by the Spec ID header", alg),
                ));
            }
            let bytes = reader.read_bytes(alg.digest_size())
                .map_err(|e| e.in_field(format!("{}.digest", field)))?;
            digests.push(DigestValue::new(alg, bytes)?);
        }
        Ok(digests)
    }
}

struct RawEntry {
    pcr_index: u32,
    event_type: EventType,
    digests: Vec<DigestValue>,
    event_data: Vec<u8>,
}

/// Reads one record frame.
///
/// Returns `Ok(None)` only when the reader is exactly at its end. A record that starts but does
/// not finish is a structure error, including a tail too short to hold `pcrIndex`.
fn parse_event_entry(
    reader: &mut ByteReader<'_>,
    digest_parser: &dyn TcgDigestParse,
    limits: &DecoderLimits,
) -> Result<Option<RawEntry>, TpmError> {
    if reader.is_end() {
        return Ok(None);
    }

    let pcr_index = reader.read_u32().map_err(|e| e.in_field("pcrIndex"))?;
    let event_type = EventType::from_u32(reader.read_u32().map_err(|e| e.in_field("eventType"))?);
    let digests = digest_parser.parse_digest(reader)?;

    let event_size = reader.read_u32().map_err(|e| e.in_field("eventDataSize"))?;
    if event_size > limits.max_event_size {
        return Err(TpmError::structure(
            "eventDataSize",
            format!("{} exceeds the maximum event size {}", event_size, limits.max_event_size),
        ));
    }
    let event_data = reader.read_bytes(event_size as usize)
        .map_err(|e| e.in_field("event"))?;

    debug!("decoded PCR[{}] {} with {} digest(s), {} bytes of event data",
        pcr_index, event_type, digests.len(), event_data.len());

    Ok(Some(RawEntry { pcr_index, event_type, digests, event_data }))
}

/// Decodes the next SHA-1 only record, `Ok(None)` at a clean end of input
pub fn decode_v1(reader: &mut ByteReader<'_>, limits: &DecoderLimits) -> Result<Option<EventRecordV1>, TpmError> {
    let Some(entry) = parse_event_entry(reader, &TcgDigestParseV1, limits)? else {
        return Ok(None);
    };
    let digest = entry.digests.into_iter().next()
        .ok_or_else(|| TpmError::InternalError("SHA-1 digest missing from parsed record".to_string()))?;
    Ok(Some(EventRecordV1 {
        pcr_index: entry.pcr_index,
        event_type: entry.event_type,
        digest,
        event_data: entry.event_data,
    }))
}

/// Decodes the next crypto-agile record, `Ok(None)` at a clean end of input
pub fn decode_v2(
    reader: &mut ByteReader<'_>,
    spec_id: &SpecIdHeader,
    limits: &DecoderLimits,
) -> Result<Option<EventRecordV2>, TpmError> {
    let parser = TcgDigestParseV2 { spec_id };
    Ok(parse_event_entry(reader, &parser, limits)?.map(|entry| EventRecordV2 {
        pcr_index: entry.pcr_index,
        event_type: entry.event_type,
        digests: entry.digests,
        event_data: entry.event_data,
    }))
}

/// True when a first record announces a crypto-agile log
pub fn is_spec_id_event(record: &EventRecordV1) -> bool {
    record.event_type == EventType::NoAction
        && record.event_data.starts_with(SPEC_ID_EVENT_SIGNATURE_03)
}

impl ByteParseable for SpecIdHeader {
    fn parse_from(parser: &mut ByteReader<'_>) -> Result<Self, TpmError> {
        let signature: [u8; SPEC_ID_SIGNATURE_SIZE] = parser.read_array()
            .map_err(|e| e.in_field("signature"))?;
        if &signature != SPEC_ID_EVENT_SIGNATURE_03 {
            return Err(TpmError::structure(
                "signature",
                format!("unexpected signature {}", String::from_utf8_lossy(&signature).trim_end_matches('\0')),
            ));
        }
        let platform_class = parser.read_u32().map_err(|e| e.in_field("platformClass"))?;
        let spec_version_minor = parser.read_u8().map_err(|e| e.in_field("specVersionMinor"))?;
        let spec_version_major = parser.read_u8().map_err(|e| e.in_field("specVersionMajor"))?;
        let spec_errata = parser.read_u8().map_err(|e| e.in_field("specErrata"))?;
        let uintn_size = parser.read_u8().map_err(|e| e.in_field("uintnSize"))?;

        let algorithm_count = parser.read_u32().map_err(|e| e.in_field("numberOfAlgorithms"))?;
        if algorithm_count == 0 {
            return Err(TpmError::structure("numberOfAlgorithms", "no digest algorithms declared"));
        }
        if algorithm_count > MAX_SPEC_ID_ALGORITHMS {
            return Err(TpmError::structure(
                "numberOfAlgorithms",
                format!("{} exceeds the table capacity {}", algorithm_count, MAX_SPEC_ID_ALGORITHMS),
            ));
        }

        let mut algorithms: Vec<SpecIdAlgorithm> = Vec::with_capacity(algorithm_count as usize);
        for i in 0..algorithm_count {
            let field = format!("digestSizes[{}]", i);
            let algorithm_id = parser.read_u16().map_err(|e| e.in_field(format!("{}.algorithmId", field)))?;
            let digest_size = parser.read_u16().map_err(|e| e.in_field(format!("{}.digestSize", field)))?;
            match digest_size_of(algorithm_id) {
                Some(expected) if expected != digest_size as usize => {
                    return Err(TpmError::structure(
                        format!("{}.digestSize", field),
                        format!("algorithm 0x{:04x} declares {} bytes, registry says {}", algorithm_id, digest_size, expected),
                    ));
                }
                Some(_) => {}
                None => warn!("Spec ID header lists unknown algorithm 0x{:04x} ({} bytes), ignored", algorithm_id, digest_size),
            }
            algorithms.push(SpecIdAlgorithm { algorithm_id, digest_size });
        }

        let vendor_info_size = parser.read_u8().map_err(|e| e.in_field("vendorInfoSize"))?;
        let vendor_info = parser.read_bytes(vendor_info_size as usize)
            .map_err(|e| e.in_field("vendorInfo"))?;

        Ok(SpecIdHeader {
            signature,
            platform_class,
            spec_version_minor,
            spec_version_major,
            spec_errata,
            uintn_size,
            algorithms,
            vendor_info,
        })
    }
}

/// Parses the event data of the first record as a Spec-ID header
///
/// # Errors
/// * `TpmError::Structure` on a wrong signature, an oversized algorithm table, a size that
///   contradicts the registry or truncated data. Unknown algorithms are tolerated.
pub fn decode_spec_id(event_data: &[u8]) -> Result<SpecIdHeader, TpmError> {
    let mut reader = ByteReader::new(event_data);
    let header = SpecIdHeader::parse_from(&mut reader).map_err(|e| e.in_field("Spec ID header"))?;
    if !reader.is_end() {
        debug!("Spec ID header followed by {} unused bytes", reader.remaining());
    }
    Ok(header)
}
