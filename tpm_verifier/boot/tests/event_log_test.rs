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

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tpm_boot_verifier::{
    DecoderLimits, EventLog, EventLogDecoder, EventRecord, EventType, TCG_EVENT_LEN_MAX,
};
use tpm_common_verifier::{AlgorithmId, TpmError};

mod utils;
use utils::*;

fn structure_field(error: &TpmError) -> &str {
    match error {
        TpmError::Structure { field, .. } => field.as_str(),
        other => panic!("expected a structure error, got {:?}", other),
    }
}

// =======================================================================================
// Decoding
// =======================================================================================

/// Test Objective: Verify a crypto agile log with one SHA-256 record decodes completely
/// Expected Result: Two records, the first carrying the Spec ID header
#[test]
fn test_event_log_parse_with_agile_log() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA256, vec![0u8; 32])], &[0u8; 4]));

    let log = EventLog::parse(&data);
    assert!(log.is_complete(), "unexpected error: {:?}", log.error);
    assert!(log.is_crypto_agile());
    assert_eq!(log.records.len(), 2);

    let spec_id = log.spec_id.as_ref().unwrap();
    assert_eq!(spec_id.number_of_algorithms(), 2);
    assert_eq!(spec_id.declared_size(AlgorithmId::Sha256), Some(32));
    assert_eq!(
        spec_id.algorithm_sizes(),
        vec![(AlgorithmId::Sha1, 20), (AlgorithmId::Sha256, 32)]
    );

    assert!(matches!(&log.records[0], EventRecord::V1(r) if r.event_type == EventType::NoAction));
    match &log.records[1] {
        EventRecord::V2(record) => {
            assert_eq!(record.pcr_index, 0);
            assert_eq!(record.event_type, EventType::Separator);
            assert_eq!(record.digests.len(), 1);
            assert_eq!(record.event_data, vec![0u8; 4]);
        }
        other => panic!("expected a V2 record, got {:?}", other),
    }
}

/// Test Objective: Verify a log whose first record is not a Spec ID event is read as SHA-1 only
/// Expected Result: All records decode in the V1 layout
#[test]
fn test_event_log_parse_with_legacy_log() {
    let mut data = v1_record(0, EV_POST_CODE, [0x11; 20], b"POST CODE");
    data.extend(v1_record(4, EV_SEPARATOR, [0x22; 20], &[0u8; 4]));

    let log = EventLog::parse(&data);
    assert!(log.is_complete());
    assert!(!log.is_crypto_agile());
    assert_eq!(log.records.len(), 2);
    assert!(log.records.iter().all(|r| matches!(r, EventRecord::V1(_))));
    assert_eq!(log.records[1].pcr_index(), 4);
    assert_eq!(log.records[1].digest_for(AlgorithmId::Sha1).unwrap().as_bytes(), &[0x22; 20]);
    assert!(log.records[1].digest_for(AlgorithmId::Sha256).is_none());
}

/// Test Objective: Verify empty input is a clean end of stream
/// Expected Result: No records and no error
#[test]
fn test_event_log_parse_with_empty_input() {
    let log = EventLog::parse(&[]);
    assert!(log.is_complete());
    assert!(log.records.is_empty());
    assert!(log.spec_id.is_none());
}

/// Test Objective: Verify a digest count above the supported maximum fails before any digest is read
/// Expected Result: Structure error on the count, decoder positioned right after the count field
#[test]
fn test_event_log_decoder_with_digest_count_overflow() {
    let header = sha256_header();
    let header_len = header.len() as u64;
    let mut data = header;
    data.extend(v2_record_with_count(0, EV_SEPARATOR, 6, &[(ALG_SHA256, vec![0u8; 32])], &[]));

    let mut decoder = EventLogDecoder::new(&data);
    assert!(decoder.next_record().unwrap().is_some());
    let error = decoder.next_record().unwrap_err();
    assert_eq!(structure_field(&error), "event 1: digests.count");
    assert_eq!(decoder.offset(), header_len + 12);
    assert!(decoder.is_finished());
}

/// Test Objective: Verify the digest count is also bounded by the header's algorithm table
/// Expected Result: Structure error when the record claims more digests than the header declares
#[test]
fn test_event_log_parse_with_count_above_header_algorithms() {
    let mut data = header_record(&[(ALG_SHA256, 32)]);
    data.extend(v2_record(
        0,
        EV_SEPARATOR,
        &[(ALG_SHA256, vec![0u8; 32]), (ALG_SHA1, vec![0u8; 20])],
        &[],
    ));

    let log = EventLog::parse(&data);
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 1: digests.count");
    assert_eq!(log.records.len(), 1);
}

/// Test Objective: Verify a zero digest count is rejected
/// Expected Result: Structure error on the count
#[test]
fn test_event_log_parse_with_zero_digest_count() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[], &[]));

    let log = EventLog::parse(&data);
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 1: digests.count");
}

/// Test Objective: Verify a V1 record with oversized event data is rejected before the data is read
/// Expected Result: Structure error on eventDataSize and no records
#[test]
fn test_event_log_parse_with_oversized_v1_event() {
    let mut data = Vec::new();
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&EV_POST_CODE.to_le_bytes());
    data.extend_from_slice(&[0u8; 20]);
    data.extend_from_slice(&(TCG_EVENT_LEN_MAX + 1).to_le_bytes());
    data.extend_from_slice(&[0u8; 16]);

    let log = EventLog::parse(&data);
    assert!(log.records.is_empty());
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 0: eventDataSize");
}

/// Test Objective: Verify the event size limit is configurable
/// Expected Result: A 16 byte event passes the default limit and fails an 8 byte limit
#[test]
fn test_event_log_parse_with_custom_event_size_limit() {
    let data = v1_record(0, EV_POST_CODE, [0u8; 20], &[0xAA; 16]);

    assert!(EventLog::parse(&data).is_complete());

    let log = EventLog::parse_with_limits(&data, DecoderLimits { max_event_size: 8 });
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 0: eventDataSize");
}

/// Test Objective: Verify event data running past the end of input is reported as truncation
/// Expected Result: Structure error on the event field
#[test]
fn test_event_log_parse_with_truncated_event_data() {
    let mut data = v1_record(0, EV_POST_CODE, [0u8; 20], &[0xAA; 16]);
    data.truncate(data.len() - 4);

    let log = EventLog::parse(&data);
    let error = log.error.unwrap();
    assert_eq!(structure_field(&error), "event 0: event");
    assert!(error.to_string().contains("truncated"));
}

/// Test Objective: Verify records decoded before a failure are kept
/// Expected Result: Two records plus a structure error naming the third record
#[test]
fn test_event_log_parse_with_trailing_garbage() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA256, vec![0u8; 32])], &[]));
    data.extend_from_slice(&[0x01, 0x02]);

    let log = EventLog::parse(&data);
    assert_eq!(log.records.len(), 2);
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 2: pcrIndex");
    assert!(log.into_result().is_err());
}

/// Test Objective: Verify the decoder yields nothing after its first error
/// Expected Result: Iteration ends with exactly one error item
#[test]
fn test_event_log_decoder_with_error_is_fused() {
    let mut data = sha256_header();
    data.extend(v2_record_with_count(0, EV_SEPARATOR, 9, &[], &[]));
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA256, vec![0u8; 32])], &[]));

    let mut decoder = EventLogDecoder::new(&data);
    let items: Vec<_> = decoder.by_ref().collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
    assert!(decoder.next().is_none());
}

/// Test Objective: Verify an algorithm identifier outside the registry is rejected in a V2 record
/// Expected Result: Structure error on the digest's hashAlg
#[test]
fn test_event_log_parse_with_unknown_digest_algorithm() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[(0x1234, vec![0u8; 32])], &[]));

    let log = EventLog::parse(&data);
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 1: digests[0].hashAlg");
}

/// Test Objective: Verify a registered algorithm that the header does not declare is rejected
/// Expected Result: Structure error on the digest's hashAlg
#[test]
fn test_event_log_parse_with_undeclared_digest_algorithm() {
    let mut data = header_record(&[(ALG_SHA256, 32), (0x000C, 48)]);
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA1, vec![0u8; 20])], &[]));

    let log = EventLog::parse(&data);
    let error = log.error.unwrap();
    assert_eq!(structure_field(&error), "event 1: digests[0].hashAlg");
    assert!(error.to_string().contains("not declared"));
}

/// Test Objective: Verify the same algorithm cannot appear twice in one record
/// Expected Result: Structure error on the second digest
#[test]
fn test_event_log_parse_with_duplicate_digest_algorithm() {
    let mut data = sha256_header();
    data.extend(v2_record(
        0,
        EV_SEPARATOR,
        &[(ALG_SHA256, vec![0u8; 32]), (ALG_SHA256, vec![1u8; 32])],
        &[],
    ));

    let log = EventLog::parse(&data);
    assert_eq!(structure_field(log.error.as_ref().unwrap()), "event 1: digests[1].hashAlg");
}

/// Test Objective: Verify an unknown algorithm in the Spec ID header is tolerated
/// Expected Result: Header decodes, the unknown identifier is listed, SHA-256 records still decode
#[test]
fn test_event_log_parse_with_unknown_header_algorithm() {
    let mut data = header_record(&[(0x1234, 7), (ALG_SHA256, 32)]);
    data.extend(v2_record(2, EV_POST_CODE, &[(ALG_SHA256, vec![0x5A; 32])], &[]));

    let log = EventLog::parse(&data);
    assert!(log.is_complete(), "unexpected error: {:?}", log.error);
    let spec_id = log.spec_id.as_ref().unwrap();
    assert_eq!(spec_id.unrecognized(), vec![0x1234]);
    assert_eq!(spec_id.algorithm_sizes(), vec![(AlgorithmId::Sha256, 32)]);
    assert_eq!(log.records.len(), 2);
}

/// Test Objective: Verify a registered algorithm declared with the wrong size fails the header
/// Expected Result: Structure error naming the header entry
#[test]
fn test_event_log_parse_with_header_size_mismatch() {
    let data = header_record(&[(ALG_SHA256, 20)]);

    let log = EventLog::parse(&data);
    assert!(log.records.is_empty());
    assert_eq!(
        structure_field(log.error.as_ref().unwrap()),
        "event 0: Spec ID header: digestSizes[0].digestSize"
    );
}

/// Test Objective: Verify the Spec ID algorithm table capacity is enforced
/// Expected Result: Structure error on numberOfAlgorithms
#[test]
fn test_event_log_parse_with_oversized_algorithm_table() {
    let algorithms: Vec<(u16, u16)> = (0..17).map(|i| (0x1000 + i, 32)).collect();
    let data = header_record(&algorithms);

    let log = EventLog::parse(&data);
    assert_eq!(
        structure_field(log.error.as_ref().unwrap()),
        "event 0: Spec ID header: numberOfAlgorithms"
    );
}

/// Test Objective: Verify a Spec ID header declaring no algorithms is refused at the header
/// Expected Result: Structure error on numberOfAlgorithms in event 0, no records decoded
#[test]
fn test_event_log_parse_with_empty_algorithm_table() {
    let mut data = header_record(&[]);
    data.extend(v2_record(0, EV_POST_CODE, &[(ALG_SHA256, vec![0u8; 32])], b""));

    let log = EventLog::parse(&data);
    assert!(log.records.is_empty());
    assert!(log.spec_id.is_none());
    assert_eq!(
        structure_field(log.error.as_ref().unwrap()),
        "event 0: Spec ID header: numberOfAlgorithms"
    );
}

/// Test Objective: Verify event types outside the table keep their raw value
/// Expected Result: Unknown(raw) type that re-encodes to the same bytes
#[test]
fn test_event_log_parse_with_unknown_event_type() {
    let mut data = sha256_header();
    data.extend(v2_record(1, 0x9000_0001, &[(ALG_SHA256, vec![0u8; 32])], b"vendor"));

    let log = EventLog::parse(&data);
    assert!(log.is_complete());
    assert_eq!(log.records[1].event_type(), EventType::Unknown(0x9000_0001));
    assert_eq!(log.records[1].event_type().to_string(), "EV_UNKNOWN(0x90000001)");
    assert_eq!(log.marshal().unwrap(), data);
}

// =======================================================================================
// Serialization
// =======================================================================================

/// Test Objective: Verify a decoded log re-encodes to the exact input bytes
/// Expected Result: marshal output equals the original log
#[test]
fn test_event_log_marshal_with_agile_log() {
    let mut data = sha256_header();
    data.extend(v2_record(
        0,
        EV_SEPARATOR,
        &[(ALG_SHA1, vec![0x01; 20]), (ALG_SHA256, vec![0x02; 32])],
        &[0u8; 4],
    ));
    data.extend(v2_record(7, EV_POST_CODE, &[(ALG_SHA256, vec![0x03; 32])], b"event data"));

    let log = EventLog::parse(&data);
    assert!(log.is_complete());
    assert_eq!(log.marshal().unwrap(), data);

    let spec_id = log.spec_id.as_ref().unwrap();
    assert_eq!(spec_id.marshal().unwrap(), log.records[0].event_data());
}

/// Test Objective: Verify the JSON view names event types and digests
/// Expected Result: Spec ID signature and TCG event type names appear in the output
#[test]
fn test_event_log_to_json_with_agile_log() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA256, vec![0u8; 32])], &[]));

    let json = EventLog::parse(&data).to_json_value();
    assert_eq!(json["spec_id"]["signature"], "Spec ID Event03");
    assert_eq!(json["event_log"][0]["event_type"], "EV_NO_ACTION");
    assert_eq!(json["event_log"][1]["event_type"], "EV_SEPARATOR");
    assert_eq!(json["event_log"][1]["digests"]["sha256"], "00".repeat(32));
    assert!(json.get("error").is_none());
}

/// Test Objective: Verify Base64 input is accepted and malformed Base64 is rejected
/// Expected Result: Same records as the binary form; structure error for corrupted text
#[test]
fn test_event_log_parse_base64() {
    let mut data = sha256_header();
    data.extend(v2_record(0, EV_SEPARATOR, &[(ALG_SHA256, vec![0u8; 32])], &[]));
    let encoded = BASE64.encode(&data);

    let log = EventLog::parse_base64(&encoded, DecoderLimits::default()).unwrap();
    assert_eq!(log.records.len(), 2);

    let result = EventLog::parse_base64("not base64 at all!", DecoderLimits::default());
    assert!(matches!(result, Err(TpmError::Structure { .. })));
}
