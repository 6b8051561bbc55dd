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

use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use tpm_common_verifier::{AlgorithmId, DigestValue, TpmError};
use tpm_policy_maker::{
    build_pcr_composite, build_policy_pcr_term, policy_pcr_term_hex, read_pcr_values,
    PcrSelection, PolicyDigest, PolicyMaker,
};

const PCR16_SHA1: &str = "1d47f68aced515f7797371b554e32d47981aa0a0";
const PCR16_TERM: &str = "0000017f00000001000403000001cbf1e9f771d215a017e17979cfd7184f4b674a4d";

/// Test Objective: Verify mask bits map to PCR indices with byte 0 covering PCRs 0-7
/// Expected Result: 0x010000 selects PCR 16 only
#[test]
fn test_pcr_selection_with_byte_mask() {
    let selection = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0x010000).unwrap();
    assert_eq!(selection.pcr_select(), &[0x00, 0x00, 0x01]);
    assert_eq!(selection.selected_indices(), vec![16]);
    assert_eq!(selection.count(), 1);
    assert!(selection.is_pcr_selected(16));
    assert!(!selection.is_pcr_selected(0));
    assert!(!selection.is_pcr_selected(24));

    let indexed = PcrSelection::from_indices(AlgorithmId::Sha1, &[16]).unwrap();
    assert_eq!(indexed, selection);
}

/// Test Objective: Verify masks beyond PCR 23 and invalid indices are rejected
/// Expected Result: Range errors
#[test]
fn test_pcr_selection_with_out_of_range_pcr() {
    assert_eq!(
        PcrSelection::from_byte_mask(AlgorithmId::Sha256, 0x0100_0000).unwrap_err(),
        TpmError::Range { index: 24, min: 0, max: 23 }
    );
    assert!(matches!(
        PcrSelection::from_indices(AlgorithmId::Sha256, &[0, 30]),
        Err(TpmError::Range { index: 30, .. })
    ));
    assert!(PcrSelection::from_byte_mask(AlgorithmId::Sha256, 0).unwrap().is_empty());
}

/// Test Objective: Verify the PolicyPCR term for PCR 16 in the SHA-1 bank
/// Expected Result: Known composite and byte-exact term
#[test]
fn test_policy_pcr_term_with_pcr16_sha1() {
    let selection = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0x010000).unwrap();
    let values = read_pcr_values(&selection, Cursor::new(format!("{}\n", PCR16_SHA1))).unwrap();
    let composite = build_pcr_composite(AlgorithmId::Sha1, &values).unwrap();
    assert_eq!(composite.to_hex(), "cbf1e9f771d215a017e17979cfd7184f4b674a4d");

    let term = build_policy_pcr_term(&selection, &composite).unwrap();
    assert_eq!(hex::encode(&term), PCR16_TERM);
    assert_eq!(policy_pcr_term_hex(&selection, &composite).unwrap(), PCR16_TERM);
}

/// Test Objective: Verify the PolicyPCR term feeds the policy digest builder
/// Expected Result: Known policy digests for SHA-256 and SHA-1 sessions
#[test]
fn test_policy_pcr_term_with_policy_digest() {
    let mut sha256_policy = PolicyDigest::new(AlgorithmId::Sha256, true);
    sha256_policy.extend_hex_line(PCR16_TERM).unwrap();
    assert_eq!(
        sha256_policy.to_hex(),
        "51bf4f6fc368d072e6e7c0a5376fc69601aa58024dcb139e28b0e2422cddedcb"
    );

    let sha1_policy = PolicyMaker::from_reader(AlgorithmId::Sha1, true, Cursor::new(PCR16_TERM)).unwrap();
    assert_eq!(sha1_policy.to_hex(), "12b6dd164382cae45d0ed07f9e51d163a424f5f2");
}

/// Test Objective: Verify the composite is one flat hash over values in PCR order
/// Expected Result: Known term for PCR 0 and 1 in the SHA-256 bank
#[test]
fn test_policy_pcr_term_with_two_pcrs() {
    let selection = PcrSelection::from_indices(AlgorithmId::Sha256, &[1, 0]).unwrap();
    assert_eq!(selection.selected_indices(), vec![0, 1]);

    let values = vec![
        DigestValue::new(AlgorithmId::Sha256, vec![1u8; 32]).unwrap(),
        DigestValue::new(AlgorithmId::Sha256, vec![2u8; 32]).unwrap(),
    ];
    let composite = build_pcr_composite(AlgorithmId::Sha256, &values).unwrap();
    assert_eq!(composite.to_hex(), "f818afd37a6dc3bc92fb44731011277006db4efa6e9023cd7468c02335d22a4d");
    assert_eq!(
        policy_pcr_term_hex(&selection, &composite).unwrap(),
        "0000017f00000001000b03030000f818afd37a6dc3bc92fb44731011277006db4efa6e9023cd7468c02335d22a4d"
    );
}

/// Test Objective: Verify the composite refuses values from another bank
/// Expected Result: Structure error
#[test]
fn test_pcr_composite_with_mixed_algorithms() {
    let values = vec![DigestValue::zero(AlgorithmId::Sha1)];
    assert!(matches!(
        build_pcr_composite(AlgorithmId::Sha256, &values),
        Err(TpmError::Structure { .. })
    ));
}

/// Test Objective: Verify PCR value file validation
/// Expected Result: Wrong length, wrong count and too many lines are structure errors
#[test]
fn test_read_pcr_values_with_invalid_input() {
    let selection = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0x010000).unwrap();

    let short = read_pcr_values(&selection, Cursor::new("1d47f68a\n"));
    assert!(matches!(short, Err(TpmError::Structure { ref field, .. }) if field == "line 1"));

    let two = format!("{}\n{}\n", PCR16_SHA1, PCR16_SHA1);
    assert!(matches!(read_pcr_values(&selection, Cursor::new(two)), Err(TpmError::Structure { .. })));

    let many = format!("{}\n", PCR16_SHA1).repeat(25);
    let all = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0xFF_FFFF).unwrap();
    let error = read_pcr_values(&all, Cursor::new(many)).unwrap_err();
    assert!(error.to_string().contains("more than 24 lines"));

    let empty = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0).unwrap();
    assert!(read_pcr_values(&empty, Cursor::new("ignored")).unwrap().is_empty());
}

/// Test Objective: Verify PCR values can be read from a file with CRLF line endings
/// Expected Result: The same composite as the in-memory input
#[test]
fn test_read_pcr_values_with_file_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}\r\n", PCR16_SHA1).unwrap();

    let selection = PcrSelection::from_byte_mask(AlgorithmId::Sha1, 0x010000).unwrap();
    let reader = BufReader::new(File::open(file.path()).unwrap());
    let values = read_pcr_values(&selection, reader).unwrap();
    assert_eq!(values[0].to_hex(), PCR16_SHA1);
}
