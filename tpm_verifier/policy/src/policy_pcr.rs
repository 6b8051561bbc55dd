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

//! PolicyPCR term construction
//!
//! The term extended into a policy digest for TPM2_PolicyPCR is
//! `TPM_CC_PolicyPCR || TPML_PCR_SELECTION || pcrDigest`, where `pcrDigest` is the hash of the
//! selected PCR values concatenated in ascending PCR order.

use std::io::BufRead;
use byteorder::{BigEndian, WriteBytesExt};
use log::debug;
use tpm_common_verifier::{AlgorithmId, CryptoVerifier, DigestValue, TpmError, IMPLEMENTATION_PCR};
use crate::pcr_selection::PcrSelection;

pub const TPM_CC_POLICY_PCR: u32 = 0x0000_017F;
/// The term always carries a single TPMS_PCR_SELECTION
const PCR_SELECTION_COUNT: u32 = 1;

/// Hash of the PCR values laid end to end.
///
/// A single flat hash over the whole array, not an extend chain. The caller orders `values` by
/// ascending PCR index.
///
/// # Errors
/// * `TpmError::Structure` if a value belongs to another algorithm
pub fn build_pcr_composite(algorithm: AlgorithmId, values: &[DigestValue]) -> Result<DigestValue, TpmError> {
    let mut parts: Vec<&[u8]> = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        if value.algorithm() != algorithm {
            return Err(TpmError::structure(
                format!("PCR value {}", i),
                format!("{} value in a {} composite", value.algorithm(), algorithm),
            ));
        }
        parts.push(value.as_bytes());
    }
    let composite = CryptoVerifier::hash(algorithm, &parts)?;
    debug!("PCR composite over {} value(s): {}", values.len(), composite.to_hex());
    Ok(composite)
}

/// Marshals the PolicyPCR command parameters as one policy term
pub fn build_policy_pcr_term(selection: &PcrSelection, composite: &DigestValue) -> Result<Vec<u8>, TpmError> {
    let mut term = Vec::with_capacity(4 + 4 + 2 + 1 + 3 + composite.as_bytes().len());
    term.write_u32::<BigEndian>(TPM_CC_POLICY_PCR)
        .map_err(|e| TpmError::InternalError(format!("Failed to write command code: {}", e)))?;
    term.write_u32::<BigEndian>(PCR_SELECTION_COUNT)
        .map_err(|e| TpmError::InternalError(format!("Failed to write selection count: {}", e)))?;
    selection.marshal(&mut term)?;
    term.extend_from_slice(composite.as_bytes());
    Ok(term)
}

/// The PolicyPCR term as one lowercase hex line, suitable as policymaker input
pub fn policy_pcr_term_hex(selection: &PcrSelection, composite: &DigestValue) -> Result<String, TpmError> {
    Ok(hex::encode(build_policy_pcr_term(selection, composite)?))
}

/// Reads PCR values for `selection`, one hex value per line, in ascending PCR order.
///
/// An empty selection reads nothing.
///
/// # Errors
/// * `TpmError::Structure` for a line that is not a hex value of the selection's digest size,
///   more than 24 lines, or a line count that differs from the number of selected PCRs
pub fn read_pcr_values<R: BufRead>(selection: &PcrSelection, reader: R) -> Result<Vec<DigestValue>, TpmError> {
    if selection.is_empty() {
        return Ok(Vec::new());
    }

    let mut values = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| TpmError::InternalError(format!("Failed to read PCR values: {}", e)))?;
        if number >= IMPLEMENTATION_PCR {
            return Err(TpmError::structure("PCR values", format!("more than {} lines", IMPLEMENTATION_PCR)));
        }
        let text = line.trim_end_matches('\r');
        let expected = selection.hash_alg.digest_size() * 2;
        if text.len() != expected {
            return Err(TpmError::structure(
                format!("line {}", number + 1),
                format!("expected {} hex digits for {}, got {}", expected, selection.hash_alg, text.len()),
            ));
        }
        let value = DigestValue::from_hex(selection.hash_alg, text)
            .map_err(|e| e.in_field(format!("line {}", number + 1)))?;
        values.push(value);
    }

    if values.len() != selection.count() {
        return Err(TpmError::structure(
            "PCR values",
            format!("{} value(s) for {} selected PCR(s)", values.len(), selection.count()),
        ));
    }
    Ok(values)
}
