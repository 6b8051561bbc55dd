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

//! PCR bank accumulator and reported PCR values.
//!
//! `PcrBank` holds the running value of every (PCR index, algorithm) pair during a replay.
//! `PcrValues` is the verifier-side view of values read from a TPM, loaded from JSON and
//! compared against a replayed bank.
use std::collections::{BTreeMap, HashSet};
use log::debug;
use serde::{Serialize, Deserialize};
use crate::algorithm::{AlgorithmId, DigestValue};
use crate::crypto_utils::CryptoVerifier;
use crate::error::TpmError;

/// Valid PCR index range (0-23)
pub const PCR_INDEX_MIN: u32 = 0;
pub const PCR_INDEX_MAX: u32 = 23;
/// Number of PCRs in a TPM2 PC Client implementation
pub const IMPLEMENTATION_PCR: usize = 24;

/// Validates if the given PCR index is within valid range
pub fn is_valid_pcr_index(index: u32) -> bool {
    (PCR_INDEX_MIN..=PCR_INDEX_MAX).contains(&index)
}

pub fn check_pcr_index(index: u32) -> Result<(), TpmError> {
    if !is_valid_pcr_index(index) {
        return Err(TpmError::Range { index, min: PCR_INDEX_MIN, max: PCR_INDEX_MAX });
    }
    Ok(())
}

/// Running PCR values for one or more banks.
///
/// Every tracked register starts at all-zero bytes of its algorithm's length. Values only move
/// forward through `extend`; there is no reset.
#[derive(Debug, Clone)]
pub struct PcrBank {
    values: BTreeMap<(u32, AlgorithmId), DigestValue>,
    algorithms: Vec<AlgorithmId>,
}

impl PcrBank {
    pub fn new(algorithms: &[AlgorithmId]) -> Self {
        let mut tracked: Vec<AlgorithmId> = algorithms.to_vec();
        tracked.sort();
        tracked.dedup();

        let mut values = BTreeMap::new();
        for alg in tracked.iter() {
            for index in PCR_INDEX_MIN..=PCR_INDEX_MAX {
                values.insert((index, *alg), DigestValue::zero(*alg));
            }
        }
        Self { values, algorithms: tracked }
    }

    pub fn algorithms(&self) -> &[AlgorithmId] {
        &self.algorithms
    }

    pub fn get(&self, index: u32, alg: AlgorithmId) -> Option<&DigestValue> {
        self.values.get(&(index, alg))
    }

    /// Extends PCR `index` of the bank matching the digest's algorithm.
    ///
    /// # Errors
    /// * `TpmError::Range` if `index` is not a valid PCR index
    /// * `TpmError::Structure` if the bank does not track the digest's algorithm
    pub fn extend(&mut self, index: u32, digest: &DigestValue) -> Result<&DigestValue, TpmError> {
        check_pcr_index(index)?;
        let alg = digest.algorithm();
        let slot = self.values.get_mut(&(index, alg))
            .ok_or_else(|| TpmError::structure(
                "pcr bank",
                format!("algorithm {} is not tracked by this bank", alg),
            ))?;

        let next = CryptoVerifier::extend(alg, slot.as_bytes(), digest.as_bytes())?;
        debug!("PCR[{}] {} extended with {} -> {}", index, alg, digest.to_hex(), next.to_hex());
        *slot = next;
        Ok(slot)
    }

    /// Iterates over (index, value) for one bank in ascending index order
    pub fn bank(&self, alg: AlgorithmId) -> impl Iterator<Item = (u32, &DigestValue)> {
        self.values.iter()
            .filter(move |((_, a), _)| *a == alg)
            .map(|((index, _), value)| (*index, value))
    }

    /// Compares replayed values against values reported by a TPM.
    ///
    /// Fills in `replay_value` and `is_matched` for every reported entry, then returns whether
    /// all entries matched. Every entry is processed even after the first mismatch.
    pub fn compare(&self, reported: &mut PcrValues) -> Result<bool, TpmError> {
        reported.validate()?;
        let alg = reported.hash_alg;
        let mut all_matched = true;

        for entry in reported.pcr_values.iter_mut() {
            let replayed = self.get(entry.pcr_index, alg)
                .map(|value| value.to_hex());
            let matched = replayed
                .as_ref()
                .map_or(false, |value| value.eq_ignore_ascii_case(entry.pcr_value.trim()));
            entry.replay_value = replayed;
            entry.is_matched = Some(matched);
            if !matched {
                all_matched = false;
            }
        }

        Ok(all_matched)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcrValueEntry {
    pub pcr_index: u32,
    pub pcr_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_matched: Option<bool>,
}

/// PCR values as reported by a TPM for a single bank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcrValues {
    pub hash_alg: AlgorithmId,
    pub pcr_values: Vec<PcrValueEntry>,
}

impl PcrValues {
    /// Create a new PcrValues instance from JSON
    ///
    /// # Example
    /// ```
    /// use tpm_common_verifier::PcrValues;
    /// use serde_json::json;
    ///
    /// let json_value = json!({
    ///     "hash_alg": "sha256",
    ///     "pcr_values": [
    ///         {
    ///             "pcr_index": 0,
    ///             "pcr_value": "9d7504bb0d32f62d43310f38df37cdd5e42bdb83dd0c0592fd9b1c3b16770c35"
    ///         }
    ///     ]
    /// });
    /// let pcr_values = PcrValues::from_json(&json_value).unwrap();
    /// assert_eq!(pcr_values.pcr_values.len(), 1);
    /// ```
    ///
    /// # Errors
    /// * `TpmError::Structure` - If the JSON is invalid or an entry fails validation.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TpmError> {
        let values: PcrValues = serde_json::from_value(json.clone())
            .map_err(|e| TpmError::structure("pcr values", format!("Failed to parse PCR values: {}", e)))?;
        values.validate()?;
        Ok(values)
    }

    /// Checks format constraints only:
    /// - PCR values are not empty
    /// - no duplicate PCR indices
    /// - PCR index range (0-23)
    /// - value is hex of exactly the bank's digest size
    pub fn validate(&self) -> Result<(), TpmError> {
        if self.pcr_values.is_empty() {
            return Err(TpmError::structure("pcr values", "PCR values cannot be empty"));
        }

        let mut seen_indices = HashSet::new();
        for entry in self.pcr_values.iter() {
            if !seen_indices.insert(entry.pcr_index) {
                return Err(TpmError::structure(
                    "pcr values",
                    format!("Duplicate PCR index found: {}", entry.pcr_index),
                ));
            }
            check_pcr_index(entry.pcr_index)?;
            DigestValue::from_hex(self.hash_alg, &entry.pcr_value)
                .map_err(|e| e.in_field(format!("PCR {}", entry.pcr_index)))?;
        }

        Ok(())
    }
}
