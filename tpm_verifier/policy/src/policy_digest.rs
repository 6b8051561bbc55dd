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

//! Policy digest accumulator
//!
//! A TPM2 policy digest is built by extending an accumulator with the marshaled parameters of
//! each policy command, in order: `policyDigest = H(policyDigest || term)`.

use std::io::BufRead;
use log::debug;
use tpm_common_verifier::{AlgorithmId, CryptoVerifier, TpmError};

/// Longest term accepted on one input line, in bytes
pub const POLICY_TERM_MAX_BYTES: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDigest {
    algorithm: AlgorithmId,
    bytes: Vec<u8>,
}

impl PolicyDigest {
    /// Starts an accumulator.
    ///
    /// With `start_from_zero` the initial value is the algorithm's zero digest, as in a fresh
    /// policy session. Otherwise it starts empty, so the first extend is a plain hash of the term.
    pub fn new(algorithm: AlgorithmId, start_from_zero: bool) -> Self {
        let bytes = if start_from_zero {
            vec![0u8; algorithm.digest_size()]
        } else {
            Vec::new()
        };
        Self { algorithm, bytes }
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// Current value. Empty only for an accumulator started empty and never extended.
    pub fn digest(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// `digest = H(digest || term)`. An empty term still hashes once.
    pub fn extend(&mut self, term: &[u8]) -> Result<&[u8], TpmError> {
        let next = CryptoVerifier::extend(self.algorithm, &self.bytes, term)?;
        self.bytes = next.into_bytes();
        debug!("intermediate policy digest {}", self.to_hex());
        Ok(&self.bytes)
    }

    /// Extends with one line of hex text.
    ///
    /// Trailing `\r`/`\n` are ignored and an empty line is an empty term.
    ///
    /// # Errors
    /// * `TpmError::Structure` for an odd number of digits, a non-hex character or a term
    ///   longer than `POLICY_TERM_MAX_BYTES`
    pub fn extend_hex_line(&mut self, line: &str) -> Result<&[u8], TpmError> {
        let text = line.trim_end_matches(['\r', '\n']);
        if text.len() > POLICY_TERM_MAX_BYTES * 2 {
            return Err(TpmError::structure(
                "policy term",
                format!("{} hex digits exceeds the {} byte maximum", text.len(), POLICY_TERM_MAX_BYTES),
            ));
        }
        let term = hex::decode(text).map_err(|e| TpmError::structure("policy term", e.to_string()))?;
        self.extend(&term)
    }
}

/// Builds a policy digest from a file of hex terms, one per line
pub struct PolicyMaker;

impl PolicyMaker {
    /// # Errors
    /// * `TpmError::Structure` naming the 1-based line that failed
    /// * `TpmError::InternalError` if the input cannot be read
    pub fn from_reader<R: BufRead>(
        algorithm: AlgorithmId,
        start_from_zero: bool,
        reader: R,
    ) -> Result<PolicyDigest, TpmError> {
        let mut digest = PolicyDigest::new(algorithm, start_from_zero);
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TpmError::InternalError(format!("Failed to read policy input: {}", e)))?;
            digest.extend_hex_line(&line)
                .map_err(|e| e.in_field(format!("line {}", number + 1)))?;
        }
        Ok(digest)
    }
}
