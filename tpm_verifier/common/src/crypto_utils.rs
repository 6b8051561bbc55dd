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

//! Hash primitive
//!
//! This module provides helper functions for:
//! - Converting between algorithm IDs and OpenSSL message digests
//! - Hashing a sequence of byte parts as one concatenated message
//! - The TPM extend operation `new = H(old || data)`
use openssl::hash::{Hasher, MessageDigest};
use crate::algorithm::{AlgorithmId, DigestValue};
use crate::error::TpmError;

pub struct CryptoVerifier;

impl CryptoVerifier {
    pub fn algorithm_to_message_digest(alg: AlgorithmId) -> MessageDigest {
        match alg {
            AlgorithmId::Sha1 => MessageDigest::sha1(),
            AlgorithmId::Sha256 => MessageDigest::sha256(),
            AlgorithmId::Sha384 => MessageDigest::sha384(),
            AlgorithmId::Sha512 => MessageDigest::sha512(),
            AlgorithmId::Sm3 => MessageDigest::sm3(),
        }
    }

    /// Hashes the concatenation of `parts`.
    ///
    /// Zero-length parts are skipped; they contribute nothing to the message, so
    /// `hash(a, &[x, b"", y]) == hash(a, &[x, y])`.
    ///
    /// # Errors
    /// * `TpmError::InternalError` if the OpenSSL hasher fails
    pub fn hash(alg: AlgorithmId, parts: &[&[u8]]) -> Result<DigestValue, TpmError> {
        let mut hasher = Hasher::new(Self::algorithm_to_message_digest(alg))
            .map_err(|e| TpmError::InternalError(format!("Failed to create hasher: {}", e)))?;

        for part in parts.iter().filter(|p| !p.is_empty()) {
            hasher.update(part)
                .map_err(|e| TpmError::InternalError(format!("Failed to update hash: {}", e)))?;
        }

        let digest = hasher.finish()
            .map_err(|e| TpmError::InternalError(format!("Failed to finalize hash: {}", e)))?;

        DigestValue::new(alg, digest.to_vec())
    }

    /// The extend operation: `H(current || data)` under `alg`.
    ///
    /// `current` may be empty, which is how a "no leading zero" policy accumulator starts.
    pub fn extend(alg: AlgorithmId, current: &[u8], data: &[u8]) -> Result<DigestValue, TpmError> {
        Self::hash(alg, &[current, data])
    }
}
