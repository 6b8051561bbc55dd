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

//! PolicySigned authorization hash

use tpm_common_verifier::{AlgorithmId, CryptoVerifier, DigestValue, TpmError};

/// `aHash = H(nonceTPM || expiration || cpHashA || policyRef)`.
///
/// `expiration` is marshaled as a big-endian INT32 and is always present; the other three parts
/// are optional and contribute nothing when empty. Signing the result is left to the caller.
pub fn policy_signed_ahash(
    algorithm: AlgorithmId,
    nonce_tpm: &[u8],
    expiration: i32,
    cp_hash_a: &[u8],
    policy_ref: &[u8],
) -> Result<DigestValue, TpmError> {
    let expiration_be = expiration.to_be_bytes();
    CryptoVerifier::hash(algorithm, &[nonce_tpm, &expiration_be[..], cp_hash_a, policy_ref])
}
