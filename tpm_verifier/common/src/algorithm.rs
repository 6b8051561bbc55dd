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

//! Digest algorithm registry
//!
//! Maps TPM2 hash algorithm identifiers (TPM_ALG_ID) to their fixed digest sizes. Every other
//! component validates attacker-supplied length fields against this table before trusting them.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::error::TpmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum AlgorithmId {
    Sha1 = 0x0004,
    Sha256 = 0x000B,
    Sha384 = 0x000C,
    Sha512 = 0x000D,
    Sm3 = 0x0012,
}

impl AlgorithmId {
    /// All registered algorithms, in identifier order
    pub const ALL: [AlgorithmId; 5] = [
        AlgorithmId::Sha1,
        AlgorithmId::Sha256,
        AlgorithmId::Sha384,
        AlgorithmId::Sha512,
        AlgorithmId::Sm3,
    ];

    pub fn id(&self) -> u16 {
        *self as u16
    }

    pub fn digest_size(&self) -> usize {
        match self {
            AlgorithmId::Sha1 => 20,
            AlgorithmId::Sha256 => 32,
            AlgorithmId::Sha384 => 48,
            AlgorithmId::Sha512 => 64,
            AlgorithmId::Sm3 => 32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmId::Sha1 => "sha1",
            AlgorithmId::Sha256 => "sha256",
            AlgorithmId::Sha384 => "sha384",
            AlgorithmId::Sha512 => "sha512",
            AlgorithmId::Sm3 => "sm3",
        }
    }
}

/// Size lookup by raw identifier, `None` for anything not in the registry
pub fn digest_size_of(algorithm_id: u16) -> Option<usize> {
    AlgorithmId::try_from(algorithm_id).ok().map(|alg| alg.digest_size())
}

impl TryFrom<u16> for AlgorithmId {
    type Error = TpmError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0004 => Ok(AlgorithmId::Sha1),
            0x000B => Ok(AlgorithmId::Sha256),
            0x000C => Ok(AlgorithmId::Sha384),
            0x000D => Ok(AlgorithmId::Sha512),
            0x0012 => Ok(AlgorithmId::Sm3),
            _ => Err(TpmError::UnsupportedAlgorithm(value)),
        }
    }
}

impl FromStr for AlgorithmId {
    type Err = TpmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1" => Ok(AlgorithmId::Sha1),
            "sha256" => Ok(AlgorithmId::Sha256),
            "sha384" => Ok(AlgorithmId::Sha384),
            "sha512" => Ok(AlgorithmId::Sha512),
            "sm3" => Ok(AlgorithmId::Sm3),
            _ => Err(TpmError::structure("hash algorithm", format!("unsupported algorithm name: {}", s))),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A digest tagged with the algorithm that produced it.
///
/// The byte length always equals `algorithm.digest_size()`; the constructor refuses anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestValue {
    algorithm: AlgorithmId,
    bytes: Vec<u8>,
}

impl DigestValue {
    pub fn new(algorithm: AlgorithmId, bytes: Vec<u8>) -> Result<Self, TpmError> {
        if bytes.len() != algorithm.digest_size() {
            return Err(TpmError::structure(
                format!("{} digest", algorithm),
                format!("expected {} bytes, got {}", algorithm.digest_size(), bytes.len()),
            ));
        }
        Ok(Self { algorithm, bytes })
    }

    pub fn zero(algorithm: AlgorithmId) -> Self {
        Self {
            algorithm,
            bytes: vec![0u8; algorithm.digest_size()],
        }
    }

    pub fn from_hex(algorithm: AlgorithmId, hex_str: &str) -> Result<Self, TpmError> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::new(algorithm, bytes)
    }

    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl AsRef<[u8]> for DigestValue {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}
