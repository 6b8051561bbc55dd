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

//! Error taxonomy shared by the measurement log decoder, the PCR replay engine
//! and the policy digest builder.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TpmError {
    /// A fixed-width read ran past the end of the buffer
    #[error("Insufficient data for {field}: requested {needed} bytes but only {remaining} bytes remain")]
    InsufficientData {
        field: String,
        needed: u64,
        remaining: u64,
    },

    /// Malformed field, size out of bounds or inconsistent content
    #[error("Structure error in {field}: {reason}")]
    Structure {
        field: String,
        reason: String,
    },

    /// Algorithm identifier with no registered digest size
    #[error("Unsupported algorithm: 0x{0:04x}")]
    UnsupportedAlgorithm(u16),

    #[error("PCR index {index} out of range {min}-{max}")]
    Range {
        index: u32,
        min: u32,
        max: u32,
    },

    /// Failure inside the hash backend
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl TpmError {
    pub fn structure(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TpmError::Structure {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Re-labels the error with a field path, turning short reads into structure errors.
    ///
    /// Used by the record decoder so that every failure names the record and field it occurred in.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        match self {
            TpmError::InsufficientData { needed, remaining, .. } => TpmError::Structure {
                field,
                reason: format!("truncated, requested {} bytes but only {} bytes remain", needed, remaining),
            },
            TpmError::Structure { field: inner, reason } => TpmError::Structure {
                field: format!("{}: {}", field, inner),
                reason,
            },
            TpmError::UnsupportedAlgorithm(id) => TpmError::Structure {
                field,
                reason: format!("unknown algorithm 0x{:04x}", id),
            },
            other => other,
        }
    }
}

impl From<hex::FromHexError> for TpmError {
    fn from(e: hex::FromHexError) -> Self {
        TpmError::structure("hex input", e.to_string())
    }
}

impl From<openssl::error::ErrorStack> for TpmError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        TpmError::InternalError(e.to_string())
    }
}
