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

mod algorithm;
mod crypto_utils;
mod error;
pub mod pcr;

pub use algorithm::{AlgorithmId, DigestValue, digest_size_of};
pub use crypto_utils::CryptoVerifier;
pub use error::TpmError;
pub use pcr::{PcrBank, PcrValues, PcrValueEntry, PCR_INDEX_MIN, PCR_INDEX_MAX, IMPLEMENTATION_PCR};
