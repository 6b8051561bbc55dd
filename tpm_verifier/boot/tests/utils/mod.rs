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

//! Builders for synthetic measurement logs

#![allow(dead_code)]

pub const EV_POST_CODE: u32 = 0x0000_0001;
pub const EV_NO_ACTION: u32 = 0x0000_0003;
pub const EV_SEPARATOR: u32 = 0x0000_0004;

pub const ALG_SHA1: u16 = 0x0004;
pub const ALG_SHA256: u16 = 0x000B;

/// Event data of a Spec-ID header declaring `algorithms` as (id, size) pairs
pub fn spec_id_event_data(algorithms: &[(u16, u16)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"Spec ID Event03\0");
    data.extend_from_slice(&0u32.to_le_bytes()); // platformClass
    data.extend_from_slice(&[0, 2, 0, 2]); // minor, major, errata, uintnSize
    data.extend_from_slice(&(algorithms.len() as u32).to_le_bytes());
    for (id, size) in algorithms {
        data.extend_from_slice(&id.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
    }
    data.push(0); // vendorInfoSize
    data
}

pub fn v1_record(pcr_index: u32, event_type: u32, digest: [u8; 20], event_data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pcr_index.to_le_bytes());
    out.extend_from_slice(&event_type.to_le_bytes());
    out.extend_from_slice(&digest);
    out.extend_from_slice(&(event_data.len() as u32).to_le_bytes());
    out.extend_from_slice(event_data);
    out
}

/// A V2 record whose digest count field is written as given, independent of `digests`
pub fn v2_record_with_count(
    pcr_index: u32,
    event_type: u32,
    count: u32,
    digests: &[(u16, Vec<u8>)],
    event_data: &[u8],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pcr_index.to_le_bytes());
    out.extend_from_slice(&event_type.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    for (id, digest) in digests {
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(digest);
    }
    out.extend_from_slice(&(event_data.len() as u32).to_le_bytes());
    out.extend_from_slice(event_data);
    out
}

pub fn v2_record(pcr_index: u32, event_type: u32, digests: &[(u16, Vec<u8>)], event_data: &[u8]) -> Vec<u8> {
    v2_record_with_count(pcr_index, event_type, digests.len() as u32, digests, event_data)
}

/// First record of a crypto-agile log
pub fn header_record(algorithms: &[(u16, u16)]) -> Vec<u8> {
    v1_record(0, EV_NO_ACTION, [0u8; 20], &spec_id_event_data(algorithms))
}

pub fn sha256_header() -> Vec<u8> {
    header_record(&[(ALG_SHA1, 20), (ALG_SHA256, 32)])
}
