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

//! Event Log Serialization
//!
//! Re-encoding of decoded records to their wire layout and a JSON view for display.

use byteorder::{LittleEndian, WriteBytesExt};
use serde_json::{json, Map, Value};
use tpm_common_verifier::TpmError;
use crate::event::log::EventLog;
use crate::event::model::{EventRecord, EventRecordV1, EventRecordV2, SpecIdHeader};

fn write_u32(out: &mut Vec<u8>, value: u32) -> Result<(), TpmError> {
    out.write_u32::<LittleEndian>(value)
        .map_err(|e| TpmError::InternalError(format!("Failed to write u32: {}", e)))
}

fn write_u16(out: &mut Vec<u8>, value: u16) -> Result<(), TpmError> {
    out.write_u16::<LittleEndian>(value)
        .map_err(|e| TpmError::InternalError(format!("Failed to write u16: {}", e)))
}

fn length_u32(len: usize, field: &str) -> Result<u32, TpmError> {
    u32::try_from(len).map_err(|_| TpmError::structure(field, format!("length {} does not fit in 32 bits", len)))
}

impl EventRecordV1 {
    pub fn marshal(&self) -> Result<Vec<u8>, TpmError> {
        let mut out = Vec::with_capacity(32 + self.event_data.len());
        write_u32(&mut out, self.pcr_index)?;
        write_u32(&mut out, self.event_type.as_u32())?;
        out.extend_from_slice(self.digest.as_bytes());
        write_u32(&mut out, length_u32(self.event_data.len(), "eventDataSize")?)?;
        out.extend_from_slice(&self.event_data);
        Ok(out)
    }
}

impl EventRecordV2 {
    pub fn marshal(&self) -> Result<Vec<u8>, TpmError> {
        let mut out = Vec::new();
        write_u32(&mut out, self.pcr_index)?;
        write_u32(&mut out, self.event_type.as_u32())?;
        write_u32(&mut out, length_u32(self.digests.len(), "digests.count")?)?;
        for digest in &self.digests {
            write_u16(&mut out, digest.algorithm().id())?;
            out.extend_from_slice(digest.as_bytes());
        }
        write_u32(&mut out, length_u32(self.event_data.len(), "eventDataSize")?)?;
        out.extend_from_slice(&self.event_data);
        Ok(out)
    }
}

impl EventRecord {
    pub fn marshal(&self) -> Result<Vec<u8>, TpmError> {
        match self {
            EventRecord::V1(record) => record.marshal(),
            EventRecord::V2(record) => record.marshal(),
        }
    }

    pub fn to_json_value(&self, event_number: usize) -> Value {
        let mut digests = Map::new();
        for digest in self.digests() {
            digests.insert(digest.algorithm().name().to_string(), Value::String(digest.to_hex()));
        }
        json!({
            "event_number": event_number,
            "pcr_index": self.pcr_index(),
            "event_type": self.event_type().to_string(),
            "digests": digests,
            "event_size": self.event_data().len(),
            "event": hex::encode(self.event_data()),
        })
    }
}

impl SpecIdHeader {
    /// Event data bytes of the first record of a crypto-agile log
    pub fn marshal(&self) -> Result<Vec<u8>, TpmError> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.signature);
        write_u32(&mut out, self.platform_class)?;
        out.extend_from_slice(&[self.spec_version_minor, self.spec_version_major, self.spec_errata, self.uintn_size]);
        write_u32(&mut out, length_u32(self.algorithms.len(), "numberOfAlgorithms")?)?;
        for entry in &self.algorithms {
            write_u16(&mut out, entry.algorithm_id)?;
            write_u16(&mut out, entry.digest_size)?;
        }
        let vendor_info_size = u8::try_from(self.vendor_info.len())
            .map_err(|_| TpmError::structure("vendorInfoSize", "vendor info longer than 255 bytes"))?;
        out.push(vendor_info_size);
        out.extend_from_slice(&self.vendor_info);
        Ok(out)
    }

    pub fn to_json_value(&self) -> Value {
        let algorithms: Vec<Value> = self.algorithms.iter()
            .map(|entry| json!({
                "algorithm_id": format!("0x{:04x}", entry.algorithm_id),
                "digest_size": entry.digest_size,
            }))
            .collect();
        json!({
            "signature": String::from_utf8_lossy(&self.signature).trim_end_matches('\0'),
            "platform_class": self.platform_class,
            "spec_version": format!("{}.{}.{}", self.spec_version_major, self.spec_version_minor, self.spec_errata),
            "uintn_size": self.uintn_size,
            "algorithms": algorithms,
            "vendor_info": hex::encode(&self.vendor_info),
        })
    }
}

impl EventLog {
    /// Concatenated wire encoding of every decoded record
    pub fn marshal(&self) -> Result<Vec<u8>, TpmError> {
        let mut out = Vec::new();
        for record in &self.records {
            out.extend(record.marshal()?);
        }
        Ok(out)
    }

    pub fn to_json_value(&self) -> Value {
        let events: Vec<Value> = self.records.iter()
            .enumerate()
            .map(|(number, record)| record.to_json_value(number))
            .collect();
        let mut object = Map::new();
        if let Some(spec_id) = &self.spec_id {
            object.insert("spec_id".to_string(), spec_id.to_json_value());
        }
        object.insert("event_log".to_string(), Value::Array(events));
        if let Some(e) = &self.error {
            object.insert("error".to_string(), Value::String(e.to_string()));
        }
        Value::Object(object)
    }
}
