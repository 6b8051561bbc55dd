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

//! Measurement log data model
//!
//! Event types, the two record layouts (SHA-1 only and crypto-agile) and the Spec-ID header
//! carried by the first record of a crypto-agile log.

use std::fmt;
use serde::Serialize;
use tpm_common_verifier::{AlgorithmId, DigestValue};

/// Upper bound for `eventDataSize` unless a caller configures another one
pub const TCG_EVENT_LEN_MAX: u32 = 4096;
pub const SHA1_DIGEST_SIZE: usize = 20;
/// A V2 record carries at most one digest per registered algorithm
pub const MAX_DIGEST_COUNT: u32 = AlgorithmId::ALL.len() as u32;
/// Capacity of the Spec-ID algorithm table
pub const MAX_SPEC_ID_ALGORITHMS: u32 = 16;
pub const SPEC_ID_SIGNATURE_SIZE: usize = 16;

/// "Spec ID Event03" followed by a NUL terminator
pub const SPEC_ID_EVENT_SIGNATURE_03: &[u8; SPEC_ID_SIGNATURE_SIZE] = b"Spec ID Event03\0";

/// TCG event type.
///
/// Values outside the well-known table are kept as `Unknown` with their raw value so that a
/// decoded record re-encodes to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PrebootCert,
    PostCode,
    Unused,
    NoAction,
    Separator,
    Action,
    EventTag,
    SCrtmContents,
    SCrtmVersion,
    CpuMicrocode,
    PlatformConfigFlags,
    TableOfDevices,
    CompactHash,
    Ipl,
    IplPartitionData,
    NonhostCode,
    NonhostConfig,
    NonhostInfo,
    OmitBootDeviceEvents,
    EfiEventBase,
    EfiVariableDriverConfig,
    EfiVariableBoot,
    EfiBootServicesApplication,
    EfiBootServicesDriver,
    EfiRuntimeServicesDriver,
    EfiGptEvent,
    EfiAction,
    EfiPlatformFirmwareBlob,
    EfiHandoffTables,
    EfiHcrtmEvent,
    EfiVariableAuthority,
    Unknown(u32),
}

const EVENT_TYPE_TABLE: &[(EventType, u32, &str)] = &[
    (EventType::PrebootCert, 0x0000_0000, "EV_PREBOOT_CERT"),
    (EventType::PostCode, 0x0000_0001, "EV_POST_CODE"),
    (EventType::Unused, 0x0000_0002, "EV_UNUSED"),
    (EventType::NoAction, 0x0000_0003, "EV_NO_ACTION"),
    (EventType::Separator, 0x0000_0004, "EV_SEPARATOR"),
    (EventType::Action, 0x0000_0005, "EV_ACTION"),
    (EventType::EventTag, 0x0000_0006, "EV_EVENT_TAG"),
    (EventType::SCrtmContents, 0x0000_0007, "EV_S_CRTM_CONTENTS"),
    (EventType::SCrtmVersion, 0x0000_0008, "EV_S_CRTM_VERSION"),
    (EventType::CpuMicrocode, 0x0000_0009, "EV_CPU_MICROCODE"),
    (EventType::PlatformConfigFlags, 0x0000_000A, "EV_PLATFORM_CONFIG_FLAGS"),
    (EventType::TableOfDevices, 0x0000_000B, "EV_TABLE_OF_DEVICES"),
    (EventType::CompactHash, 0x0000_000C, "EV_COMPACT_HASH"),
    (EventType::Ipl, 0x0000_000D, "EV_IPL"),
    (EventType::IplPartitionData, 0x0000_000E, "EV_IPL_PARTITION_DATA"),
    (EventType::NonhostCode, 0x0000_000F, "EV_NONHOST_CODE"),
    (EventType::NonhostConfig, 0x0000_0010, "EV_NONHOST_CONFIG"),
    (EventType::NonhostInfo, 0x0000_0011, "EV_NONHOST_INFO"),
    (EventType::OmitBootDeviceEvents, 0x0000_0012, "EV_OMIT_BOOT_DEVICE_EVENTS"),
    (EventType::EfiEventBase, 0x8000_0000, "EV_EFI_EVENT_BASE"),
    (EventType::EfiVariableDriverConfig, 0x8000_0001, "EV_EFI_VARIABLE_DRIVER_CONFIG"),
    (EventType::EfiVariableBoot, 0x8000_0002, "EV_EFI_VARIABLE_BOOT"),
    (EventType::EfiBootServicesApplication, 0x8000_0003, "EV_EFI_BOOT_SERVICES_APPLICATION"),
    (EventType::EfiBootServicesDriver, 0x8000_0004, "EV_EFI_BOOT_SERVICES_DRIVER"),
    (EventType::EfiRuntimeServicesDriver, 0x8000_0005, "EV_EFI_RUNTIME_SERVICES_DRIVER"),
    (EventType::EfiGptEvent, 0x8000_0006, "EV_EFI_GPT_EVENT"),
    (EventType::EfiAction, 0x8000_0007, "EV_EFI_ACTION"),
    (EventType::EfiPlatformFirmwareBlob, 0x8000_0008, "EV_EFI_PLATFORM_FIRMWARE_BLOB"),
    (EventType::EfiHandoffTables, 0x8000_0009, "EV_EFI_HANDOFF_TABLES"),
    (EventType::EfiHcrtmEvent, 0x8000_0010, "EV_EFI_HCRTM_EVENT"),
    (EventType::EfiVariableAuthority, 0x8000_00E0, "EV_EFI_VARIABLE_AUTHORITY"),
];

impl EventType {
    pub fn from_u32(value: u32) -> Self {
        EVENT_TYPE_TABLE.iter()
            .find(|(_, raw, _)| *raw == value)
            .map_or(EventType::Unknown(value), |(event_type, _, _)| *event_type)
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EventType::Unknown(raw) => *raw,
            known => EVENT_TYPE_TABLE.iter()
                .find(|(event_type, _, _)| event_type == known)
                .map_or(0xFFFF_FFFF, |(_, raw, _)| *raw),
        }
    }

    /// TCG name such as `EV_SEPARATOR`, `None` for unknown values
    pub fn name(&self) -> Option<&'static str> {
        EVENT_TYPE_TABLE.iter()
            .find(|(event_type, _, _)| event_type == self)
            .map(|(_, _, name)| *name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "EV_UNKNOWN(0x{:08x})", self.as_u32()),
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// SHA-1 only record (TCG_PCR_EVENT). Also the layout of the first record of a crypto-agile log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecordV1 {
    pub pcr_index: u32,
    pub event_type: EventType,
    pub digest: DigestValue,
    pub event_data: Vec<u8>,
}

/// Crypto-agile record (TCG_PCR_EVENT2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecordV2 {
    pub pcr_index: u32,
    pub event_type: EventType,
    /// One digest per algorithm, in wire order, algorithms distinct
    pub digests: Vec<DigestValue>,
    pub event_data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    V1(EventRecordV1),
    V2(EventRecordV2),
}

impl EventRecord {
    pub fn pcr_index(&self) -> u32 {
        match self {
            EventRecord::V1(record) => record.pcr_index,
            EventRecord::V2(record) => record.pcr_index,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            EventRecord::V1(record) => record.event_type,
            EventRecord::V2(record) => record.event_type,
        }
    }

    pub fn event_data(&self) -> &[u8] {
        match self {
            EventRecord::V1(record) => &record.event_data,
            EventRecord::V2(record) => &record.event_data,
        }
    }

    /// The digest this record carries for `alg`, if any
    pub fn digest_for(&self, alg: AlgorithmId) -> Option<&DigestValue> {
        match self {
            EventRecord::V1(record) => Some(&record.digest).filter(|d| d.algorithm() == alg),
            EventRecord::V2(record) => record.digests.iter().find(|d| d.algorithm() == alg),
        }
    }

    pub fn digests(&self) -> Vec<&DigestValue> {
        match self {
            EventRecord::V1(record) => vec![&record.digest],
            EventRecord::V2(record) => record.digests.iter().collect(),
        }
    }
}

/// One entry of the Spec-ID algorithm table, kept raw so unknown identifiers survive re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecIdAlgorithm {
    pub algorithm_id: u16,
    pub digest_size: u16,
}

/// TCG_EfiSpecIDEvent: the event data of the first record of a crypto-agile log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIdHeader {
    pub signature: [u8; SPEC_ID_SIGNATURE_SIZE],
    pub platform_class: u32,
    pub spec_version_minor: u8,
    pub spec_version_major: u8,
    pub spec_errata: u8,
    pub uintn_size: u8,
    pub algorithms: Vec<SpecIdAlgorithm>,
    pub vendor_info: Vec<u8>,
}

impl SpecIdHeader {
    /// Declared digest size for a registered algorithm, `None` if the header does not list it
    pub fn declared_size(&self, alg: AlgorithmId) -> Option<u16> {
        self.algorithms.iter()
            .find(|entry| entry.algorithm_id == alg.id())
            .map(|entry| entry.digest_size)
    }

    /// Registered algorithms declared by the header with their sizes, in header order
    pub fn algorithm_sizes(&self) -> Vec<(AlgorithmId, usize)> {
        self.algorithms.iter()
            .filter_map(|entry| {
                AlgorithmId::try_from(entry.algorithm_id)
                    .ok()
                    .map(|alg| (alg, entry.digest_size as usize))
            })
            .collect()
    }

    /// Identifiers listed by the header that the registry does not know
    pub fn unrecognized(&self) -> Vec<u16> {
        self.algorithms.iter()
            .map(|entry| entry.algorithm_id)
            .filter(|id| AlgorithmId::try_from(*id).is_err())
            .collect()
    }

    pub fn number_of_algorithms(&self) -> u32 {
        self.algorithms.len() as u32
    }
}
