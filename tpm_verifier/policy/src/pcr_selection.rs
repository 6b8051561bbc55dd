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

//! TPMS_PCR_SELECTION for a single bank

use byteorder::{BigEndian, WriteBytesExt};
use tpm_common_verifier::{AlgorithmId, TpmError, IMPLEMENTATION_PCR, PCR_INDEX_MAX, PCR_INDEX_MIN};
use tpm_common_verifier::pcr::check_pcr_index;

/// Bytes in the select bitmap, enough for PCR 0-23
pub const PCR_SELECT_SIZE: u8 = 3;
const PCR_MASK_MAX: u32 = 0x00FF_FFFF;

/// PCR selection for one hash algorithm.
///
/// Bit `n` of the bitmap selects PCR `n`; byte 0 holds PCRs 0-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcrSelection {
    pub hash_alg: AlgorithmId,
    pcr_select: [u8; PCR_SELECT_SIZE as usize],
}

impl PcrSelection {
    /// Builds a selection from a bit mask, bit `n` for PCR `n`.
    ///
    /// The mask `0x010000` selects PCR 16 only.
    ///
    /// # Errors
    /// * `TpmError::Range` if a bit above PCR 23 is set
    pub fn from_byte_mask(hash_alg: AlgorithmId, mask: u32) -> Result<Self, TpmError> {
        if mask > PCR_MASK_MAX {
            let highest = 31 - mask.leading_zeros();
            return Err(TpmError::Range { index: highest, min: PCR_INDEX_MIN, max: PCR_INDEX_MAX });
        }
        let pcr_select = [
            (mask & 0xff) as u8,
            ((mask >> 8) & 0xff) as u8,
            ((mask >> 16) & 0xff) as u8,
        ];
        Ok(Self { hash_alg, pcr_select })
    }

    pub fn from_indices(hash_alg: AlgorithmId, indices: &[u32]) -> Result<Self, TpmError> {
        let mut pcr_select = [0u8; PCR_SELECT_SIZE as usize];
        for index in indices {
            check_pcr_index(*index)?;
            pcr_select[(*index / 8) as usize] |= 1 << (*index % 8);
        }
        Ok(Self { hash_alg, pcr_select })
    }

    /// Check if the specified PCR index is selected
    pub fn is_pcr_selected(&self, pcr_index: u32) -> bool {
        let byte_index = (pcr_index / 8) as usize;
        let mask = 1u8 << (pcr_index % 8);
        byte_index < self.pcr_select.len() && (self.pcr_select[byte_index] & mask) != 0
    }

    /// Selected PCRs in ascending order
    pub fn selected_indices(&self) -> Vec<u32> {
        (0..IMPLEMENTATION_PCR as u32)
            .filter(|index| self.is_pcr_selected(*index))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.pcr_select.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pcr_select.iter().all(|b| *b == 0)
    }

    pub fn pcr_select(&self) -> &[u8] {
        &self.pcr_select
    }

    /// Appends `hash (u16 BE) || sizeofSelect (u8) || pcrSelect`
    pub fn marshal(&self, out: &mut Vec<u8>) -> Result<(), TpmError> {
        out.write_u16::<BigEndian>(self.hash_alg.id())
            .map_err(|e| TpmError::InternalError(format!("Failed to write hash_alg: {}", e)))?;
        out.push(PCR_SELECT_SIZE);
        out.extend_from_slice(&self.pcr_select);
        Ok(())
    }
}
