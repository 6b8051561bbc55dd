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

//! PCR replay
//!
//! Recomputes PCR values from a decoded log by extending, in log order, each record's digest
//! for the replay algorithm into the record's PCR. Which bank and which PCR range take part is
//! an explicit `PcrReplayPolicy`; the reference policy is SHA-256 over PCR 0-7.

use log::{debug, warn};
use serde::{Serialize, Deserialize};
use tpm_common_verifier::{AlgorithmId, PcrBank, TpmError, PCR_INDEX_MAX, PCR_INDEX_MIN};
use crate::event::log::EventLog;
use crate::event::model::{EventRecord, EventType};

/// Highest PCR replayed by the reference policy
pub const REFERENCE_PCR_MAX: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcrReplayPolicy {
    pub hash_alg: AlgorithmId,
    pub pcr_min: u32,
    pub pcr_max: u32,
}

impl PcrReplayPolicy {
    /// SHA-256 bank, PCR 0-7
    pub fn reference() -> Self {
        Self { hash_alg: AlgorithmId::Sha256, pcr_min: PCR_INDEX_MIN, pcr_max: REFERENCE_PCR_MAX }
    }

    /// Every PCR of one bank
    pub fn all_pcrs(hash_alg: AlgorithmId) -> Self {
        Self { hash_alg, pcr_min: PCR_INDEX_MIN, pcr_max: PCR_INDEX_MAX }
    }

    /// # Errors
    /// * `TpmError::Range` if `pcr_max` is not a PCR index
    pub fn new(hash_alg: AlgorithmId, pcr_max: u32) -> Result<Self, TpmError> {
        if pcr_max > PCR_INDEX_MAX {
            return Err(TpmError::Range { index: pcr_max, min: PCR_INDEX_MIN, max: PCR_INDEX_MAX });
        }
        Ok(Self { hash_alg, pcr_min: PCR_INDEX_MIN, pcr_max })
    }

    pub fn contains(&self, pcr_index: u32) -> bool {
        (self.pcr_min..=self.pcr_max).contains(&pcr_index)
    }
}

impl Default for PcrReplayPolicy {
    fn default() -> Self {
        Self::reference()
    }
}

pub struct PcrReplayEngine {
    policy: PcrReplayPolicy,
}

impl PcrReplayEngine {
    pub fn new(policy: PcrReplayPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PcrReplayPolicy {
        &self.policy
    }

    /// A zeroed bank tracking the policy's algorithm
    pub fn initial_bank(&self) -> PcrBank {
        PcrBank::new(&[self.policy.hash_alg])
    }

    /// Replays `records` on top of `bank` and returns the final state.
    ///
    /// `EV_NO_ACTION` records are informational and never extended.
    ///
    /// # Errors
    /// * `TpmError::Range` if a record targets a PCR outside the policy range
    /// * `TpmError::Structure` if a record lacks a digest for the policy's algorithm, or the
    ///   bank does not track that algorithm
    pub fn replay<'r, I>(&self, records: I, mut bank: PcrBank) -> Result<PcrBank, TpmError>
    where
        I: IntoIterator<Item = &'r EventRecord>,
    {
        let alg = self.policy.hash_alg;
        let mut extended = 0usize;
        for (number, record) in records.into_iter().enumerate() {
            if record.event_type() == EventType::NoAction {
                debug!("event {} is EV_NO_ACTION, not extended", number);
                continue;
            }

            let index = record.pcr_index();
            if !self.policy.contains(index) {
                warn!("event {} targets PCR {} outside the replayed range {}-{}",
                    number, index, self.policy.pcr_min, self.policy.pcr_max);
                return Err(TpmError::Range { index, min: self.policy.pcr_min, max: self.policy.pcr_max });
            }

            let digest = record.digest_for(alg).ok_or_else(|| TpmError::structure(
                format!("event {}", number),
                format!("no {} digest", alg),
            ))?;
            bank.extend(index, digest)?;
            extended += 1;
        }
        debug!("replay extended {} event(s) into the {} bank", extended, alg);
        Ok(bank)
    }
}

impl EventLog {
    /// Replays every decoded record from zeroed PCRs.
    ///
    /// A log that stopped decoding early is refused.
    ///
    /// # Errors
    /// * the decode error, if decoding did not finish
    /// * any error of `PcrReplayEngine::replay`
    pub fn replay(&self, policy: &PcrReplayPolicy) -> Result<PcrBank, TpmError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        let engine = PcrReplayEngine::new(*policy);
        engine.replay(&self.records, engine.initial_bank())
    }
}
