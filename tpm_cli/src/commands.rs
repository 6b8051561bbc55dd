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

//! Command handlers. Each returns the text destined for stdout.

use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use log::{debug, info};
use serde_json::{json, Value};
use tpm_boot_verifier::{DecoderLimits, EventLog, PcrReplayPolicy};
use tpm_common_verifier::{AlgorithmId, PcrBank, PcrValues, TpmError};
use tpm_policy_maker::{
    build_pcr_composite, policy_pcr_term_hex, policy_signed_ahash, read_pcr_values,
    PcrSelection, PolicyMaker,
};
use crate::cli::Commands;
use crate::config::ToolConfig;

pub fn run(command: &Commands, config: &ToolConfig) -> Result<String, Box<dyn Error>> {
    match command {
        Commands::Eventextend { input, hash_alg, pcr_max, print_events, expected, base64 } => {
            let policy = PcrReplayPolicy::new(
                hash_alg.unwrap_or(config.replay.hash_alg),
                pcr_max.unwrap_or(config.replay.pcr_max),
            )?;
            let limits = DecoderLimits { max_event_size: config.max_event_size };
            deal_eventextend(input, &policy, limits, *print_events, expected.as_deref(), *base64)
        },
        Commands::Policymaker { input, hash_alg, nz, output, print } => {
            let alg = hash_alg.unwrap_or(config.default_hash_alg);
            deal_policymaker(input, alg, *nz, output.as_deref(), *print)
        },
        Commands::Policymakerpcr { bm, input, hash_alg, output, print } => {
            let alg = hash_alg.unwrap_or(config.default_hash_alg);
            deal_policymakerpcr(bm, input.as_deref(), alg, output.as_deref(), *print)
        },
        Commands::PolicysignedAhash { nonce, cp_hash, policy_ref, expiration, hash_alg, output } => {
            let alg = hash_alg.unwrap_or(config.default_hash_alg);
            deal_policysigned_ahash(
                nonce.as_deref(),
                cp_hash.as_deref(),
                policy_ref.as_deref(),
                *expiration,
                alg,
                output.as_deref(),
            )
        },
    }
}

fn bank_to_json(bank: &PcrBank, policy: &PcrReplayPolicy) -> Value {
    let pcr_values: Vec<Value> = bank.bank(policy.hash_alg)
        .filter(|(index, _)| policy.contains(*index))
        .map(|(index, value)| json!({ "pcr_index": index, "pcr_value": value.to_hex() }))
        .collect();
    json!({ "hash_alg": policy.hash_alg, "pcr_values": pcr_values })
}

pub fn deal_eventextend(
    input: &Path,
    policy: &PcrReplayPolicy,
    limits: DecoderLimits,
    print_events: bool,
    expected: Option<&Path>,
    base64: bool,
) -> Result<String, Box<dyn Error>> {
    let log = if base64 {
        EventLog::parse_base64(&fs::read_to_string(input)?, limits)?
    } else {
        EventLog::parse_with_limits(&fs::read(input)?, limits)
    };
    info!("{}: {} event(s), crypto agile: {}", input.display(), log.records.len(), log.is_crypto_agile());

    // The partial decode carries both the events read so far and the error
    if let Some(e) = &log.error {
        return Err(format!(
            "event log decoding failed: {}\n{}", e, serde_json::to_string_pretty(&log.to_json_value())?
        ).into());
    }

    let mut output = Vec::new();
    if print_events {
        output.push(serde_json::to_string_pretty(&log.to_json_value())?);
    }

    let bank = log.replay(policy)?;
    let mut result = bank_to_json(&bank, policy);

    if let Some(expected) = expected {
        let reported: Value = serde_json::from_reader(BufReader::new(File::open(expected)?))?;
        let mut reported = PcrValues::from_json(&reported)?;
        if reported.hash_alg != policy.hash_alg {
            return Err(format!(
                "expected values are for {}, replay used {}", reported.hash_alg, policy.hash_alg
            ).into());
        }
        let matched = bank.compare(&mut reported)?;
        result = serde_json::to_value(&reported)?;
        if !matched {
            return Err(format!(
                "replayed PCR values do not match:\n{}", serde_json::to_string_pretty(&result)?
            ).into());
        }
    }

    output.push(serde_json::to_string_pretty(&result)?);
    Ok(output.join("\n"))
}

pub fn deal_policymaker(
    input: &Path,
    alg: AlgorithmId,
    nz: bool,
    output: Option<&Path>,
    print: bool,
) -> Result<String, Box<dyn Error>> {
    let digest = PolicyMaker::from_reader(alg, !nz, BufReader::new(File::open(input)?))?;
    debug!("policy digest {} over {}", digest.to_hex(), input.display());

    if let Some(output) = output {
        fs::write(output, digest.digest())?;
    }
    if print || output.is_none() {
        return Ok(digest.to_hex());
    }
    Ok(String::new())
}

fn parse_pcr_mask(bm: &str) -> Result<u32, TpmError> {
    let text = bm.trim();
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
    u32::from_str_radix(digits, 16)
        .map_err(|e| TpmError::structure("PCR mask", format!("{}: {}", bm, e)))
}

pub fn deal_policymakerpcr(
    bm: &str,
    input: Option<&Path>,
    alg: AlgorithmId,
    output: Option<&Path>,
    print: bool,
) -> Result<String, Box<dyn Error>> {
    let selection = PcrSelection::from_byte_mask(alg, parse_pcr_mask(bm)?)?;
    let values = match input {
        Some(input) => read_pcr_values(&selection, BufReader::new(File::open(input)?))?,
        None if selection.is_empty() => Vec::new(),
        None => return Err("PCR values are required for a non-empty mask".into()),
    };

    let composite = build_pcr_composite(alg, &values)?;
    let term = policy_pcr_term_hex(&selection, &composite)?;
    debug!("PCR selection {:?}, composite {}", selection.selected_indices(), composite.to_hex());

    if let Some(output) = output {
        fs::write(output, format!("{}\n", term))?;
    }
    if print || output.is_none() {
        return Ok(term);
    }
    Ok(String::new())
}

fn read_optional(path: Option<&Path>) -> Result<Vec<u8>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => Ok(Vec::new()),
    }
}

pub fn deal_policysigned_ahash(
    nonce: Option<&Path>,
    cp_hash: Option<&Path>,
    policy_ref: Option<&Path>,
    expiration: i32,
    alg: AlgorithmId,
    output: Option<&Path>,
) -> Result<String, Box<dyn Error>> {
    let ahash = policy_signed_ahash(
        alg,
        &read_optional(nonce)?,
        expiration,
        &read_optional(cp_hash)?,
        &read_optional(policy_ref)?,
    )?;
    if let Some(output) = output {
        fs::write(output, ahash.as_bytes())?;
    }
    Ok(ahash.to_hex())
}
