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

//! Tool configuration, loaded once per process

use std::path::Path;
use serde::{Deserialize, Serialize};
use common_log::config::LogConfig;
use config_manager::ConfigSingleton;
use tpm_boot_verifier::{REFERENCE_PCR_MAX, TCG_EVENT_LEN_MAX};
use tpm_common_verifier::AlgorithmId;

pub static TOOL_CONFIG: ConfigSingleton<ToolConfig> = ConfigSingleton::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_hash_alg")]
    pub default_hash_alg: AlgorithmId,
    #[serde(default = "default_max_event_size")]
    pub max_event_size: u32,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_hash_alg")]
    pub hash_alg: AlgorithmId,
    #[serde(default = "default_pcr_max")]
    pub pcr_max: u32,
}

fn default_hash_alg() -> AlgorithmId {
    AlgorithmId::Sha256
}

fn default_max_event_size() -> u32 {
    TCG_EVENT_LEN_MAX
}

fn default_pcr_max() -> u32 {
    REFERENCE_PCR_MAX
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { hash_alg: default_hash_alg(), pcr_max: default_pcr_max() }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            default_hash_alg: default_hash_alg(),
            max_event_size: default_max_event_size(),
            replay: ReplayConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Loads the configuration from `path`, or installs the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<&'static ToolConfig, String> {
    match path {
        Some(path) => TOOL_CONFIG.initialize(path)?,
        None => TOOL_CONFIG.initialize_with(ToolConfig::default())?,
    }
    TOOL_CONFIG.get_instance()
}
