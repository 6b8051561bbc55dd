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

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration.
///
/// Output goes to stderr unless `console` is switched off; a rolling log file is added when
/// `file` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_console")]
    pub console: bool,
    #[serde(default)]
    pub file: Option<LogFileConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileConfig {
    /// Relative directories are placed under `LOG_OUTPUT_DIR` when it is set
    pub log_directory: String,
    pub log_file_name: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_max_zip_count")]
    pub max_zip_count: u32,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_console() -> bool {
    true
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_zip_count() -> u32 {
    6
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            console: default_console(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path.into())?;
        let config: LogConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }
}
