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

pub mod config;
pub mod logger;

use std::sync::OnceLock;
use log::LevelFilter;
use crate::config::LogConfig;

static LOGGER: OnceLock<logger::Logger> = OnceLock::new();

/// Initialize logging to stderr at `info`
///
/// # Example
/// ```
/// common_log::init_default().expect("Failed to initialize logger");
/// log::info!("Logger initialized");
/// ```
pub fn init_default() -> Result<(), Box<dyn std::error::Error>> {
    init_with_config(LogConfig::default())
}

/// Initialize logging system with config
///
/// # Example
/// ```
/// use common_log::config::LogConfig;
/// use common_log::init_with_config;
///
/// let config = LogConfig {
///     level: "debug".to_string(),
///     console: true,
///     file: None,
/// };
/// init_with_config(config).expect("Failed to initialize logger");
/// log::debug!("Logger initialized");
/// ```
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    if LOGGER.get().is_some() {
        return Err("Logger already initialized".into());
    }
    let logger = logger::Logger::new_from_config(&config)?;
    if LOGGER.set(logger).is_err() {
        return Err("Logger already initialized".into());
    }
    Ok(())
}

/// Root level of the installed logger, `None` before initialization
pub fn current_level() -> Option<LevelFilter> {
    LOGGER.get().map(|logger| logger.level())
}

// Re-export log macros for convenient use in other modules
pub use log::{debug, error, info, trace, warn};
