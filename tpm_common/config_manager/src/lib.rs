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

/// Configuration management module for loading and accessing tool configuration.
///
/// A thread-safe, load-once holder for a configuration type deserialized from YAML.
///
/// # Example
///
/// ```no_run
/// use serde::Deserialize;
///
/// use config_manager::ConfigSingleton;
///
/// #[derive(Deserialize)]
/// struct ToolConfig {
///     #[serde(default = "default_hash_alg")]
///     default_hash_alg: String,
/// }
///
/// fn default_hash_alg() -> String {
///     "sha256".to_string()
/// }
///
/// static CONFIG: ConfigSingleton<ToolConfig> = ConfigSingleton::new();
///
/// CONFIG.initialize("tpm_tools.yaml").expect("Failed to load config");
/// let config = CONFIG.get_instance().expect("Config not initialized");
/// println!("hash algorithm: {}", config.default_hash_alg);
/// ```
pub mod manager;

// Re-export key struct
pub use manager::ConfigSingleton;
