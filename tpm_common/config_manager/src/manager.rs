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

use serde::Deserialize;
use std::fs::File;
use std::io::{Read, BufReader};
use std::path::Path;
use std::sync::OnceLock;

/// A singleton configuration holder.
///
/// The first successful `initialize` or `initialize_with` wins; later calls leave the stored
/// value untouched.
pub struct ConfigSingleton<T: for<'a> Deserialize<'a> + Send + Sync + 'static> {
    instance: OnceLock<T>,
}

impl <T: for<'a> Deserialize<'a> + Send + Sync + 'static> ConfigSingleton<T> {
    pub const fn new() -> Self {
        ConfigSingleton {
            instance: OnceLock::new(),
        }
    }

    /// Loads and parses a YAML configuration file.
    ///
    /// Returns `Ok(())` without reading the file if the singleton is already initialized.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The file cannot be opened or read
    /// * The YAML content cannot be parsed into the target type `T`
    pub fn initialize<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        if self.instance.get().is_some() {
            return Ok(());
        }

        let file = File::open(path).map_err(|e| format!("Failed to open config file: {}", e))?;

        let mut contents = String::new();
        let mut reader = BufReader::new(file);
        reader.read_to_string(&mut contents).map_err(|e| format!("Failed to read config file: {}", e))?;

        let config = serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse YAML: {}", e))?;

        let _ = self.instance.set(config);
        Ok(())
    }

    /// Stores an already built configuration, typically the defaults when no file is given
    pub fn initialize_with(&self, config: T) -> Result<(), String> {
        if self.instance.get().is_some() {
            return Ok(());
        }
        let _ = self.instance.set(config);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// # Errors
    ///
    /// Returns an error if neither `initialize` nor `initialize_with` has succeeded.
    pub fn get_instance(&self) -> Result<&T, String> {
        self.instance.get().ok_or_else(|| "Configuration not initialized".to_string())
    }
}
