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

use chrono::{DateTime, Local};
use log::{debug, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger as SizeBasedTriggerPolicy;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::{
    append::rolling_file::RollingFileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};
use std::env;
use std::path::{Path, PathBuf};
use crate::config::{LogConfig, LogFileConfig};

const CONSOLE_PATTERN: &str = "{l} [{M}] - {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S:%3f)} {l} [{M}:{L}] - {m}{n}";

pub struct Logger {
    _handle: Handle,
    level: LevelFilter,
}

impl Logger {
    pub fn new_from_config(config: &LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let level = parse_level(&config.level);
        let log4rs_config = Self::build_config(config, level)?;
        let handle = log4rs::init_config(log4rs_config)?;
        Ok(Self { _handle: handle, level })
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub(crate) fn build_config(config: &LogConfig, level: LevelFilter) -> Result<Config, Box<dyn std::error::Error>> {
        let mut builder = Config::builder();
        let mut root = Root::builder();

        if config.console {
            let stderr = ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
                .target(Target::Stderr)
                .build();
            builder = builder.appender(Appender::builder().build("console", Box::new(stderr)));
            root = root.appender("console");
        }

        if let Some(file_config) = &config.file {
            let appender = Self::create_appender(file_config)?;
            builder = builder.appender(Appender::builder().build("file", Box::new(appender)));
            root = root.appender("file");
        }

        Ok(builder.build(root.build(level))?)
    }

    fn create_appender(config: &LogFileConfig) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
        let log_directory = resolve_log_directory(&config.log_directory);
        std::fs::create_dir_all(&log_directory)?;

        let now: DateTime<Local> = Local::now();
        let formatted_time = now.format("%Y%m%d%H%M%S%3f").to_string();

        let log_file = log_directory.join(&config.log_file_name);
        let archived_log_pattern = format!(
            "{}/{}-{{}}-{}.gz",
            log_directory.display(), config.log_file_name, formatted_time
        );

        let size_trigger = SizeBasedTriggerPolicy::new(config.max_file_size);
        let roller = FixedWindowRoller::builder().build(&archived_log_pattern, config.max_zip_count)?;
        let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

        let appender = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(log_file, Box::new(compound_policy))?;

        Ok(appender)
    }
}

/// Places a relative directory under `LOG_OUTPUT_DIR`, read from the environment or a `.env` file
pub fn resolve_log_directory(log_directory: &str) -> PathBuf {
    let path = Path::new(log_directory);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    if let Ok(env_path) = dotenv::dotenv() {
        debug!("loaded .env file: {}", env_path.display());
    }
    match env::var("LOG_OUTPUT_DIR") {
        Ok(log_out_dir) => Path::new(&log_out_dir).join(path),
        Err(_) => path.to_path_buf(),
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
