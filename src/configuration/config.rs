#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::services::DEFAULT_MAX_ERRORS;
use crate::domain::services::DEFAULT_TIMEOUT_TICKS;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiURL,
    ConfigFile,
    CourseID,
    LessonID,
    PreviewMode,
    StreamMaxErrors,
    StreamTimeoutTicks,
    Token,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("shifu/config.toml");
        let timeout_ticks = DEFAULT_TIMEOUT_TICKS.to_string();
        let max_errors = DEFAULT_MAX_ERRORS.to_string();

        let res = match key {
            ConfigKey::ApiURL => "http://localhost:5800",
            ConfigKey::CourseID => "",
            ConfigKey::LessonID => "",
            ConfigKey::PreviewMode => "false",
            ConfigKey::StreamMaxErrors => &max_errors,
            ConfigKey::StreamTimeoutTicks => &timeout_ticks,
            ConfigKey::Token => "",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        if val_int < 0 {
                            bail!(format!(
                                "config.toml has an invalid value for key '{key}': {val_int}"
                            ));
                        }
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_bool) = val.as_bool() {
                        Config::set(key, &val_bool.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiURL),
            course_id = Config::get(ConfigKey::CourseID),
            lesson_id = Config::get(ConfigKey::LessonID),
            preview_mode = Config::get(ConfigKey::PreviewMode),
            stream_timeout_ticks = Config::get(ConfigKey::StreamTimeoutTicks),
            stream_max_errors = Config::get(ConfigKey::StreamMaxErrors),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Token {
                    return Some(
                        "# Session token sent with every request. Prefer SHIFU_TOKEN or `shifu login`.\n# token = \"\""
                            .to_string(),
                    );
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg.get_help()?.to_string();
                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() || val.parse::<bool>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
