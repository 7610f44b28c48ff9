#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use anyhow::Context;
use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::domain::services::DEFAULT_MAX_ERRORS;
use crate::domain::services::DEFAULT_TIMEOUT_TICKS;

/// Snapshot of the loaded configuration, taken once at startup and handed to
/// the services that need it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub token: String,
    pub course_id: String,
    pub lesson_id: String,
    pub preview_mode: bool,
    pub stream_timeout_ticks: u64,
    pub stream_max_errors: u32,
}

impl Default for ClientSettings {
    fn default() -> ClientSettings {
        return ClientSettings {
            api_url: "".to_string(),
            token: "".to_string(),
            course_id: "".to_string(),
            lesson_id: "".to_string(),
            preview_mode: false,
            stream_timeout_ticks: DEFAULT_TIMEOUT_TICKS,
            stream_max_errors: DEFAULT_MAX_ERRORS,
        };
    }
}

impl ClientSettings {
    pub fn from_config() -> Result<ClientSettings> {
        return ClientSettings::parse(Config::get);
    }

    pub fn parse<F: Fn(ConfigKey) -> String>(get: F) -> Result<ClientSettings> {
        let api_url = get(ConfigKey::ApiURL);
        if api_url.is_empty() {
            anyhow::bail!("An API URL is required, set it with --api-url or SHIFU_API_URL");
        }

        let preview_mode = get(ConfigKey::PreviewMode);
        let stream_timeout_ticks = get(ConfigKey::StreamTimeoutTicks);
        let stream_max_errors = get(ConfigKey::StreamMaxErrors);

        return Ok(ClientSettings {
            api_url,
            token: get(ConfigKey::Token),
            course_id: get(ConfigKey::CourseID),
            lesson_id: get(ConfigKey::LessonID),
            preview_mode: preview_mode
                .parse::<bool>()
                .with_context(|| return format!("Invalid preview-mode: {preview_mode}"))?,
            stream_timeout_ticks: stream_timeout_ticks
                .parse::<u64>()
                .with_context(|| {
                    return format!("Invalid stream-timeout-ticks: {stream_timeout_ticks}");
                })?,
            stream_max_errors: stream_max_errors
                .parse::<u32>()
                .with_context(|| return format!("Invalid stream-max-errors: {stream_max_errors}"))?,
        });
    }
}
