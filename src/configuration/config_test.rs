use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(
        doc.get("api-url").and_then(|e| return e.as_str()),
        Some("http://localhost:5800")
    );
    assert_eq!(
        doc.get("stream-timeout-ticks")
            .and_then(|e| return e.as_integer()),
        Some(300)
    );
    assert_eq!(
        doc.get("stream-max-errors").and_then(|e| return e.as_integer()),
        Some(3)
    );
    assert_eq!(
        doc.get("preview-mode").and_then(|e| return e.as_bool()),
        Some(false)
    );
    assert!(doc.get("token").is_none());
    assert!(doc.get("config-file").is_none());
    assert!(res.contains("# token = \"\""));

    return Ok(());
}

#[test]
fn it_falls_back_to_defaults() {
    assert_eq!(Config::default(ConfigKey::ApiURL), "http://localhost:5800");
    assert_eq!(Config::default(ConfigKey::StreamTimeoutTicks), "300");
    assert_eq!(Config::default(ConfigKey::StreamMaxErrors), "3");
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["shifu", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::CourseID), "course-1");
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches =
        cli::build().try_get_matches_from(vec!["shifu", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
