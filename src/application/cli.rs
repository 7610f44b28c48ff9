use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::Credentials;

/// What the binary should do once the command line is parsed and the config
/// is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunMode {
    Study,
    Lessons,
    ResetChapter(String),
    Login,
    Feedback(String),
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn log_path() -> path::PathBuf {
    if let Ok(log_dir) = std::env::var("SHIFU_LOG_DIR") {
        return path::PathBuf::from(log_dir).join("debug.log");
    }

    return dirs::cache_dir()
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("shifu/debug.log");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Shifu")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Shifu with environment variable RUST_LOG=shifu")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_course_id() -> Arg {
    return Arg::new(ConfigKey::CourseID.to_string())
        .long(ConfigKey::CourseID.to_string())
        .env("SHIFU_COURSE_ID")
        .num_args(1)
        .help("Course to study.")
        .global(true);
}

fn arg_lesson_id() -> Arg {
    return Arg::new(ConfigKey::LessonID.to_string())
        .short('l')
        .long(ConfigKey::LessonID.to_string())
        .env("SHIFU_LESSON_ID")
        .num_args(1)
        .help("Lesson to start from. Defaults to the first lesson of the course.")
        .global(true);
}

fn subcommand_study() -> Command {
    return Command::new("study").about("Start or continue a lesson. This is the default command.");
}

fn subcommand_reset_chapter() -> Command {
    return Command::new("reset-chapter")
        .about("Resets your progress in a chapter so it can be taken again.")
        .arg(
            clap::Arg::new("chapter-id")
                .help("Chapter ID")
                .required(true),
        );
}

fn subcommand_feedback() -> Command {
    return Command::new("feedback")
        .about("Sends feedback about the course to its authors.")
        .arg(
            clap::Arg::new("text")
                .help("Feedback text")
                .required(true),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("shifu")
        .about(about)
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_study())
        .subcommand(Command::new("lessons").about("Lists the lessons of the course and their status."))
        .subcommand(subcommand_reset_chapter())
        .subcommand(Command::new("login").about("Logs in with a phone number and SMS code."))
        .subcommand(Command::new("logout").about("Forgets the saved login."))
        .subcommand(subcommand_feedback())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_course_id())
        .arg(arg_lesson_id())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("SHIFU_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("SHIFU_API_URL")
                .num_args(1)
                .help(format!("Shifu API URL the lesson runs are streamed from. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Token.to_string())
                .long(ConfigKey::Token.to_string())
                .env("SHIFU_TOKEN")
                .num_args(1)
                .hide_env_values(true)
                .help("Session token sent with every request. Overrides the login saved by `shifu login`.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::PreviewMode.to_string())
                .long(ConfigKey::PreviewMode.to_string())
                .env("SHIFU_PREVIEW_MODE")
                .num_args(1)
                .help(format!("Run lessons in preview mode, as an author would. [default: {}]", Config::default(ConfigKey::PreviewMode)))
                .value_parser(["true", "false"])
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StreamTimeoutTicks.to_string())
                .long(ConfigKey::StreamTimeoutTicks.to_string())
                .env("SHIFU_STREAM_TIMEOUT_TICKS")
                .num_args(1)
                .help(format!("Ticks (seconds) without stream traffic before a lesson stream is considered dead. [default: {}]", Config::default(ConfigKey::StreamTimeoutTicks)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StreamMaxErrors.to_string())
                .long(ConfigKey::StreamMaxErrors.to_string())
                .env("SHIFU_STREAM_MAX_ERRORS")
                .num_args(1)
                .help(format!("Transport errors tolerated on a lesson stream before it is closed. [default: {}]", Config::default(ConfigKey::StreamMaxErrors)))
                .global(true),
        );
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    if let Some(val) = matches.get_one::<String>(id) {
        return Ok(val.to_string());
    }

    bail!(format!("Missing required argument '{id}'"));
}

/// Parses the command line and loads the config. Returns `None` when the
/// subcommand was fully handled here and there is nothing left to run.
pub async fn parse() -> Result<Option<RunMode>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("lessons", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(RunMode::Lessons));
        }
        Some(("reset-chapter", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let chapter_id = required(subcmd_matches, "chapter-id")?;
            return Ok(Some(RunMode::ResetChapter(chapter_id)));
        }
        Some(("login", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(RunMode::Login));
        }
        Some(("logout", _)) => {
            Credentials::default().clear().await?;
            println!("Logged out.");
            return Ok(None);
        }
        Some(("feedback", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let text = required(subcmd_matches, "text")?;
            return Ok(Some(RunMode::Feedback(text)));
        }
        Some(("study", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(Some(RunMode::Study));
}
