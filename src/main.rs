#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use anyhow::Result;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::RunMode;
use crate::application::console;
use crate::configuration::ClientSettings;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Shifu has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!(
            "\nDebug logs are written to {} when RUST_LOG=shifu is set.",
            cli::log_path().to_string_lossy()
        );
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

async fn run(mode: RunMode) -> Result<()> {
    let settings = ClientSettings::from_config()?;

    match mode {
        RunMode::Study => return console::start(settings).await,
        RunMode::Lessons => return console::lessons(settings).await,
        RunMode::ResetChapter(chapter_id) => {
            return console::reset_chapter(settings, &chapter_id).await;
        }
        RunMode::Login => return console::login(settings).await,
        RunMode::Feedback(text) => return console::feedback(settings, &text).await,
    }
}

#[tokio::main]
async fn main() {
    better_panic::install();

    let log_path = cli::log_path();
    let debug_log_dir = log_path
        .parent()
        .map(|e| return e.to_path_buf())
        .unwrap_or_else(env::temp_dir);

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("shifu")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let res = run(mode).await;
    drop(guard);
    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
