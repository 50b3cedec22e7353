//! The terminal chat front end for the concierge.

#[macro_use]
extern crate tracing;

use std::error::Error;
use std::io::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use concierge::tools::{KeywordRetriever, WeatherTool, WebSearchTool, WineryInfoTool};
use concierge::{ChatTurn, Config, Session, SessionBuilder};
use concierge_gemini_model::{GeminiConfigBuilder, GeminiProvider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

const WINERY_DOCUMENT: &str = include_str!("../data/wine_business_info.md");

const TOOL_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let session = match build_session(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("failed to set up the concierge: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{}",
        "🍷 Conversational Concierge for Celestial Vines Estate".bold()
    );
    println!("Ask me about the winery, search the web, or get the current weather.\n");

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut history: Vec<ChatTurn> = Vec::new();
    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let answer = session.respond(&history, message).await;
        progress_bar.finish_and_clear();

        println!("{}🤖 {}", BAR_CHAR.bright_cyan(), answer.bright_white());
        history.push(ChatTurn {
            user: message.to_owned(),
            assistant: Some(answer),
        });
    }

    ExitCode::SUCCESS
}

fn build_session(config: Config) -> Result<Session, Box<dyn Error>> {
    let model_config = GeminiConfigBuilder::with_api_key(config.google_api_key).build();
    let model_provider = GeminiProvider::new(model_config)?;

    let http_client = reqwest::Client::builder()
        .timeout(TOOL_HTTP_TIMEOUT)
        .build()?;
    let retriever = Arc::new(KeywordRetriever::from_document(WINERY_DOCUMENT));

    let session = SessionBuilder::with_model_provider(model_provider)
        .with_system_prompt(include_str!("./system_prompt.md"))
        .with_tool(WineryInfoTool::new(retriever))
        .with_tool(WebSearchTool::new(
            http_client.clone(),
            config.tavily_api_key,
        ))
        .with_tool(WeatherTool::new(http_client, config.openweathermap_api_key))
        .build()?;
    Ok(session)
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
