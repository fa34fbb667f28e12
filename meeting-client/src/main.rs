use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use futures_util::stream::StreamExt;
use std::path::PathBuf;

mod api_client;
mod output;
mod turn;

use api_client::{ApiClient, MeetingRequest};
use turn::Turn;

#[derive(Parser)]
#[command(name = "meeting-client")]
#[command(about = "Command-line client for the meeting minutes service")]
struct Cli {
    /// Base URL of the service (e.g., http://localhost:8000)
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show service status and the number of cached meeting summaries
    Health,
    /// Generate the minutes of a meeting
    Summary(MeetingArgs),
    /// Ask questions about a meeting
    Chat {
        #[command(flatten)]
        meeting: MeetingArgs,

        /// Conversation turn as `[user|assistant:]content`; repeat in order, last one is the question
        #[arg(long = "turn", short = 't', required = true)]
        turns: Vec<String>,
    },
}

#[derive(Args)]
struct MeetingArgs {
    /// Subtitle (.srt) file holding the meeting transcript
    #[arg(long)]
    transcript: PathBuf,

    /// Meeting identifier used to cache the summary
    #[arg(long)]
    meeting_id: String,

    /// Correlation id shown in server logs (generated when omitted)
    #[arg(long)]
    log_id: Option<String>,

    /// Print the answer as it is generated
    #[arg(long)]
    stream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    let api = ApiClient::new(reqwest::Client::new(), cli.base_url.clone());

    let succeeded = match cli.command {
        Command::Health => {
            let health = api.health().await?;
            output::print_health(&health);
            true
        }
        Command::Summary(meeting) => run(&api, "/summary", &meeting, None).await?,
        Command::Chat { meeting, turns } => {
            let turns = turns
                .iter()
                .map(|turn| Turn::parse(turn))
                .collect::<Result<Vec<_>>>()?;
            run(&api, "/chat", &meeting, Some(&turns)).await?
        }
    };

    std::process::exit(if succeeded { 0 } else { 1 });
}

async fn run(
    api: &ApiClient,
    path: &str,
    meeting: &MeetingArgs,
    turns: Option<&[Turn]>,
) -> Result<bool> {
    let srt_text = std::fs::read_to_string(&meeting.transcript)
        .with_context(|| format!("Failed to read {}", meeting.transcript.display()))?;
    let log_id = meeting
        .log_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let request = MeetingRequest {
        log_id: &log_id,
        srt_text: &srt_text,
        meeting_id: &meeting.meeting_id,
        messages: turns,
        stream: meeting.stream,
    };

    println!(
        "{} POST {} for meeting {} (log id {})",
        "→".blue(),
        path,
        meeting.meeting_id,
        log_id
    );

    if !meeting.stream {
        let envelope = api.send(path, &request).await?;
        return Ok(output::print_envelope(&envelope));
    }

    let envelopes = api.send_streaming(path, &request).await?;
    let mut envelopes = std::pin::pin!(envelopes);
    while let Some(envelope) = envelopes.next().await {
        let envelope = envelope?;
        if !output::print_fragment(&envelope) {
            return Ok(false);
        }
        if envelope.is_end() {
            return Ok(true);
        }
    }

    println!("\n{} Stream ended without a terminal envelope", "✗".red());
    Ok(false)
}
