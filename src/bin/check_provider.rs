//! Sends a short greeting to the configured LLM provider, once without and once
//! with streaming, to verify credentials and connectivity before starting the server.

use domain::gateway;
use futures::StreamExt;
use log::{error, info, warn};
use meeting_ai::traits::chat::Provider;
use meeting_ai::{Error, Generation, Message};
use service::{config::Config, logging::Logger};
use std::process::ExitCode;

const GREETING: &str = "你好，请用一句话介绍你自己。";

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    let provider = match gateway::chat_provider(&config) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to initialize LLM provider: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Checking provider {} with model {}",
        provider.provider_id(),
        provider.model()
    );

    for (check, streaming) in [(1, false), (2, true)] {
        let mode = if streaming { "streaming" } else { "non-streaming" };
        info!("Check {check}: {mode} completion...");
        match check_generation(provider.as_ref(), streaming).await {
            Ok(answer) if answer.is_empty() => warn!("Provider returned an empty answer"),
            Ok(answer) => info!("Answer: {answer}"),
            Err(e) => {
                error!("{mode} completion failed: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    info!("Provider {} is reachable and answering", provider.provider_id());
    ExitCode::SUCCESS
}

async fn check_generation(provider: &dyn Provider, streaming: bool) -> Result<String, Error> {
    let messages = [Message::user(GREETING)];
    match provider.generate(&messages, streaming).await? {
        Generation::Complete(answer) => Ok(answer),
        Generation::Streaming(mut fragments) => {
            let mut received = 0usize;
            let mut answer = String::new();
            while let Some(fragment) = fragments.next().await {
                answer.push_str(&fragment?);
                received += 1;
            }
            info!("Received {received} fragment(s)");
            Ok(answer)
        }
    }
}
