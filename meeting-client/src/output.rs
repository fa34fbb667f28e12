use colored::*;
use serde_json::Value;
use std::io::Write;

use crate::api_client::Envelope;

pub fn print_health(health: &Value) {
    let status = health["status"].as_str().unwrap_or("unknown");
    let cached = health["cached_meetings"].as_u64().unwrap_or_default();
    if status == "ok" {
        println!("{} Service is healthy", "✓".green());
    } else {
        println!("{} Service reported status {}", "✗".red(), status);
    }
    println!("  Cached meetings: {}", cached);
}

/// Prints a complete (non-streamed) answer. Returns whether it succeeded.
pub fn print_envelope(envelope: &Envelope) -> bool {
    if envelope.status == 200 {
        println!("{}", envelope.data.answer);
        true
    } else {
        print_failure(envelope);
        false
    }
}

/// Prints one streamed envelope without a trailing newline so fragments join up.
/// Returns whether it succeeded.
pub fn print_fragment(envelope: &Envelope) -> bool {
    if envelope.status != 200 {
        println!();
        print_failure(envelope);
        return false;
    }
    print!("{}", envelope.data.answer);
    let _ = std::io::stdout().flush();
    if envelope.is_end() {
        println!();
    }
    true
}

fn print_failure(envelope: &Envelope) {
    println!(
        "{} [{}] {}",
        "✗".red(),
        envelope.status,
        envelope.data.answer.bright_red()
    );
}
