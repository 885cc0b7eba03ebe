//! `cortex chat`: interactive or single-message chat mode.

use cortex_agent::{FinishReason, Session, TurnOutcome};
use cortex_config::AppConfig;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::runtime;
use crate::spinner::Spinner;

pub const GREETING: &str = "Welcome to Agent Cortex! Type 'exit' or 'quit' to stop.";

pub async fn run(
    config: &AppConfig,
    message: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!(
            "Warning: no API key configured for '{}'. Set CORTEX_API_KEY or add api_key to {}.",
            config.default_provider,
            AppConfig::config_dir().join("config.toml").display()
        );
    }

    let session = runtime::session(config)?;

    if let Some(msg) = message {
        let outcome = turn(&session, &msg).await?;
        print_outcome(&outcome, verbose);
        return Ok(());
    }

    println!("{GREETING}");
    println!(
        "  Provider: {}  Model: {}  Tools: {}",
        config.default_provider,
        config.default_model,
        session.registry().names().join(", ")
    );
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit(input) {
            break;
        }

        // A failed turn is reported and the loop carries on.
        match turn(&session, input).await {
            Ok(outcome) => print_outcome(&outcome, verbose),
            Err(e) => eprintln!("Error: {}", one_line(&e.to_string())),
        }
    }

    println!("Shutting down Cortex");
    Ok(())
}

async fn turn(session: &Session, input: &str) -> Result<TurnOutcome, cortex_core::Error> {
    let spinner = Spinner::start("Thinking...");
    let result = session.handle(input).await;
    spinner.stop().await;
    result
}

fn print_outcome(outcome: &TurnOutcome, verbose: bool) {
    if verbose {
        if let Ok(trace) = serde_json::to_string_pretty(&outcome.steps) {
            eprintln!("{trace}");
        }
    }
    if outcome.finish == FinishReason::StepLimitExceeded {
        eprintln!("(step limit reached; best-effort answer)");
    }
    println!("Cortex: {}", outcome.answer);
    println!();
}

pub fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words_are_case_insensitive() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(is_exit("Exit"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("hello"));
    }

    #[test]
    fn errors_collapse_to_one_line() {
        assert_eq!(one_line("API error (500):\n  boom\n"), "API error (500): boom");
    }
}
