//! Terminal chat client for the case-management agent
//!
//! Type a message to start a turn. Ctrl-C stops the turn in flight and
//! keeps whatever arrived; `/clear` forgets the conversation and `/quit`
//! exits. An interrupted turn from a previous run is resumed on start.

use case_desk::chat::{ChatSession, ChatStore, Conversation, HttpChatTransport, TurnOutcome};
use case_desk::config::ClientConfig;
use case_desk::render::render_message;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const SUGGESTIONS: [&str; 6] = [
    "I need to file a new disability claim",
    "Check the status of my case DC123ABC",
    "What documents do I need for a physical disability claim?",
    "Schedule an appointment for my medical examination",
    "I need to update my contact information on my case",
    "Create a new disability case for John Smith, born 1985-03-15, with a physical \
     disability affecting mobility due to a spinal injury. Then schedule an initial \
     consultation appointment for next week.",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "case_desk=warn".into()),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    let config = ClientConfig::from_env();
    let store = ChatStore::open(&config.state_path)?;
    let transport = Arc::new(HttpChatTransport::new(config.base_url.clone())?);
    let mut session =
        ChatSession::open(transport, store)?.with_max_consecutive_errors(config.max_consecutive_errors);

    println!("{}", "Disability Case Management".bold());
    println!("{}", "Manage disability benefit cases using workflows".dimmed());
    println!();

    for message in session.conversation().messages() {
        print!("{}", render_message(message, false));
    }

    if let Some(run_id) = session.pending_resume()? {
        println!("{}", format!("Resuming interrupted turn {run_id}").dimmed());
        let start = session.conversation().messages().len().saturating_sub(1);
        let stop = CancellationToken::new();
        let outcome = with_interrupt(&stop, session.resume(&stop, &mut progress())).await;
        report(&session, start, outcome);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if session.conversation().messages().is_empty() {
            print_suggestions();
        }
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let input = line.trim();

        let text = match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear()?;
                println!("{}", "Conversation cleared.".dimmed());
                continue;
            }
            _ => pick_suggestion(&session, input).unwrap_or(input).to_string(),
        };

        let start = session.conversation().messages().len();
        let stop = CancellationToken::new();
        let outcome = with_interrupt(&stop, session.send(&text, &stop, &mut progress())).await;
        report(&session, start, outcome);
    }

    println!("{}", "Goodbye!".dimmed());
    Ok(())
}

/// Number typed while the suggestions are showing
fn pick_suggestion(session: &ChatSession, input: &str) -> Option<&'static str> {
    if !session.conversation().messages().is_empty() {
        return None;
    }
    let index: usize = input.parse().ok()?;
    SUGGESTIONS.get(index.checked_sub(1)?).copied()
}

fn print_suggestions() {
    println!("{}", "How can I help you today?".bold());
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).dimmed(), suggestion);
    }
    println!();
}

/// Prints the in-flight indicator once per turn
fn progress() -> impl FnMut(&Conversation) {
    let mut shown = false;
    move |conversation| {
        if conversation.is_processing() && !shown {
            shown = true;
            println!("{}", "Processing...".dimmed().italic());
        }
    }
}

/// Drive a turn, cancelling `stop` on Ctrl-C
async fn with_interrupt<F: std::future::Future>(stop: &CancellationToken, turn: F) -> F::Output {
    let token = stop.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    let output = turn.await;
    watcher.abort();
    output
}

fn report(
    session: &ChatSession,
    start: usize,
    outcome: Result<TurnOutcome, case_desk::chat::ChatError>,
) {
    let messages = session.conversation().messages();
    for message in messages.iter().skip(start) {
        print!("{}", render_message(message, false));
    }

    match outcome {
        Ok(TurnOutcome::Finished) => {}
        Ok(TurnOutcome::Aborted) => println!("{}", "Turn aborted.".yellow()),
        Ok(TurnOutcome::Stopped) => println!("{}", "Stopped.".yellow()),
        Ok(TurnOutcome::Failed(message)) => println!("{}", format!("Error: {message}").red()),
        Err(e) => {
            tracing::warn!(error = %e, "Turn failed");
            println!("{}", format!("Error: {e}").red());
        }
    }
    println!();
}
