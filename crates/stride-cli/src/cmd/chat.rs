use crate::output::print_json;
use crate::root;
use std::io::Write;
use std::path::Path;
use stride_assistant::{AssistantClient, AssistantError, ChatSession, TurnOutcome, GREETING};
use stride_core::tracker::AppliedDirective;
use tokio::io::{AsyncBufReadExt, BufReader};

/// One turn when `message` is non-empty, otherwise a line-by-line session
/// on stdin. Ctrl-C stops the reply being streamed, or quits at the prompt.
pub fn run(data_dir: &Path, message: &str, json: bool) -> anyhow::Result<()> {
    let (tracker, config) = root::open(data_dir)?;
    let client = AssistantClient::from_config(&config.assistant);
    tracing::info!(endpoint = client.endpoint(), "assistant");
    let session = ChatSession::new(client, tracker);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        if message.trim().is_empty() {
            interactive(&session, json).await
        } else {
            turn(&session, message, json).await
        }
    });
    // A pending stdin read would otherwise hold up runtime shutdown.
    rt.shutdown_background();
    result
}

async fn interactive(session: &ChatSession, json: bool) -> anyhow::Result<()> {
    if !json {
        println!("{GREETING}");
        println!("(empty line, Ctrl-D or Ctrl-C to quit)");
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !json {
            print!("\n> ");
            std::io::stdout().flush()?;
        }
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line.filter(|l| !l.trim().is_empty()) else {
            break;
        };

        if let Err(e) = turn(session, line.trim(), json).await {
            match e.downcast_ref::<AssistantError>() {
                Some(AssistantError::QuotaExhausted) => {
                    eprintln!("Payment required: add credits to continue, then resend.")
                }
                Some(AssistantError::RateLimited) => {
                    eprintln!("Rate limit exceeded: wait a moment, then resend.")
                }
                Some(_) => eprintln!("error: {e:#}"),
                None => return Err(e),
            }
        }
    }
    Ok(())
}

async fn turn(session: &ChatSession, text: &str, json: bool) -> anyhow::Result<()> {
    let send = session.send(text, |fragment| {
        if !json {
            print!("{fragment}");
            let _ = std::io::stdout().flush();
        }
    });
    tokio::pin!(send);

    let finished = tokio::select! {
        outcome = &mut send => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            session.abort();
            send.await
        }
    };

    let outcome = match outcome {
        Ok(o) => o,
        Err(AssistantError::Aborted) => {
            if !json {
                println!("\n(stopped)");
            }
            return Err(AssistantError::Aborted.into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&outcome);
    }
    println!();
    print_applied(&outcome);
    Ok(())
}

fn print_applied(outcome: &TurnOutcome) {
    for applied in &outcome.applied {
        match applied {
            AppliedDirective::Added { category, task } => {
                println!("  + [{}] {} ({category})", task.id, task.text)
            }
            AppliedDirective::Removed { task } => println!("  - [{}] {}", task.id, task.text),
            AppliedDirective::NoMatch { fragment } => {
                println!("  ? nothing in week {} matches '{fragment}'", outcome.week)
            }
        }
    }
}
