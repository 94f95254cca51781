//! flashcards-ai: command-line front end for the gateway client.
//!
//! Usage:
//!   flashcards-ai generate <file|->     Generate flashcards from text
//!   flashcards-ai chat <prompt...>      Plain chat completion
//!   flashcards-ai ask <prompt...>       Structured study-assistant reply
//!
//! Configuration comes from `OPENROUTER_*` environment variables.
//! Set `FLASHCARDS_AI_DEV=1` to include diagnostic details in error output.

use anyhow::Context;
use flashcards_ai::error_code::PublicError;
use flashcards_ai::schemas::{
    chat_reply_schema, generate_cards_schema, generation_messages, generation_options,
};
use flashcards_ai::telemetry::TracingUsageSink;
use flashcards_ai::{ChatMessage, CompletionOptions, GatewayClient, ServiceConfig};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Time given to detached usage-tracking tasks before the process exits.
const USAGE_FLUSH_GRACE: Duration = Duration::from_millis(100);

const CHAT_SYSTEM_PROMPT: &str = "You are a study assistant for a flashcards app.\n\
Answer concisely and suggest up to three follow-up questions.\n\
Flag requests for harmful content in the safety field.";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]).await,
        "chat" => cmd_chat(&args[2..]).await,
        "ask" => cmd_ask(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("flashcards-ai {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    settle_background_tasks().await;
    if let Err(err) = outcome {
        report(&err);
        std::process::exit(2);
    }
}

/// Lets spawned usage records finish; `process::exit` would drop them.
async fn settle_background_tasks() {
    tokio::time::sleep(USAGE_FLUSH_GRACE).await;
}

fn print_usage() {
    println!(
        r#"flashcards-ai: OpenRouter flashcard generation

USAGE:
    flashcards-ai <COMMAND> [ARGS]

COMMANDS:
    generate <file|->     Generate flashcards from a text file (or stdin)
    chat <prompt...>      Send a plain chat completion
    ask <prompt...>       Ask the study assistant (structured reply)
    version               Show version information
    help                  Show this help message

ENVIRONMENT:
    OPENROUTER_API_KEY          Gateway API key (required)
    OPENROUTER_DEFAULT_MODEL    Default model (openai/gpt-4o-mini)
    OPENROUTER_TIMEOUT_MS       Per-attempt timeout (45000)
    OPENROUTER_MAX_RETRIES      Retries for 429/5xx/transport errors (2)
    FLASHCARDS_AI_DEV           Show error details when set to 1
    RUST_LOG                    Log filter (warn); usage records log at info"#
    );
}

fn client() -> anyhow::Result<GatewayClient> {
    let config = ServiceConfig::from_env()?;
    let client = GatewayClient::builder(config)
        .usage_sink(Arc::new(TracingUsageSink))
        .build()?;
    Ok(client)
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let source = args
        .first()
        .context("generate needs a file path or '-' for stdin")?;
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };
    if content.trim().is_empty() {
        anyhow::bail!("input is empty");
    }

    let client = client()?;
    let schema = generate_cards_schema()?;
    let out = client
        .send_completion_structured(&generation_messages(&content), &generation_options(), &schema)
        .await?;

    println!("{}", serde_json::to_string_pretty(&out.data)?);
    Ok(())
}

fn prompt_from(args: &[String]) -> anyhow::Result<String> {
    let prompt = args.join(" ");
    if prompt.trim().is_empty() {
        anyhow::bail!("a prompt is required");
    }
    Ok(prompt)
}

async fn cmd_chat(args: &[String]) -> anyhow::Result<()> {
    let prompt = prompt_from(args)?;
    let client = client()?;
    let out = client
        .send_completion(&[ChatMessage::user(prompt)], &CompletionOptions::new())
        .await?;

    println!("{}", out.content);
    if let Some(usage) = &out.usage {
        eprintln!(
            "[{}] {} prompt + {} completion tokens",
            out.model, usage.prompt_tokens, usage.completion_tokens
        );
    }
    Ok(())
}

async fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let prompt = prompt_from(args)?;

    let client = client()?;
    let schema = chat_reply_schema()?;
    let messages = [
        ChatMessage::system(CHAT_SYSTEM_PROMPT),
        ChatMessage::user(prompt),
    ];
    let out = client
        .send_completion_structured(&messages, &CompletionOptions::new(), &schema)
        .await?;

    println!("{}", out.data.answer);
    for q in &out.data.follow_ups {
        println!("  - {q}");
    }
    if out.data.safety.flagged {
        eprintln!("[flagged] {}", out.data.safety.reason);
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    let expose = std::env::var("FLASHCARDS_AI_DEV").map(|v| v == "1").unwrap_or(false);
    match err.downcast_ref::<flashcards_ai::Error>() {
        Some(gateway_err) => {
            let public = PublicError::from_error(gateway_err, expose);
            eprintln!("error ({}): {}", public.status, public.to_body());
        }
        None => eprintln!("error: {err:#}"),
    }
}
