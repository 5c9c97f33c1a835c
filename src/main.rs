//! Command-line interface for groq-client.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use groq_client::config::{self, FileConfig};
use groq_client::logging::{self, LogLevel, LoggingConfig};
use groq_client::prelude::*;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "groq-client")]
#[command(version, about = "Chat with models served by the Groq API")]
struct Cli {
    /// Configuration file (defaults to ./groq-client.toml, then the XDG config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level written to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to the daily rotating log file instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// API key (overrides the configuration file)
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a prompt and print the reply
    Chat(ChatArgs),
    /// Inspect available models
    Models {
        #[command(subcommand)]
        command: ModelsCommand,
    },
}

#[derive(Debug, Args)]
struct ChatArgs {
    /// Model to use (defaults to the configured model)
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt sent before the user prompt
    #[arg(short, long)]
    system: Option<String>,

    /// Sampling temperature (0.0 to 2.0)
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Print the reply as it is generated
    #[arg(long)]
    stream: bool,

    /// Fail immediately when rate limited instead of waiting
    #[arg(long)]
    no_wait: bool,

    /// The prompt
    #[arg(value_name = "PROMPT")]
    prompt: String,
}

#[derive(Debug, Subcommand)]
enum ModelsCommand {
    /// List all models
    List,
    /// Show one model
    Get {
        /// Model id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = match cli.config {
        Some(ref path) => config::from_path(path)?,
        None => config::load()?,
    };

    let _log_guard = match file_logging(&file, cli.log_file, cli.log_level) {
        Some(logging) => {
            logging::init_file_logging(&logging).context("failed to initialize file logging")?
        }
        None => {
            logging::init_stderr_logging(cli.log_level).context("failed to initialize logging")?;
            None
        }
    };

    let mut client_config = file.to_client_config();
    if let Some(key) = cli.api_key {
        client_config = client_config.with_api_key(key);
    }

    match cli.command {
        Command::Chat(args) => {
            if args.no_wait {
                let rate_limit = client_config.rate_limit.without_waiting();
                client_config = client_config.with_rate_limit(rate_limit);
            }
            let client = GroqClient::new(client_config)?;
            chat(&client, &file, args).await
        }
        Command::Models { command } => {
            let client = GroqClient::new(client_config)?;
            models(&client, command).await
        }
    }
}

/// Picks the file sink when the config enables it or `--log-file` is given.
fn file_logging(file: &FileConfig, log_file: bool, level: LogLevel) -> Option<LoggingConfig> {
    let mut logging = match file.logging.clone() {
        Some(logging) => logging,
        None if log_file => LoggingConfig::default().with_level(level),
        None => return None,
    };
    if log_file {
        logging.enabled = true;
    }
    logging.enabled.then_some(logging)
}

fn build_request(file: &FileConfig, args: &ChatArgs) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(ref system) = args.system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(&args.prompt));

    let model = args.model.as_deref().unwrap_or_else(|| file.model());
    let mut request = ChatCompletionRequest::new(model, messages);
    if let Some(temperature) = args.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }
    request.with_stream(args.stream)
}

async fn chat(client: &GroqClient, file: &FileConfig, args: ChatArgs) -> Result<()> {
    let request = build_request(file, &args);

    if !args.stream {
        let response = client.create_chat_completion(&request).await?;
        println!("{}", response.first_text().unwrap_or_default());
        tracing::debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Completion finished"
        );
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut stream = match client.create_chat_completion_stream(&cancel, &request).await {
        Ok(stream) => stream,
        Err(e) if e.is_cancelled() => {
            eprintln!("(interrupted)");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let mut accumulator = StreamAccumulator::new();
    let mut stdout = std::io::stdout();

    while let Some(chunk) = stream.recv().await {
        for choice in chunk.choices.iter().filter(|c| c.index == 0) {
            if let Some(ref content) = choice.delta.content {
                stdout.write_all(content.as_bytes())?;
                stdout.flush()?;
            }
        }
        accumulator.push(&chunk);
    }
    writeln!(stdout)?;

    match stream.finish().await? {
        StreamOutcome::Completed => {
            tracing::debug!(
                chunks = accumulator.chunks(),
                finish_reason = accumulator.finish_reason(0).unwrap_or("none"),
                "Stream finished"
            );
        }
        StreamOutcome::Cancelled => eprintln!("(interrupted)"),
    }
    Ok(())
}

async fn models(client: &GroqClient, command: ModelsCommand) -> Result<()> {
    match command {
        ModelsCommand::List => {
            let response = client.list_models().await?;
            for model in response.data {
                let window = model
                    .context_window
                    .map_or_else(|| "-".to_string(), |w| w.to_string());
                println!("{:<48} {:<16} {}", model.id, model.owned_by, window);
            }
        }
        ModelsCommand::Get { id } => {
            let model = client.retrieve_model(&id).await?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }
    Ok(())
}
