use anyhow::Result;
use clap::Parser;
use futures_util::StreamExt;
use souschef::{
    config::AgentConfig,
    session::{AgentEvent, ClaudeCodeRunner, Runner},
};
use tracing::{info, warn};

/// Task used when none is given on the command line.
const DEFAULT_TASK: &str = "Find me a recipe for chicken pad thai.";

#[derive(Parser)]
#[command(
    name = "souschef",
    about = "souschef — recipe-search browser agent session driver",
    version
)]
struct Args {
    /// What to search for (dish name or ingredients).
    task: Option<String>,

    /// Model passed to the agent runtime (default: runtime's own default).
    #[arg(long, env = "SOUSCHEF_MODEL")]
    model: Option<String>,

    /// Per-turn timeout in seconds.
    #[arg(long, env = "SOUSCHEF_TURN_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Agent runtime binary to spawn.
    #[arg(long, env = "SOUSCHEF_CLAUDE_BIN")]
    claude_bin: Option<String>,

    /// TOML config file.
    #[arg(long, env = "SOUSCHEF_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "SOUSCHEF_LOG", default_value = "info")]
    log: String,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "SOUSCHEF_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Emit events as JSON lines instead of human-readable output.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = setup_logging(&args.log, args.log_file.as_deref());

    let mut config = AgentConfig::load(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.model = Some(model);
    }
    if let Some(secs) = args.timeout_secs {
        config.turn_timeout_secs = secs;
    }
    if let Some(bin) = args.claude_bin {
        config.claude_bin = bin;
    }

    let task = args.task.unwrap_or_else(|| DEFAULT_TASK.to_string());
    info!(runtime = ?config.runtime, model = ?config.model, "starting recipe-search session");

    let runner = ClaudeCodeRunner::new(config);
    let mut stream = runner.query(&task).await?;

    loop {
        tokio::select! {
            maybe_event = stream.next() => {
                let Some(event) = maybe_event else { break };
                if args.json {
                    println!("{}", serde_json::to_string(&event)?);
                } else {
                    print_event(&event);
                }
                if event == AgentEvent::Done {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted — stopping session");
                runner.stop().await?;
                // The stream drains to Done on the next iterations.
            }
        }
    }

    Ok(())
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::Text { text } => println!("{text}"),
        AgentEvent::Tool { name } => println!("  [tool] {name}"),
        AgentEvent::Usage {
            input_tokens,
            output_tokens,
        } => println!("  [usage] input={input_tokens} output={output_tokens}"),
        AgentEvent::Result { result } => println!("\n{result}"),
        AgentEvent::Done => {}
    }
}

/// Initialise tracing: env-filterable, compact stderr output, optionally
/// duplicated to a daily-rotated log file. Returns the appender guard that
/// must stay alive for the life of the process.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("souschef.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stderr",
                dir.display()
            );
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .with_writer(std::io::stderr)
                .compact()
                .init();
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(EnvFilter::new(log_level))
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_writer(non_blocking))
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .with_writer(std::io::stderr)
            .compact()
            .init();
        None
    }
}
