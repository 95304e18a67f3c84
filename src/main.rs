use clap::Parser;
use color_eyre::Result;
use serde::Deserialize;
use serde_json::Value;
use standupd::tools::{ToolContext, ToolError, ToolResponse};
use standupd::Config;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "standupd")]
#[command(about = "Jira sprint standup reports and Slack tools over stdio")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/standupd/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Directory for the rolling log file (default: temp dir)
  #[arg(long)]
  log_dir: Option<PathBuf>,

  /// Run a single tool and exit instead of serving stdin
  #[arg(long, requires = "params")]
  tool: Option<String>,

  /// JSON params for --tool
  #[arg(long)]
  params: Option<String>,
}

/// One request line from the host: a tool name plus its params.
#[derive(Debug, Deserialize)]
struct ToolRequest {
  tool: String,
  #[serde(default)]
  params: Value,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_logging(args.log_dir.clone());

  let config = Config::load(args.config.as_deref())?;
  let context = ToolContext::new(config)?;
  let sweeper = context.spawn_sweeper();

  if let (Some(tool), Some(params)) = (args.tool.as_deref(), args.params.as_deref()) {
    let params: Value = serde_json::from_str(params)?;
    let response = context.dispatch(tool, params).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
  } else {
    serve_stdio(&context).await?;
  }

  sweeper.shutdown().await;
  Ok(())
}

/// Read one JSON request per line from stdin, write one JSON response per
/// line to stdout. The host owns the protocol; this is only the plumbing.
async fn serve_stdio(context: &ToolContext) -> Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  let mut stdout = tokio::io::stdout();

  while let Some(line) = lines.next_line().await? {
    if line.trim().is_empty() {
      continue;
    }

    let response = match serde_json::from_str::<ToolRequest>(&line) {
      Ok(request) => context.dispatch(&request.tool, request.params).await,
      Err(e) => ToolResponse {
        ok: false,
        tool: String::new(),
        data: None,
        error: Some(ToolError {
          code: "VALIDATION_ERROR",
          message: format!("malformed request line: {}", e),
          status: None,
          details: None,
        }),
      },
    };

    let mut out = serde_json::to_vec(&response)?;
    out.push(b'\n');
    stdout.write_all(&out).await?;
    stdout.flush().await?;
  }

  Ok(())
}

/// File-based logging: daily-rolled file, level from RUST_LOG.
fn init_logging(log_dir: Option<PathBuf>) -> tracing_appender::non_blocking::WorkerGuard {
  use tracing_subscriber::EnvFilter;

  let dir = log_dir.unwrap_or_else(std::env::temp_dir);
  let appender = tracing_appender::rolling::daily(dir, "standupd.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  guard
}
