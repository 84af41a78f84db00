//! Lesson Plan CLI
//!
//! Serves the lesson generation API, or generates a single lesson and writes
//! it to disk.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lessonplan_orchestrator::{
    create_router, AppState, Config, GeminiBackend, GenerationResult, Orchestrator, TopicRequest,
    DEFAULT_DIFFICULTY,
};
use lessonplan_report::{
    json::{JsonGenerator, LessonReport, LESSON_REPORT_FILE_NAME},
    render_lesson, LessonDocuments,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Lesson Plan Generator
///
/// Builds an in-class lesson plan for a topic, then derives pre-class
/// preparation and a post-class quiz from it.
#[derive(Parser, Debug)]
#[command(name = "lessonplan")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: lessonplan.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one lesson
    Generate {
        /// Lesson topic
        #[arg(short, long)]
        topic: String,

        /// Difficulty level
        #[arg(short, long, default_value = DEFAULT_DIFFICULTY)]
        difficulty: String,

        /// Directory for the Markdown documents and lesson.json (prints to stdout when omitted)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<String>,

        /// Print the JSON lesson report instead of Markdown
        #[arg(long, conflicts_with = "output_dir")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "Config file");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;
            serve(&config).await
        }
        Command::Generate {
            topic,
            difficulty,
            output_dir,
            json,
        } => {
            let request = TopicRequest::new(topic, difficulty);
            generate(&config, &request, output_dir.as_deref(), json).await
        }
    }
}

/// Builds the orchestrator around the configured backend.
fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let backend = GeminiBackend::from_env(&config.backend)?;
    tracing::info!(model = %config.backend.model, "Generative backend ready");
    Ok(Orchestrator::new(Arc::new(backend)))
}

/// Runs the HTTP API until Ctrl+C.
async fn serve(config: &Config) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let router = create_router(AppState::new(orchestrator));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow::anyhow!(
                "Invalid bind address '{}:{}': {e}\n\nSuggestion: Use an IP address for --host",
                config.server.host,
                config.server.port
            )
        })?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("Lesson plan API running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Runs the pipeline once and writes or prints the result.
async fn generate(
    config: &Config,
    request: &TopicRequest,
    output_dir: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let result = orchestrator.generate(request).await?;

    let report = LessonReport::from_raw(
        &request.topic,
        &request.difficulty,
        &result.in_class_content,
        &result.pre_class_content,
        &result.post_class_content,
    );

    if json {
        println!("{}", JsonGenerator::new(&report).generate_pretty()?);
        return Ok(());
    }

    let documents = render(&result);
    match output_dir {
        Some(dir) => write_outputs(Path::new(dir), &documents, &report),
        None => {
            print_documents(&documents);
            Ok(())
        }
    }
}

fn render(result: &GenerationResult) -> LessonDocuments {
    render_lesson(
        &result.in_class_content,
        &result.pre_class_content,
        &result.post_class_content,
    )
}

/// Writes the three Markdown documents and `lesson.json` into `dir`.
fn write_outputs(
    dir: &Path,
    documents: &LessonDocuments,
    report: &LessonReport,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create output directory: {e}\n\nPath: {}",
            dir.display()
        )
    })?;

    let mut written = documents.write_to_dir(dir)?;

    let json_path: PathBuf = dir.join(LESSON_REPORT_FILE_NAME);
    JsonGenerator::new(report).write_to_file(&json_path, true)?;
    written.push(json_path);

    println!("Lesson written:");
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn print_documents(documents: &LessonDocuments) {
    println!("# Pre-class\n");
    println!("{}", documents.pre_class_markdown);
    println!("\n# In-class\n");
    println!("{}", documents.in_class_markdown);
    println!("\n# Post-class\n");
    println!("{}", documents.post_class_markdown);
}

/// Loads configuration from file or uses defaults.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}
