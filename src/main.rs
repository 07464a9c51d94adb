use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use voice_console::console::{ConsoleAction, ConsoleHandle, ConsoleSnapshot};
use voice_console::error::UNSUPPORTED_ADVISORY;
use voice_console::{build_console, create_router, AppState, ConsoleConfig};

#[derive(Parser)]
#[command(name = "voice-console", version, about = "Voice/text command console")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/voice-console")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive console on stdin/stdout (default)
    Repl,
    /// Serve the console to host UIs over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = ConsoleConfig::load(&cli.config)?;

    info!("Voice Console v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let (controller, console) = build_console(&cfg).await?;
    let controller_task = controller.spawn();

    let outcome = match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => repl(&console).await,
        Command::Serve => serve(&cfg, console.clone()).await,
    };

    // Tear the console down on every exit path before reporting errors
    console.shutdown(controller_task).await?;
    outcome
}

async fn serve(cfg: &ConsoleConfig, console: ConsoleHandle) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(console)))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")
}

const HELP: &str = "Escribe un comando y pulsa Enter. Atajos: :escuchar, :voz, :ejemplo, :salir";

async fn repl(console: &ConsoleHandle) -> Result<()> {
    let initial = console.snapshot();
    println!("{}", HELP);
    println!("Ejemplo: {}", initial.placeholder);
    if !initial.is_speech_supported {
        println!("{}", UNSUPPORTED_ADVISORY);
    }

    let printer = tokio::spawn(print_updates(console.subscribe(), initial));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match line.trim() {
            ":salir" => break,
            ":escuchar" => ConsoleAction::ToggleListening,
            ":voz" => ConsoleAction::ToggleVoiceFeedback,
            ":ejemplo" => ConsoleAction::CyclePlaceholder,
            _ => {
                console.submit_text(line.clone()).await?;
                continue;
            }
        };
        console.send(action).await?;
    }

    printer.abort();
    Ok(())
}

/// Print what changed between snapshots
async fn print_updates(
    mut updates: tokio::sync::watch::Receiver<ConsoleSnapshot>,
    mut previous: ConsoleSnapshot,
) {
    while updates.changed().await.is_ok() {
        let current = updates.borrow_and_update().clone();

        if current.placeholder != previous.placeholder {
            println!("Ejemplo: {}", current.placeholder);
        }
        if current.is_listening != previous.is_listening {
            println!("{}", if current.is_listening { "Escuchando…" } else { "Micrófono apagado" });
        }
        if current.voice_feedback_enabled != previous.voice_feedback_enabled {
            println!("{}", if current.voice_feedback_enabled { "Voz activa" } else { "Voz apagada" });
        }
        if current.is_submitting && !previous.is_submitting {
            println!("Enviando…");
        }
        if current.last_result != previous.last_result {
            if let Some(result) = &current.last_result {
                match serde_json::to_string_pretty(&result.raw) {
                    Ok(json) => println!("{}", json),
                    Err(_) => println!("{:?}", result.raw),
                }
            }
        }
        if current.last_error != previous.last_error {
            if let Some(error) = &current.last_error {
                println!("Error: {}", error);
            }
        }
        if current.voice_error != previous.voice_error {
            if let Some(error) = &current.voice_error {
                println!("{}", error);
            }
        }

        previous = current;
    }
}
