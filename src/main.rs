//! Terminal duel client (default binary).
//!
//! Bootstraps a room over HTTP, then runs the game loop: crossterm input,
//! local prediction through the supervisor, and a framebuffer renderer.

use std::fs::OpenOptions;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use duel_tetris::adapter::{ClientConfig, Supervisor};
use duel_tetris::input::{handle_key_event, should_quit};
use duel_tetris::term::{FrameBuffer, GameView, StatusView, TerminalRenderer, Viewport};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(name = "duel-tetris", version, about = "Turn-based multiplayer Tetris in the terminal")]
struct Cli {
    /// Server address as host[:port]; overrides DUEL_TETRIS_SERVER
    #[arg(long, short, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a room and print its id
    Create,
    /// Create a room, join it and play
    Host,
    /// Join an existing room and play
    Join { room_id: String },
    /// Reconnect to a room with a known player id
    Play { room_id: String, player_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server.as_deref() {
        config = config.with_server(server);
    }
    init_logging(config.log_path.as_deref())?;

    let mut supervisor = Supervisor::new(config)?;

    let (room_id, player_id) = match cli.command {
        Command::Create => {
            println!("{}", supervisor.create_room()?);
            return Ok(());
        }
        Command::Host => {
            let room_id = supervisor.create_room()?;
            let joined = supervisor.join_room(&room_id)?;
            (room_id, joined.player_id)
        }
        Command::Join { room_id } => {
            let joined = supervisor.join_room(&room_id)?;
            (room_id, joined.player_id)
        }
        Command::Play { room_id, player_id } => (room_id, player_id),
    };

    supervisor.connect(&room_id, &player_id)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, &mut supervisor, &room_id, &player_id);

    // Always try to restore terminal state.
    let _ = term.exit();
    supervisor.shutdown();

    println!("room {room_id}, player {player_id}");
    result
}

/// Log to a file when `DUEL_TETRIS_LOG_PATH` is set; the terminal itself is
/// owned by the renderer.
fn init_logging(path: Option<&str>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(
    term: &mut TerminalRenderer,
    supervisor: &mut Supervisor,
    room_id: &str,
    player_id: &str,
) -> Result<()> {
    info!(%room_id, %player_id, "game loop started");

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut dirty = true;
    let mut last_link = supervisor.connection_state();

    loop {
        if supervisor.poll(Instant::now()) {
            dirty = true;
        }
        let link = supervisor.connection_state();
        if link != last_link {
            debug!(from = last_link.as_str(), to = link.as_str(), "connection state");
            last_link = link;
            dirty = true;
        }

        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let status = StatusView {
                room_id,
                connection: link.as_str(),
                pending: supervisor.pending_len(),
            };
            view.render_into(supervisor.state(), &status, player_id, Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        if !event::poll(FRAME)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if should_quit(key) {
                    info!("quit requested");
                    return Ok(());
                }
                if let Some(kind) = handle_key_event(key) {
                    match supervisor.submit(kind, Instant::now()) {
                        Ok(_) => dirty = true,
                        Err(reason) => {
                            debug!(command = kind.as_str(), reason = reason.as_str(), "not sent")
                        }
                    }
                }
            }
            Event::Resize(..) => {
                term.invalidate();
                dirty = true;
            }
            _ => {}
        }
    }
}
