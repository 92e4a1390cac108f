mod app;
mod ui;

use anyhow::Result;
use app::{App, InputMode};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use rpcwatch_client::{RpcConnection, Transport, WsTransport};
use rpcwatch_core::storage::{ConfigStorage, init_config_dir};
use std::io;
use std::path::PathBuf;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
const DEFAULT_LOG_LEVEL: &str = "info";

fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "rpcwatch={lvl},rpcwatch_client={lvl},rpcwatch_core={lvl}",
        lvl = level
    ))
}

/// Installs the JSON file subscriber before the config is read, so config
/// loading is logged too. The returned closure switches to the configured
/// level unless `RPCWATCH_LOG` is set.
fn setup_logging() -> Result<impl FnOnce(&str) -> Result<()>> {
    let mut log_path = std::env::temp_dir();
    log_path.push("rpcwatch.log");

    let env_filter = EnvFilter::try_from_env("RPCWATCH_LOG").ok();
    let from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| crate_filter(DEFAULT_LOG_LEVEL));

    let log_file = std::fs::File::create(log_path)?;
    let builder = tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter)
        .json()
        .with_filter_reloading();
    let handle = builder.reload_handle();
    tracing::subscriber::set_global_default(builder.finish())?;

    Ok(move |level: &str| -> Result<()> {
        if !from_env {
            handle.reload(crate_filter(level))?;
        }
        Ok(())
    })
}

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);

        tracing::error!(?panic_info, "Application panicked");

        eprintln!("A fatal error occurred: {}", panic_info);

        original_hook(panic_info);
    }));
}

#[derive(Parser, Debug)]
#[command(name = "rpcwatch")]
#[command(about = "rpcwatch - JSON-RPC over WebSocket debug console", long_about = None)]
struct Args {
    /// WebSocket endpoint (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    /// Method sent by the [s] key (overrides config)
    #[arg(short, long)]
    method: Option<String>,

    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Connect immediately on startup
    #[arg(short, long)]
    connect: bool,
}

fn handle_key_event<T: Transport>(app: &mut App<T>, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        app.show_help = false;
        return;
    }

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Command => match code {
            KeyCode::Enter => app.submit_input(),
            KeyCode::Esc => {
                app.input_buffer.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            KeyCode::Char(c) => app.input_buffer.push(c),
            _ => {}
        },
        InputMode::Normal => {
            app.status_message.clear();
            match code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('?') => app.show_help = true,
                KeyCode::Char('c') => app.connect(),
                KeyCode::Char('d') => app.disconnect(),
                KeyCode::Char('s') => app.send_default(),
                KeyCode::Char('i') | KeyCode::Char(':') | KeyCode::Enter => {
                    app.input_mode = InputMode::Command;
                }
                KeyCode::Up | KeyCode::Char('k') => app.scroll_up(),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_down(),
                KeyCode::Char('g') => app.scroll_top(),
                KeyCode::Char('G') => app.scroll_bottom(),
                _ => {}
            }
        }
    }
}

/// Close the socket and give the close handshake a moment to finish.
async fn shutdown<T: Transport>(app: &mut App<T>) {
    if !app.conn.has_transport() {
        return;
    }

    app.conn.disconnect();
    let drain = async {
        while app.conn.has_transport() {
            app.conn.process_next_event().await;
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        tracing::warn!("Transport did not close within {:?}", SHUTDOWN_GRACE);
    }
}

/// Draw and dispatch until the user quits. Errors come back to the caller so
/// the terminal can be restored first.
async fn run<B: Backend, T: Transport>(
    terminal: &mut Terminal<B>,
    app: &mut App<T>,
    mut next_input: impl FnMut() -> io::Result<Option<Event>>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            _ = app.conn.process_next_event() => {
                app.sync_scroll();
            }
            _ = tokio::time::sleep(Duration::from_millis(16)) => {
                match next_input()? {
                    Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        handle_key_event(app, key.code, key.modifiers);
                    }
                    Some(Event::Resize(width, height)) => {
                        info!(width, height, "Terminal resized");
                    }
                    _ => {}
                }
            }
        }
    }
}

fn poll_terminal() -> io::Result<Option<Event>> {
    if event::poll(Duration::from_millis(0))? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let apply_log_level = setup_logging()?;

    let config_dir = match args.config_dir {
        Some(dir) => dir,
        None => init_config_dir()?,
    };
    let mut config = ConfigStorage::new(config_dir).load()?;
    if let Some(url) = args.url {
        config.endpoint = url;
    }
    if let Some(method) = args.method {
        config.default_method = method;
    }
    config.validate()?;

    apply_log_level(&config.log_level)?;
    setup_panic_hook();
    info!(endpoint = %config.endpoint, "rpcwatch starting up");

    let mut app = App::new(RpcConnection::new(WsTransport::new()), config);
    if args.connect {
        app.connect();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, poll_terminal).await;
    if let Err(e) = &result {
        tracing::error!("Event loop failed: {:#}", e);
    }

    shutdown(&mut app).await;
    info!("rpcwatch shutting down");

    let restored = restore_terminal(&mut terminal);
    result?;
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;
    use rpcwatch_core::models::ConsoleConfig;

    fn test_app() -> App {
        App::new(
            RpcConnection::new(WsTransport::new()),
            ConsoleConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_run_returns_input_errors() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app();

        let result = run(&mut terminal, &mut app, || {
            Err(io::Error::other("terminal went away"))
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("terminal went away"));
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_run_stops_on_quit_key() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = test_app();
        let mut keys = vec![Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))];

        run(&mut terminal, &mut app, || Ok(keys.pop())).await.unwrap();

        assert!(app.should_quit);
    }
}
