//! Terminal front-end for the spyglass overlay core.
//!
//! Tails the Minecraft log, feeds every appended line through the event
//! pipeline, and reprints the stats table whenever the visible rows
//! change.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::filter::EnvFilter;

use spyglass_core::api::{ApiError, StatsProvider};
use spyglass_core::nicks::NickDatabase;
use spyglass_core::player::{MISSING_WINSTREAKS, Winstreaks};
use spyglass_core::reader::tail_file;
use spyglass_core::rows::{get_stat_list, overlay_visible, status_banner};
use spyglass_core::settings::Settings;
use spyglass_core::workers::spawn_stats_workers;
use spyglass_core::{OverlayContext, Player, fast_forward_state, process_lines};
use spyglass_types::ColumnName;

/// Column separator in the printed table.
const SEP: &str = "    ";
/// How often the renderer polls for changed rows.
const RENDER_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(version, about = "Bedwars lobby overlay for the terminal")]
struct Cli {
    /// Log file to tail, overriding the configured path
    #[arg(short, long)]
    logfile: Option<PathBuf>,
}

/// Stand-in for the identity and stats services.
///
/// Lobby, party and nickname tracking work fully offline; stats lookups
/// degrade to error rows until a real provider is plugged in here.
struct OfflineProvider;

impl StatsProvider for OfflineProvider {
    fn get_uuid(&self, _username: &str) -> Result<Option<String>, ApiError> {
        Err(ApiError::ServiceDown)
    }

    fn get_playerdata(&self, _uuid: &str) -> Result<Option<(i64, Value)>, ApiError> {
        Err(ApiError::ServiceDown)
    }

    fn get_estimated_winstreaks(&self, _uuid: &str) -> (Winstreaks, bool) {
        (MISSING_WINSTREAKS, false)
    }
}

/// Initialize logging, writing to SPYGLASS_LOG_PATH if set, otherwise
/// stderr. Stdout is reserved for the table.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("SPYGLASS_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// The vanilla launcher's log location for this platform.
fn default_logfile_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    return dirs::data_dir().map(|data| data.join(".minecraft/logs/latest.log"));
    #[cfg(target_os = "macos")]
    return dirs::home_dir()
        .map(|home| home.join("Library/Application Support/minecraft/logs/latest.log"));
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    return dirs::home_dir().map(|home| home.join(".minecraft/logs/latest.log"));
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(path) = cli.logfile {
        settings.logfile_path = Some(path);
    }

    let Some(logfile_path) = settings.logfile_path.clone().or_else(default_logfile_path) else {
        tracing::error!("No logfile found. Pass one with --logfile");
        std::process::exit(1);
    };

    let column_order = settings.column_order.clone();
    let autohide_timeout = Duration::from_secs(settings.autohide_timeout_s);

    let default_database: hashbrown::HashMap<String, String> = settings
        .known_nicks
        .iter()
        .map(|(nick, value)| (nick.clone(), value.uuid.clone()))
        .collect();
    // A read-only nick database can sit beside the settings file.
    let secondary_paths: Vec<PathBuf> = settings
        .config_path
        .as_deref()
        .and_then(|path| path.parent())
        .map(|dir| dir.join("nick_database.json"))
        .filter(|path| path.exists())
        .into_iter()
        .collect();
    let nick_database = NickDatabase::from_disk(default_database.clone(), &secondary_paths)
        .unwrap_or_else(|err| {
            tracing::warn!("Failed loading the nick database: {err}. Continuing without it.");
            NickDatabase::new(default_database, Vec::new())
        });

    let ctx = Arc::new(OverlayContext::new(
        settings,
        nick_database,
        Box::new(OfflineProvider),
    ));

    // Replay the existing log so the current session's username, party
    // and lobby are known before tailing starts
    let backlog = match std::fs::read(&logfile_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed reading logfile '{}': {err}", logfile_path.display());
            std::process::exit(1);
        }
    };
    fast_forward_state(&ctx, String::from_utf8_lossy(&backlog).lines());

    let (line_tx, mut line_rx) = tokio::sync::mpsc::unbounded_channel();
    let (request_tx, request_rx) = mpsc::channel();
    let (completed_tx, completed_rx) = mpsc::channel();

    spawn_stats_workers(Arc::clone(&ctx), request_rx, completed_tx);
    tokio::spawn(tail_file(logfile_path, backlog.len() as u64, line_tx));
    tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { process_lines(&ctx, &mut line_rx).await }
    });

    ctx.request_redraw();
    render_loop(
        &ctx,
        &column_order,
        autohide_timeout,
        &completed_rx,
        &request_tx,
    )
    .await;
}

async fn render_loop(
    ctx: &OverlayContext,
    column_order: &[ColumnName],
    autohide_timeout: Duration,
    completed: &mpsc::Receiver<String>,
    requests: &mpsc::Sender<String>,
) {
    let mut interval = tokio::time::interval(RENDER_INTERVAL);
    let mut visible = false;

    loop {
        interval.tick().await;

        let state = ctx.state_snapshot();
        let now_visible = overlay_visible(&state, autohide_timeout, Instant::now());
        if visible && !now_visible {
            clear_screen();
            println!("Waiting for the next queue...");
        }
        visible = now_visible;

        if let Some(rows) = get_stat_list(ctx, completed, requests) {
            if visible {
                print_table(&rows, column_order, status_banner(&state));
            }
        }
    }
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    let _ = std::io::stdout().flush();
}

fn print_table(rows: &[Player], column_order: &[ColumnName], banner: Option<&str>) {
    let rendered: Vec<Vec<String>> = rows
        .iter()
        .map(|player| {
            column_order
                .iter()
                .map(|column| player.render_stat(*column))
                .collect()
        })
        .collect();

    // Each column is as wide as its widest cell, header included
    let widths: Vec<usize> = column_order
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rendered
                .iter()
                .map(|row| row[index].len())
                .chain([column.header().len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    if let Some(banner) = banner {
        out.push_str(&format!(
            "\x1b[1mThe overlay is {banner} with the lobby. Please use /who.\x1b[0m\n"
        ));
    }

    for (index, column) in column_order.iter().enumerate() {
        let header = column.header();
        let sep = column_sep(index, column_order.len());
        // Headers share their column's justification
        if index == 0 {
            out.push_str(&format!(
                "\x1b[1m{header:<width$}\x1b[0m{sep}",
                width = widths[index]
            ));
        } else {
            out.push_str(&format!(
                "\x1b[1m{header:>width$}\x1b[0m{sep}",
                width = widths[index]
            ));
        }
    }

    for row in &rendered {
        for (index, cell) in row.iter().enumerate() {
            let sep = column_sep(index, column_order.len());
            // Names left justified, numbers right justified
            if index == 0 {
                out.push_str(&format!("{cell:<width$}{sep}", width = widths[index]));
            } else {
                out.push_str(&format!("{cell:>width$}{sep}", width = widths[index]));
            }
        }
    }

    clear_screen();
    print!("{out}");
    let _ = std::io::stdout().flush();
}

fn column_sep(index: usize, column_count: usize) -> &'static str {
    if index + 1 == column_count { "\n" } else { SEP }
}
