//! Tails the live log file and feeds its lines to the event pipeline.
//!
//! The launcher swaps, truncates and rotates the log underneath us, so
//! the reader holds no permanent handle. It reopens the file after a
//! sustained silence and shortly after midnight, when the client starts
//! a fresh log.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use chrono::{Local, Timelike};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info, warn};


const REOPEN_TIMEOUT: Duration = Duration::from_secs(30);
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Follow `path` from byte offset `start_at`, sending each appended line.
///
/// Lines are decoded permissively and sent without their line ending.
/// Returns when the receiving end is dropped, not before.
pub async fn tail_file(path: PathBuf, start_at: u64, lines: UnboundedSender<String>) {
    watch_file(&path, start_at, REOPEN_TIMEOUT, POLL_TIMEOUT, &lines).await;
}

async fn watch_file(
    path: &Path,
    start_at: u64,
    reopen_timeout: Duration,
    poll_timeout: Duration,
    lines: &UnboundedSender<String>,
) {
    let mut last_position = start_at;

    loop {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(err) => {
                // The path can dangle for a moment while the launcher
                // swaps logs
                warn!("Failed opening logfile '{}': {err}", path.display());
                sleep(reopen_timeout / 5).await;
                continue;
            }
        };

        let date_opened = Local::now().date_naive();
        let mut last_read = Instant::now();
        let mut reader = BufReader::new(file);

        let filesize = match reader.seek(SeekFrom::End(0)).await {
            Ok(filesize) => filesize,
            Err(err) => {
                warn!("Failed sizing logfile '{}': {err}", path.display());
                sleep(reopen_timeout / 5).await;
                continue;
            }
        };

        // A shrunken file was replaced, read the new one from the start.
        // Otherwise assume it is still the same file and pick up where we
        // left off.
        let resume_at = if last_position > filesize {
            0
        } else {
            last_position
        };
        if let Err(err) = reader.seek(SeekFrom::Start(resume_at)).await {
            warn!("Failed seeking in logfile '{}': {err}", path.display());
            sleep(reopen_timeout / 5).await;
            continue;
        }
        last_position = resume_at;

        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            let read = match reader.read_until(b'\n', &mut buffer).await {
                Ok(read) => read,
                Err(err) => {
                    warn!("Failed reading logfile '{}': {err}", path.display());
                    break;
                }
            };
            last_position += read as u64;

            if read == 0 {
                let silence = last_read.elapsed();
                let new_day = Local::now().date_naive() != date_opened;

                if silence > reopen_timeout {
                    debug!("Timed out reading logfile '{}', reopening", path.display());
                    break;
                }
                if new_day && silence > reopen_timeout / 5 && Local::now().second() > 5 {
                    // The client logs to a new file after midnight. The
                    // seconds check gives it a moment to appear.
                    info!("Reopening logfile after midnight rotation");
                    break;
                }

                sleep(poll_timeout).await;
                continue;
            }

            last_read = Instant::now();
            let line = String::from_utf8_lossy(&buffer);
            let line = line.trim_end_matches(['\r', '\n']);
            if lines.send(line.to_owned()).is_err() {
                debug!("Line channel closed, stopping the logfile reader");
                return;
            }
        }
    }
}
