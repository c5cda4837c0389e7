//! Raw PBX traffic capture
//!
//! When enabled, every chunk read from the child session is appended to a
//! dated file under `~/.pbxd/logs/wire/`. ANSI escape sequences and
//! non-printable characters are stripped so the OSSI lines and screen text
//! stay readable. Writing happens on a worker thread so the expect loop
//! never blocks on disk.

use super::{LogError, formatter::LogFormatter};
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    borrow::Cow,
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver, RecvTimeoutError, SyncSender},
    },
    thread,
    time::{Duration, Instant},
};

const WIRE_LOG_FLUSH_INTERVAL: Duration = Duration::from_millis(100);
// Bounded backlog; wire capture must not grow without limit if disk stalls.
const WIRE_LOG_QUEUE_CAPACITY: usize = 1024;

type LogFileFactory = Arc<dyn Fn() -> Result<File, LogError> + Send + Sync>;

// Compiled regex for removing ANSI escape sequences
static ANSI_ESCAPE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \x1B\[[\x30-\x3F]*[\x20-\x2F]*[\x40-\x7E]    # CSI: ESC [ params intermediates final
        |\x1B\][^\x07\x1B]*(?:\x07|\x1B\\)           # OSC: ESC ] ... (BEL or ESC \)
        |\x1B[PX^_].*?\x1B\\                         # DCS/SOS/PM/APC: ESC P/X/^/_ ... ESC \
        |\x1B.                                       # Other ESC sequences (2 bytes)
        |\x1B                                        # Stray ESC character
    ",
    )
    .unwrap()
});

#[derive(Clone)]
pub(super) struct WireLogger {
    formatter: LogFormatter,
    worker_tx: Arc<Mutex<Option<SyncSender<String>>>>,
}

impl Default for WireLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl WireLogger {
    pub(super) fn new() -> Self {
        Self {
            formatter: LogFormatter::new(true, false),
            worker_tx: Arc::new(Mutex::new(None)),
        }
    }

    pub(super) fn log(&self, chunk: &str) -> Result<(), LogError> {
        let tx = self.ensure_worker()?;
        tx.send(chunk.to_string())
            .map_err(|err| LogError::WorkerError(format!("failed to enqueue wire log chunk: {}", err)))
    }

    // Worker lifecycle.
    fn ensure_worker(&self) -> Result<SyncSender<String>, LogError> {
        let mut worker_tx_guard = self.worker_tx.lock().unwrap();
        if let Some(existing_tx) = worker_tx_guard.as_ref() {
            return Ok(existing_tx.clone());
        }

        let (tx, rx) = mpsc::sync_channel(WIRE_LOG_QUEUE_CAPACITY);
        let formatter = self.formatter.clone();
        let file_factory: LogFileFactory = Arc::new(WireLogger::create_log_file);

        thread::Builder::new()
            .name("wire-log-writer".to_string())
            .spawn(move || run_worker(rx, formatter, file_factory))
            .map_err(|err| LogError::WorkerError(format!("failed to spawn wire log worker: {}", err)))?;

        *worker_tx_guard = Some(tx.clone());
        Ok(tx)
    }

    // File creation helper.
    fn create_log_file() -> Result<File, LogError> {
        let log_path = get_wire_log_path()?;

        OpenOptions::new().create(true).append(true).open(log_path).map_err(LogError::from)
    }
}

struct WireLogWorkerState {
    line_buffer: String,
    writer: Option<BufWriter<File>>,
    last_flush: Instant,
}

fn run_worker(receiver: Receiver<String>, formatter: LogFormatter, file_factory: LogFileFactory) {
    let mut state = WireLogWorkerState {
        line_buffer: String::new(),
        writer: None,
        last_flush: Instant::now(),
    };

    loop {
        match receiver.recv_timeout(WIRE_LOG_FLUSH_INTERVAL) {
            Ok(chunk) => {
                let _ = process_chunk(&mut state, &formatter, &chunk, file_factory.as_ref());
            }
            Err(RecvTimeoutError::Timeout) => {
                let _ = flush_if_due(&mut state);
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(writer) = state.writer.as_mut() {
                    let _ = writer.flush();
                }
                break;
            }
        }
    }
}

fn process_chunk(
    state: &mut WireLogWorkerState,
    formatter: &LogFormatter,
    chunk: &str,
    create_log_file: &dyn Fn() -> Result<File, LogError>,
) -> Result<(), LogError> {
    state.line_buffer.push_str(chunk);
    let lines = extract_complete_lines(&mut state.line_buffer);

    if lines.is_empty() {
        return Ok(());
    }

    if state.writer.is_none() {
        state.writer = Some(BufWriter::new(create_log_file()?));
    }

    for line in lines {
        let sanitized = sanitize_line(&line);
        if sanitized.is_empty() {
            continue;
        }

        let formatted = formatter.format(None, sanitized.as_ref());
        if let Some(writer) = state.writer.as_mut() {
            writer.write_all(formatted.as_bytes())?;
            writer.write_all(b"\n")?;
        }
    }

    flush_if_due(state)
}

fn flush_if_due(state: &mut WireLogWorkerState) -> Result<(), LogError> {
    if state.last_flush.elapsed() >= WIRE_LOG_FLUSH_INTERVAL {
        if let Some(writer) = state.writer.as_mut() {
            writer.flush()?;
        }
        state.last_flush = Instant::now();
    }
    Ok(())
}

fn get_wire_log_path() -> Result<PathBuf, LogError> {
    let home_dir = dirs::home_dir().ok_or_else(|| LogError::DirectoryCreationError("Home directory not found".to_string()))?;

    let log_dir = home_dir.join(".pbxd").join("logs").join("wire");

    std::fs::create_dir_all(&log_dir)?;

    let date = Local::now().format("%Y-%m-%d");
    Ok(log_dir.join(format!("{}.log", date)))
}

fn sanitize_line(line: &str) -> Cow<'_, str> {
    let cleaned = if line.as_bytes().contains(&0x1b) {
        ANSI_ESCAPE_REGEX.replace_all(line, "")
    } else {
        Cow::Borrowed(line)
    };

    let needs_filter = cleaned.chars().any(|ch| !(ch.is_alphanumeric() || ch.is_ascii_punctuation() || ch == ' ' || ch == '\t'));
    if !needs_filter {
        return cleaned;
    }

    Cow::Owned(
        cleaned
            .chars()
            .filter(|ch| ch.is_alphanumeric() || ch.is_ascii_punctuation() || *ch == ' ' || *ch == '\t')
            .collect::<String>(),
    )
}

fn extract_complete_lines(buffer: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0usize;

    while let Some(relative_newline) = buffer[start..].find('\n') {
        let end = start + relative_newline;
        lines.push(buffer[start..end].trim_end_matches('\r').to_string());
        start = end + 1;
    }

    if start > 0 {
        buffer.drain(..start);
    }

    lines
}
