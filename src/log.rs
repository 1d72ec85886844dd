//! Scrape log - file-backed, best-effort, silent when uninitialized

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Local;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set up the log file under the user config dir, truncating any previous
/// run's log. Returns the path, or None when no config dir is available.
pub fn init_log() -> Option<PathBuf> {
    let dir = dirs::config_dir()?.join("toonseek");
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("scraper.log");

    if let Ok(mut file) = File::create(&path) {
        let _ = writeln!(
            file,
            "=== Scrape Log Started {} ===",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
    }

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(path.clone());
    }

    Some(path)
}

fn append(line: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref path) = *guard {
            if let Ok(mut file) = OpenOptions::new().append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

/// Log a per-site error. Also mirrored to stderr.
pub fn log_error(source: &str, message: &str) {
    let line = format!("[{}] [{}] ERROR: {}", Local::now().format("%H:%M:%S"), source, message);
    eprintln!("{}", line);
    append(&line);
}

/// Log a per-site info message.
pub fn log_info(source: &str, message: &str) {
    let line = format!("[{}] [{}] INFO: {}", Local::now().format("%H:%M:%S"), source, message);
    append(&line);
}

/// Tail the last `n` log lines, oldest first.
pub fn read_recent_logs(n: usize) -> Vec<String> {
    let path = match LOG_FILE.lock().ok().and_then(|g| g.clone()) {
        Some(p) => p,
        None => return Vec::new(),
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let mut lines: Vec<String> = content.lines().rev().take(n).map(String::from).collect();
            lines.reverse();
            lines
        }
        Err(_) => Vec::new(),
    }
}
