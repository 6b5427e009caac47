//! Adapters for the `DomainLogger` port.

use crate::domains::logger::{DomainLogger, DynLogger};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{}", msg);
    }
    fn warn(&self, msg: &str) {
        println!("WARN: {}", msg);
    }
    fn error(&self, msg: &str) {
        eprintln!("ERROR: {}", msg);
    }
}

pub fn init_console_logger() -> DynLogger {
    Arc::new(ConsoleLogger)
}

struct NoopLogger;

impl DomainLogger for NoopLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Swallows everything; the default in unit tests.
pub fn init_noop_logger() -> DynLogger {
    Arc::new(NoopLogger)
}

/// Forwards to the `log` facade, which `fast_log` writes to a file.
struct FileLogger;

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log::info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
    fn warn(&self, msg: &str) {
        log::warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
    fn error(&self, msg: &str) {
        log::error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Install `fast_log` as the global `log` backend writing to `path`. Must run
/// before the tracing subscriber claims the `log` facade.
pub fn init_file_logger(path: &str) -> Result<DynLogger, String> {
    fast_log::init(fast_log::config::Config::new().file(path).level(log::LevelFilter::Info))
        .map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}

/// Sends each message to every inner logger, in order.
pub struct FanoutLogger {
    targets: Vec<DynLogger>,
}

impl FanoutLogger {
    pub fn new(targets: Vec<DynLogger>) -> Self {
        Self { targets }
    }
}

impl DomainLogger for FanoutLogger {
    fn info(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.info(msg));
    }
    fn warn(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.warn(msg));
    }
    fn error(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.error(msg));
    }
}

/// File plus console when the file can be opened, console alone otherwise.
pub fn init_combined_logger(path: &str) -> DynLogger {
    let console = init_console_logger();
    match init_file_logger(path) {
        Ok(file) => Arc::new(FanoutLogger::new(vec![file, console])),
        Err(e) => {
            console.warn(&format!("{}; logging to console only", e));
            console
        }
    }
}

enum Level {
    Info,
    Warn,
    Error,
}

struct BufferedLogger {
    sender: mpsc::Sender<(Level, String)>,
}

impl BufferedLogger {
    fn push(&self, level: Level, msg: &str) {
        // Full buffer: drop the message rather than stall the caller.
        let _ = self.sender.try_send((level, msg.to_string()));
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

/// Non-blocking logger for timer-driven code. A background task drains up to
/// `capacity` queued messages into `bridge`. Needs a running tokio runtime.
pub fn init_buffered_logger(bridge: DynLogger, capacity: usize) -> DynLogger {
    let (sender, mut rx) = mpsc::channel::<(Level, String)>(capacity.max(1));

    tokio::spawn(async move {
        while let Some((level, msg)) = rx.recv().await {
            match level {
                Level::Info => bridge.info(&msg),
                Level::Warn => bridge.warn(&msg),
                Level::Error => bridge.error(&msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender })
}
