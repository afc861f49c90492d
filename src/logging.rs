use slog::{Discard, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

use crate::error::{Error, Result};

/// A logger that throws everything away. Used when the host doesn't hand us one
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Build a logger that writes to stderr, filtering out anything below `level`
pub fn terminal_logger(level: Severity) -> Result<Logger> {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);

    builder
        .build()
        .map_err(|e| Error::Logger(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_terminal_logger() {
        let logger = terminal_logger(Severity::Warning).unwrap();
        debug!(logger, "filtered out");
    }

    #[test]
    fn discard_logger_accepts_records() {
        let logger = discard_logger();
        info!(logger, "dropped"; "pc" => 0x200u16);
    }
}
