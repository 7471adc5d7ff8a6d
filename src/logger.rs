use std::io::Write;

use flexi_logger::{DeferredNow, Logger, LoggerHandle};
use log::Record;

fn format(
    writer: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        writer,
        "[{}][{}][{}:{}] {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.line().unwrap_or(0),
        record.args()
    )
}

/// Log to stderr with a `RUST_LOG`-style filter such as `"info"` or `"faceage=debug"`.
/// Keep the returned handle alive for the life of the program.
pub fn init_logger(log_spec: &str) -> Result<LoggerHandle, flexi_logger::FlexiLoggerError> {
    Logger::try_with_str(log_spec)?
        .log_to_stderr()
        .format(format)
        .start()
}
