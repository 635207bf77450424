//! Logger setup shared by the binaries.

use crate::error::{Error, Result};
use log::LevelFilter;
use std::io;
use std::path::Path;

/// Installs a global `fern` logger.
///
/// Records at `level` and above go to stderr. With `log_file`, every record
/// at debug level and above is appended to that file as well.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let dispatch = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let dispatch = match log_file {
        Some(path) => {
            let file = fern::log_file(path).map_err(|source| Error::Io {
                operation: format!("open log file {}", path.display()),
                source,
            })?;
            dispatch
                .chain(fern::Dispatch::new().level(LevelFilter::Debug).chain(file))
                .chain(fern::Dispatch::new().level(level).chain(io::stderr()))
        }
        None => dispatch.level(level).chain(io::stderr()),
    };

    dispatch.apply()?;
    Ok(())
}
