// In: src/observability.rs

//! Process-wide logger setup shared by the CLI and the Python bindings.
//!
//! Library code only emits through the `log` facade. The first call to
//! [`init_logging`] installs an `env_logger` backend that prints `[LEVEL] msg`
//! to stderr, or appends to a file when one is given. Later calls are no-ops.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::GenealogyError;

static INIT_LOGGER: Once = Once::new();

pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), GenealogyError> {
    // Opened before `call_once` so a bad path is reported instead of swallowed.
    let file = match log_file {
        Some(path) => Some(open_log_file(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

/// Maps a `-v` count to a level: 0 = warn, 1 = info, 2 = debug, more = trace.
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn open_log_file(path: &Path) -> Result<File, GenealogyError> {
    Ok(OpenOptions::new().append(true).create(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_subdir").join("lookup.log");
        assert!(matches!(
            init_logging(LevelFilter::Info, Some(&path)),
            Err(GenealogyError::Io(_))
        ));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        assert!(init_logging(LevelFilter::Warn, None).is_ok());
        assert!(init_logging(LevelFilter::Debug, None).is_ok());
    }
}
