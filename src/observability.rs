//! This module provides observability and diagnostics for the codec.
//!
//! Every encode and decode call logs its sizes and timings through the `log`
//! facade, and the per-chunk pipeline emits structured metrics with the
//! `log_metric!` macro. Nothing is printed unless the host application installs
//! a logger, either its own or the one from [`enable_verbose_logging`].

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use crate::error::SjzipError;

/// The log target used by `log_metric!`, so metrics can be filtered separately.
pub const METRIC_TARGET: &str = "sjzip::metric";

/// Logs a structured key-value metric line at debug level under the
/// `sjzip::metric` target.
///
/// # Example
/// ```
/// use sjzip::log_metric;
/// let chunk = 4;
/// log_metric!("event"="encode_chunk", "stage"="map", "chunk"=&chunk);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!(target: $crate::observability::METRIC_TARGET, $crate::__log::Level::Debug) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            $crate::__log::debug!(
                target: $crate::observability::METRIC_TARGET,
                "SJZIP_METRIC: {{ {} }}",
                parts.join(", ")
            );
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs a process-wide `env_logger` at debug level, optionally appending to
/// `log_file` instead of stderr. Only the first call has any effect; a logger
/// installed by the host application is left untouched.
pub fn enable_verbose_logging(log_file: Option<&Path>) -> Result<(), SjzipError> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);

        // Custom formatter: just print the level and message
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
