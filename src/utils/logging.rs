//! Logging configuration
//!
//! Uses `env_logger` with a compact `[ts level module:line] msg` format on
//! stdout. `RUST_LOG` always wins over the level picked on the command line.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes logging with `default_level` unless `RUST_LOG` is set
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging_with_level(default_level: LevelFilter) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(default_level);
    } else {
        builder.parse_env("RUST_LOG");
    }

    let _ = builder.try_init();
}

fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
