// LOGGING: console logger setup
// RUST_LOG overrides the default `info` level

use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::io::Write;

/// Install the global logger. Lines look like
/// `2024-05-01 12:00:00,123 - futures_bot::ordering - INFO - message`.
/// Calling it twice is harmless; the second call is ignored.
pub fn init() {
    let _ = builder().try_init();
}

fn builder() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(Target::Stderr).format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.target(),
            record.level(),
            record.args()
        )
    });
    builder
}
