// Custom logger

use env_logger::{Builder, Env};
use std::io::Write;

/// Log to stderr as "<timestamp> [LEVEL] - message", at info level unless RUST_LOG says otherwise.
pub fn init_log() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
