// Copyright (C) 2020-2026 Andy Kurnia.

// Plain stderr backend for the log facade, for the binaries.
// LEXPLAY_LOG=off|error|warn|info|debug|trace, warn if unset.

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

pub fn level_from_env() -> log::LevelFilter {
    std::env::var("LEXPLAY_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(log::LevelFilter::Warn)
}

// a second call keeps the first logger but still updates the level.
pub fn init_from_env() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_from_env());
}
