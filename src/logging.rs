//! Component-tagged logging facade.
//!
//! Every component is handed a [`Tagged`] logger constructed once with its own
//! component tag (`[Planner]`, `[Constraint]`, ...), and calls `tagged.info(...)` etc.
//! instead of reaching for `log::info!` directly, so every line carries its tag without
//! each call site having to remember to include it.

use std::io::Write;

/// Installs the process-wide logger. Call once from `main`.
pub fn init(verbosity: u8) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level_for(verbosity)),
    );
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {}",
            chrono::Utc::now().to_rfc3339(),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// A logger pre-bound to a component tag, e.g. `[Planner]`.
#[derive(Clone, Copy)]
pub struct Tagged {
    tag: &'static str,
}

impl Tagged {
    pub const fn new(tag: &'static str) -> Self {
        Self { tag }
    }

    pub fn error(&self, msg: impl std::fmt::Display) {
        log::error!("[{}] {}", self.tag, msg);
    }

    pub fn warn(&self, msg: impl std::fmt::Display) {
        log::warn!("[{}] {}", self.tag, msg);
    }

    pub fn info(&self, msg: impl std::fmt::Display) {
        log::info!("[{}] {}", self.tag, msg);
    }

    pub fn debug(&self, msg: impl std::fmt::Display) {
        log::debug!("[{}] {}", self.tag, msg);
    }

    pub fn trace(&self, msg: impl std::fmt::Display) {
        log::trace!("[{}] {}", self.tag, msg);
    }
}

pub const SNAPSHOT: Tagged = Tagged::new("Snapshot");
pub const LOAD: Tagged = Tagged::new("Load");
pub const CONSTRAINT: Tagged = Tagged::new("Constraint");
pub const PLANNER: Tagged = Tagged::new("Planner");
pub const EXECUTOR: Tagged = Tagged::new("Executor");
