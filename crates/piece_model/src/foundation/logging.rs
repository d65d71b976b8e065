//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Log target for model-level messages (loading, metafiles, final properties)
pub const MODEL: &str = "model";

/// Log target for per-piece messages (naming, transforms, hierarchy)
pub const PIECE: &str = "piece";

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging for tests, ignoring repeated initialization
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
