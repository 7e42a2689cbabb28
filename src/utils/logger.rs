use env_logger::Env;

/// Initialize env_logger with a default `info` filter.
/// Safe to call more than once; later calls are no-ops.
pub fn setup_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
