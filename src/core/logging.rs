//! Logging initialization

/// Initialize env_logger with a default filter of `info`.
///
/// Host applications that configure their own logger should skip this;
/// the crate only emits through the `log` facade. Override the filter
/// with the RUST_LOG environment variable, e.g. `RUST_LOG=satin=debug`.
///
/// # Example
/// ```
/// satin::core::logging::init();
/// log::info!("parameters ready");
/// ```
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
