// Config Module - Dispatcher configuration
//
// Immutable, process-wide settings loaded once at startup

pub mod settings;

// Re-export public API
pub use settings::{
    current,
    default_config_path,
    init,
    load_from_path,
    load_or_default,
    DispatcherConfig,
};
