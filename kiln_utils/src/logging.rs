use tracing_subscriber::EnvFilter;

#[macro_export]
macro_rules! debug_panic {
    ($($arg:tt)*) => ( if cfg!(debug_assertions) { panic!($($arg)*); } else { $crate::tracing::error!($($arg)*); } );
}

/// Installs the default `RUST_LOG` driven subscriber.
///
/// Returns `false` if another global subscriber was already installed.
pub fn init_logging() -> bool {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}
