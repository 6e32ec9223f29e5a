use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a formatting subscriber as the global default.
///
/// Returns false when a global subscriber was already installed, which is the
/// normal case when several tests in one binary each ask for logging.
pub fn init_tracing(level: Level) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_thread_names(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
