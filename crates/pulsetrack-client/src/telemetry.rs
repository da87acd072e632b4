/// Initialise structured JSON logging for embedders that do not bring
/// their own subscriber. Level controlled via the RUST_LOG env var.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logging() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "pulsetrack=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .ok();
}
