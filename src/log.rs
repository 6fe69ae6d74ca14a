use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level when set.
pub fn set(level: &str) {
    let default = format!("stationhook={level},reqwest=warn,hyper=warn");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(default)))
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
