/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr so that primary program output (the status
/// listing) stays clean on stdout.
pub fn setup_logging() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting default subscriber failed!");
}
