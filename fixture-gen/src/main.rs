use anyhow::Result;
use fixture_gen::{generate, multi_size_pages, FixtureConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the confirmation line.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = FixtureConfig::default();
    let path = generate(&config, &multi_size_pages())?;
    println!("PDF created successfully at {}", path.display());
    Ok(())
}
