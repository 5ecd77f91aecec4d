use anyhow::Context;

use restkit_api::{ApiStack, StackConfig};

fn main() -> anyhow::Result<()> {
    restkit_observability::init();

    let config = StackConfig::load().context("failed to load stack configuration")?;
    let built = ApiStack::build(&config).context("failed to build stack")?;

    let failures = built.api.failures();
    if !failures.is_empty() {
        tracing::warn!(count = failures.len(), "some endpoints were not registered");
    }

    let written = built
        .write_outputs(&config.output_dir)
        .with_context(|| format!("failed to write outputs to {}", config.output_dir.display()))?;
    for path in &written {
        tracing::info!(path = %path.display(), "wrote");
    }

    Ok(())
}
