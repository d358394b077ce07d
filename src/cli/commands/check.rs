//! Check Command
//!
//! Connection test for the configured LLM provider.
//!
//! Usage:
//!   codelens check

use crate::ai::{LlmProvider, ProviderConfig, create_provider};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::types::Result;

pub fn run() -> Result<()> {
    let context = CommandContext::load()?;
    let output = Output::new();

    let provider = create_provider(&ProviderConfig::from(&context.config.llm))?;

    output.header("Provider check");
    output.field("Provider", provider.name());
    output.field("Model", provider.model());
    if provider.name() == "bedrock" {
        output.field("Region", &context.config.llm.region);
    }

    let healthy = runtime()?.block_on(ping(provider.as_ref()))?;
    if healthy {
        output.success(&format!("{} is reachable", provider.name()));
    } else {
        output.warning(&format!(
            "{} did not answer the health check; see the log with --verbose",
            provider.name()
        ));
    }
    Ok(())
}

async fn ping(provider: &dyn LlmProvider) -> Result<bool> {
    provider.health_check().await
}
