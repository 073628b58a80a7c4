use std::path::PathBuf;

use anyhow::Context;
use atlas_merge::{Compositor, MergeConfig};
use clap::Parser;
use tracing::instrument;

use super::{load_inputs, print_outcome};

#[derive(Debug, Parser)]
pub struct Run {
    /// The merge configuration file (TOML, or YAML with a .yaml/.yml
    /// extension)
    config: PathBuf,
}

impl Run {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let config = MergeConfig::load(&self.config)
            .with_context(|| format!("Failed to load config {}", self.config.display()))?;
        let (hierarchy, annotation) = load_inputs(&config.hierarchy, &config.annotation)?;
        let compositor =
            Compositor::new(&hierarchy, &annotation).with_extension(config.extension.as_str());

        for rule in &config.rules {
            let overrides = rule.override_map()?;
            let output_dir = rule.output_dir();

            println!(
                "Merging outputs of rule {} from {} regions",
                rule.name,
                overrides.len()
            );
            let outcome = compositor
                .merge(&overrides, &rule.default_output, &output_dir)
                .with_context(|| format!("Rule '{}' failed", rule.name))?;
            print_outcome(&outcome, &output_dir);
        }
        Ok(())
    }
}
