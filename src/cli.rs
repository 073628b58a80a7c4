use std::path::{Path, PathBuf};

mod descendants;
mod info;
mod merge;
mod run;
mod terminal;

use anyhow::Context;
use atlas_merge::{LabelVolume, RegionHierarchy, compositor::MergeOutcome};
use clap::ArgAction;
use descendants::Descendants;
use info::Info;
use merge::Merge;
use run::Run;
use terminal::Colorize;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run()
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Merge default datasets with per-region override datasets
    ///
    /// Every voxel whose annotation label belongs to an override region (or
    /// one of its descendants) takes the value of the override dataset.
    /// Overrides are applied in the order given, so later ones win.
    Merge(Merge),

    /// Run every merge rule of a configuration file
    Run(Run),

    /// List a region and all of its descendants
    Descendants(Descendants),

    /// Show the element type, shape and geometry of a volume
    Info(Info),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Merge(command) => command.run()?,
            Self::Run(command) => command.run()?,
            Self::Descendants(command) => command.run()?,
            Self::Info(command) => command.run()?,
        }
        Ok(())
    }
}

/// Loads the inputs shared by every merge of a run.
fn load_inputs(
    hierarchy: &Path,
    annotation: &Path,
) -> anyhow::Result<(RegionHierarchy, LabelVolume)> {
    let hierarchy = RegionHierarchy::load(hierarchy)
        .with_context(|| format!("Failed to load hierarchy {}", hierarchy.display()))?;
    let annotation = LabelVolume::load(annotation)
        .with_context(|| format!("Failed to load annotation {}", annotation.display()))?;
    Ok((hierarchy, annotation))
}

fn print_outcome(outcome: &MergeOutcome, output_dir: &Path) {
    for region in &outcome.unknown_regions {
        eprintln!(
            "{}",
            format!(
                "⚠️  Region {} is not in the hierarchy and was skipped for {}",
                region.region,
                region.dataset.display()
            )
            .warning()
        );
    }

    println!(
        "{}",
        format!(
            "✅ {} volume(s) merged in {}",
            outcome.outputs.len(),
            output_dir.display()
        )
        .success()
    );
    for output in &outcome.outputs {
        println!("  • {}", output.display().to_string().dim());
    }
}

/// Parses `REGION=DIR`, where `REGION` is a region reference or a bare id.
fn parse_override(s: &str) -> Result<(atlas_merge::RegionId, PathBuf), String> {
    let (region, dir) = s
        .split_once('=')
        .ok_or_else(|| format!("expected REGION=DIR, got '{s}'"))?;
    let region = atlas_merge::domain::region_id_from_reference(region).map_err(|e| e.to_string())?;
    if dir.is_empty() {
        return Err(format!("missing override directory in '{s}'"));
    }
    Ok((region, PathBuf::from(dir)))
}
