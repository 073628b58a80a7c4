use std::path::PathBuf;

use anyhow::Context;
use atlas_merge::{Compositor, OverrideMap, RegionId, storage::VOLUME_EXTENSION};
use clap::Parser;
use tracing::instrument;

use super::{load_inputs, parse_override, print_outcome};

#[derive(Debug, Parser)]
pub struct Merge {
    /// The region hierarchy JSON file
    #[arg(long)]
    hierarchy: PathBuf,

    /// The annotation volume labelling each voxel with a region id
    #[arg(long)]
    annotation: PathBuf,

    /// The default dataset file, or a directory of dataset files
    #[arg(long = "default", value_name = "PATH")]
    default_output: PathBuf,

    /// The directory merged datasets are written to
    #[arg(long, short)]
    output: PathBuf,

    /// A region override as REGION=DIR (can be specified multiple times)
    ///
    /// REGION is a region id or a reference whose last path segment is the
    /// id. DIR holds one replacement file per default dataset, with the same
    /// file name.
    #[arg(long = "override", value_name = "REGION=DIR", value_parser = parse_override)]
    overrides: Vec<(RegionId, PathBuf)>,

    /// The extension of dataset files
    #[arg(long, default_value = VOLUME_EXTENSION)]
    extension: String,
}

impl Merge {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let (hierarchy, annotation) = load_inputs(&self.hierarchy, &self.annotation)?;
        let overrides: OverrideMap = self.overrides.into_iter().collect();

        let outcome = Compositor::new(&hierarchy, &annotation)
            .with_extension(self.extension)
            .merge(&overrides, &self.default_output, &self.output)
            .with_context(|| format!("Failed to merge {}", self.default_output.display()))?;

        print_outcome(&outcome, &self.output);
        Ok(())
    }
}
