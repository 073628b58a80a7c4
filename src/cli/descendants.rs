use std::path::PathBuf;

use anyhow::Context;
use atlas_merge::{RegionHierarchy, domain::region_id_from_reference};
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
pub struct Descendants {
    /// The region hierarchy JSON file
    #[arg(long)]
    hierarchy: PathBuf,

    /// A region id, region reference, or acronym
    region: String,
}

impl Descendants {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let hierarchy = RegionHierarchy::load(&self.hierarchy)
            .with_context(|| format!("Failed to load hierarchy {}", self.hierarchy.display()))?;

        let region = region_id_from_reference(&self.region)
            .ok()
            .or_else(|| hierarchy.find_by_acronym(&self.region))
            .with_context(|| format!("'{}' is neither a region id nor a known acronym", self.region))?;

        let ids = hierarchy.descendants_of(region);
        if ids.is_empty() {
            anyhow::bail!("Region {region} is not found in the hierarchy");
        }

        for id in ids {
            match hierarchy.get(id).and_then(|r| r.acronym()) {
                Some(acronym) => println!("{id}\t{acronym}"),
                None => println!("{id}"),
            }
        }
        Ok(())
    }
}
