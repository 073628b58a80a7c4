use std::path::PathBuf;

use atlas_merge::Volume;
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
pub struct Info {
    /// The volume file
    volume: PathBuf,
}

impl Info {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let volume = Volume::load(&self.volume)?;
        let geometry = volume.geometry();
        let [x, y, z] = volume.shape();
        let [dx, dy, dz] = geometry.spacing();
        let [ox, oy, oz] = geometry.offset();

        println!("{}", self.volume.display());
        println!("  type:    {}", volume.element_type());
        println!("  shape:   {x} x {y} x {z}");
        println!("  spacing: {dx} {dy} {dz}");
        println!("  offset:  {ox} {oy} {oz}");
        if let Some(space) = &geometry.space {
            println!("  space:   {space}");
        }
        Ok(())
    }
}
