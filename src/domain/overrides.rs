use std::path::{Path, PathBuf};

use crate::domain::region::RegionId;

/// One entry of an [`OverrideMap`]: a region and the directory holding its
/// replacement volumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// The region whose voxels are replaced, including its descendants.
    pub region: RegionId,
    /// Directory containing one replacement file per dataset, named like
    /// the default file it overrides.
    pub dir: PathBuf,
}

impl Override {
    /// Creates an override entry.
    pub fn new(region: RegionId, dir: impl Into<PathBuf>) -> Self {
        Self {
            region,
            dir: dir.into(),
        }
    }

    /// Path of the replacement for the dataset with the given file name.
    #[must_use]
    pub fn file_for(&self, file_name: &Path) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// An ordered sequence of region overrides.
///
/// Entries are applied in insertion order, so when two entries select the
/// same voxel the later one wins. The same region may appear more than once;
/// entries are never sorted or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideMap {
    entries: Vec<Override>,
}

impl OverrideMap {
    /// Creates an empty override map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an override after all existing entries.
    pub fn push(&mut self, region: RegionId, dir: impl Into<PathBuf>) {
        self.entries.push(Override::new(region, dir));
    }

    /// Iterates over the entries in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Override> {
        self.entries.iter()
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<(RegionId, P)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (RegionId, P)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(region, dir)| Override::new(region, dir))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OverrideMap {
    type Item = &'a Override;
    type IntoIter = std::slice::Iter<'a, Override>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut map = OverrideMap::new();
        map.push(549, "b");
        map.push(315, "a");
        map.push(549, "c");

        let regions: Vec<_> = map.iter().map(|entry| entry.region).collect();
        assert_eq!(regions, vec![549, 315, 549]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.iter().last().unwrap().dir, PathBuf::from("c"));
    }

    #[test]
    fn collects_from_pairs() {
        let map: OverrideMap = [(1_u32, "x"), (2, "y")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert!(!map.is_empty());
        assert_eq!(
            map.iter().next().unwrap().file_for(Path::new("density.nrrd")),
            PathBuf::from("x/density.nrrd")
        );
    }
}
