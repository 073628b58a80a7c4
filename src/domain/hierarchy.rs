//! In-memory brain region hierarchy
//!
//! The [`RegionHierarchy`] is built once from an external description and is
//! immutable afterwards. Its only non-trivial query is
//! [`RegionHierarchy::descendants_of`], which resolves a (possibly internal)
//! region to every label value it covers.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use petgraph::{Direction, graphmap::DiGraphMap};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::region::RegionId;

/// A node of the region hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: RegionId,
    acronym: Option<String>,
    name: Option<String>,
}

impl Region {
    /// Creates a region with no acronym or name.
    #[must_use]
    pub const fn new(id: RegionId) -> Self {
        Self {
            id,
            acronym: None,
            name: None,
        }
    }

    /// Attaches an acronym and a display name to the region.
    #[must_use]
    pub fn with_labels(mut self, acronym: Option<String>, name: Option<String>) -> Self {
        self.acronym = acronym;
        self.name = name;
        self
    }

    /// The unique id of the region.
    #[must_use]
    pub const fn id(&self) -> RegionId {
        self.id
    }

    /// The short acronym of the region, if the description provided one.
    #[must_use]
    pub fn acronym(&self) -> Option<&str> {
        self.acronym.as_deref()
    }

    /// The display name of the region, if the description provided one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Errors that can occur while building a [`RegionHierarchy`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The hierarchy file could not be read.
    #[error("failed to read hierarchy file {path}: {source}")]
    Io {
        /// Path of the hierarchy file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The description is not valid hierarchy JSON.
    #[error("malformed hierarchy description: {0}")]
    Json(#[from] serde_json::Error),

    /// The same region id appears more than once.
    #[error("region {0} is defined more than once")]
    DuplicateId(RegionId),

    /// A region names a parent that is not part of the hierarchy.
    #[error("region {id} refers to unknown parent {parent}")]
    UnknownParent {
        /// The region with the dangling parent link.
        id: RegionId,
        /// The parent id that could not be found.
        parent: RegionId,
    },

    /// Following parent links from a region never reaches a root.
    #[error("region {0} is part of a cycle")]
    Cycle(RegionId),
}

/// A tree (or forest) of brain regions.
///
/// Parent/child relationships live in a directed graph whose edges point
/// from parent to child. The graph is the sole source of truth for
/// relationships; [`Region`] only carries the node attributes.
#[derive(Debug, Default, Clone)]
pub struct RegionHierarchy {
    regions: BTreeMap<RegionId, Region>,
    graph: DiGraphMap<RegionId, ()>,
}

impl RegionHierarchy {
    /// Loads a hierarchy from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid hierarchy
    /// description, or describes something other than a forest.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let hierarchy = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded {} regions from {}",
            hierarchy.len(),
            path.display()
        );
        Ok(hierarchy)
    }

    /// Parses a hierarchy from its JSON description.
    ///
    /// Each node is an object with an integer `id`, optional `acronym` and
    /// `name`, and an optional list of `children` nodes. The top level may be
    /// a single root node, an array of roots, or an object whose `msg` field
    /// holds the array of roots.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or if a region id is
    /// repeated.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let roots = match serde_json::from_str::<Description>(json)? {
            Description::Envelope { msg } | Description::Roots(msg) => msg,
            Description::Root(root) => vec![root],
        };

        let mut links = Vec::new();
        let mut stack: Vec<(Option<RegionId>, Node)> =
            roots.into_iter().rev().map(|node| (None, node)).collect();
        while let Some((parent, node)) = stack.pop() {
            let Node {
                id,
                acronym,
                name,
                children,
            } = node;
            links.push((Region::new(id).with_labels(acronym, name), parent));
            stack.extend(children.into_iter().rev().map(|child| (Some(id), child)));
        }

        Self::from_regions(links)
    }

    /// Builds a hierarchy from a flat listing of `(id, parent)` links.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is repeated, a parent is unknown, or the
    /// links contain a cycle.
    pub fn from_parent_links<I>(links: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (RegionId, Option<RegionId>)>,
    {
        Self::from_regions(
            links
                .into_iter()
                .map(|(id, parent)| (Region::new(id), parent)),
        )
    }

    fn from_regions<I>(links: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = (Region, Option<RegionId>)>,
    {
        let mut hierarchy = Self::default();
        let mut parents = Vec::new();

        for (region, parent) in links {
            let id = region.id;
            if hierarchy.regions.insert(id, region).is_some() {
                return Err(LoadError::DuplicateId(id));
            }
            hierarchy.graph.add_node(id);
            if let Some(parent) = parent {
                parents.push((id, parent));
            }
        }

        for (id, parent) in parents {
            if !hierarchy.regions.contains_key(&parent) {
                return Err(LoadError::UnknownParent { id, parent });
            }
            hierarchy.graph.add_edge(parent, id, ());
        }

        hierarchy.check_acyclic()?;
        Ok(hierarchy)
    }

    /// Walks the forest from its roots, failing if a node is reached twice
    /// or is never reached at all.
    fn check_acyclic(&self) -> Result<(), LoadError> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<RegionId> = self.roots().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(LoadError::Cycle(id));
            }
            stack.extend(self.graph.neighbors_directed(id, Direction::Outgoing));
        }

        match self.regions.keys().find(|id| !visited.contains(id)) {
            Some(&id) => Err(LoadError::Cycle(id)),
            None => Ok(()),
        }
    }

    /// Returns the given region together with all of its descendants.
    ///
    /// An id that is not part of the hierarchy yields an empty set. Callers
    /// treat that as a soft failure.
    #[must_use]
    pub fn descendants_of(&self, id: RegionId) -> BTreeSet<RegionId> {
        let mut descendants = BTreeSet::new();
        if !self.contains(id) {
            return descendants;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if descendants.insert(current) {
                stack.extend(self.graph.neighbors_directed(current, Direction::Outgoing));
            }
        }
        descendants
    }

    /// Whether the region is part of the hierarchy.
    #[must_use]
    pub fn contains(&self, id: RegionId) -> bool {
        self.regions.contains_key(&id)
    }

    /// Looks up a region by id.
    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// Returns the parent of a region, or `None` for roots and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: RegionId) -> Option<RegionId> {
        if !self.contains(id) {
            return None;
        }
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .next()
    }

    /// Returns the direct children of a region, sorted by id.
    #[must_use]
    pub fn children_of(&self, id: RegionId) -> Vec<RegionId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut children: Vec<_> = self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        children.sort_unstable();
        children
    }

    /// Iterates over the root regions in ascending id order.
    pub fn roots(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.regions.keys().copied().filter(|&id| {
            self.graph
                .neighbors_directed(id, Direction::Incoming)
                .next()
                .is_none()
        })
    }

    /// Finds the region with the given acronym.
    ///
    /// If several regions share the acronym, the lowest id is returned.
    #[must_use]
    pub fn find_by_acronym(&self, acronym: &str) -> Option<RegionId> {
        self.regions
            .values()
            .find(|region| region.acronym() == Some(acronym))
            .map(Region::id)
    }

    /// Iterates over all regions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// The number of regions in the hierarchy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the hierarchy has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Description {
    Envelope { msg: Vec<Node> },
    Roots(Vec<Node>),
    Root(Node),
}

#[derive(Debug, Deserialize)]
struct Node {
    id: RegionId,
    #[serde(default)]
    acronym: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
}
