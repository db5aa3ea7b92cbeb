//! Custom plugin path sets used as cache keys

use std::path::{Path, PathBuf};

/// Ordered, immutable set of custom plugin paths
///
/// Equality and hashing are element-wise and order-sensitive: the same paths
/// in a different order form a different key. Nothing is deduplicated and
/// paths are not checked for existence here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PluginPathSet(Vec<PathBuf>);

impl PluginPathSet {
    /// Normalize any sequence of paths into a hashable key
    #[must_use]
    pub fn normalize<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self(paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect())
    }

    /// Iterate the paths in the order they were given
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    /// Number of paths in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no custom paths were given
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for PluginPathSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::normalize(iter)
    }
}
