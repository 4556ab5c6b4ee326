use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path through the container hierarchy of a data service.
///
/// A path is an ordered list of container names, e.g. `["mydb", "public"]`
/// for the `public` schema inside the `mydb` database. The empty path is
/// the root of the service.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ContainerPath {
    pub segments: Vec<String>,
}

impl ContainerPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a slash-delimited path string. Empty input yields the root.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { segments }
    }

    /// Parse a user-typed path, rejecting malformed input instead of
    /// silently repairing it. A single leading or trailing slash is
    /// tolerated; empty or whitespace-only segments are not. Empty
    /// input still yields the root.
    pub fn parse_strict(path: &str) -> Result<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.trim().is_empty() {
                return Err(Error::InvalidPath(format!(
                    "empty segment in '{}'",
                    path
                )));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Hierarchy depth of this path. The root is depth 0, a root-level
    /// container is depth 1, and so on.
    pub fn depth(&self) -> u32 {
        self.segments.len() as u32
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All non-root prefixes of this path, shortest first.
    ///
    /// `a/b/c` yields `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> Vec<Self> {
        (1..=self.segments.len())
            .map(|n| Self {
                segments: self.segments[..n].to_vec(),
            })
            .collect()
    }

    /// Slash-joined form without a leading slash; the key format used by
    /// the tree store and the location codec.
    pub fn join(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl From<&str> for ContainerPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_join_round_trip() {
        let path = ContainerPath::parse("mydb/public");
        assert_eq!(path.segments, vec!["mydb", "public"]);
        assert_eq!(path.join(), "mydb/public");
        assert_eq!(path.to_string(), "/mydb/public");
    }

    #[test]
    fn test_parse_ignores_empty_segments() {
        let path = ContainerPath::parse("/mydb//public/");
        assert_eq!(path.segments, vec!["mydb", "public"]);
    }

    #[test]
    fn test_parse_strict_rejects_empty_segments() {
        assert!(ContainerPath::parse_strict("mydb//public").is_err());
        assert!(ContainerPath::parse_strict("mydb/ /public").is_err());
    }

    #[test]
    fn test_parse_strict_tolerates_outer_slashes() {
        let path = ContainerPath::parse_strict("/mydb/public/").unwrap();
        assert_eq!(path.segments, vec!["mydb", "public"]);
        assert!(ContainerPath::parse_strict("").unwrap().is_root());
        assert!(ContainerPath::parse_strict("/").unwrap().is_root());
    }

    #[test]
    fn test_root_has_no_parent() {
        assert!(ContainerPath::root().parent().is_none());
        assert_eq!(ContainerPath::root().depth(), 0);
    }

    #[test]
    fn test_prefixes_shortest_first() {
        let path = ContainerPath::parse("a/b/c");
        let prefixes = path.prefixes();
        assert_eq!(prefixes.len(), 3);
        assert_eq!(prefixes[0].join(), "a");
        assert_eq!(prefixes[1].join(), "a/b");
        assert_eq!(prefixes[2].join(), "a/b/c");
    }

    #[test]
    fn test_child_extends_path() {
        let path = ContainerPath::parse("mydb").child("public");
        assert_eq!(path.join(), "mydb/public");
        assert_eq!(path.name(), Some("public"));
        assert_eq!(path.parent().unwrap().join(), "mydb");
    }
}
