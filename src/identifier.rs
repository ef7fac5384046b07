//! Stable cache keys derived from resource paths

use crate::error::{EmbedCacheError, EmbedCacheResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Key of one cache entry: the resource's path relative to the project root.
///
/// Components are always joined with `/`, so the same tree produces the same
/// keys on every platform. Keys are path-based, not content-based: a renamed
/// file is a new entry and the old one stays until pruned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap an already-normalized key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive the identifier of `resource` relative to `root`.
    ///
    /// Fails if `resource` is not located under `root`, or if a component is
    /// not UTF-8 and so could not be resolved back to the same file.
    pub fn from_resource(root: &Path, resource: &Path) -> EmbedCacheResult<Self> {
        let relative = resource
            .strip_prefix(root)
            .map_err(|_| EmbedCacheError::PathInvalid {
                path: resource.to_path_buf(),
                reason: format!("not inside {}", root.display()),
            })?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => parts.push(part.to_string()),
                    None => {
                        return Err(EmbedCacheError::PathInvalid {
                            path: resource.to_path_buf(),
                            reason: "file name is not valid UTF-8".to_string(),
                        })
                    }
                },
                Component::CurDir => {}
                _ => {
                    return Err(EmbedCacheError::PathInvalid {
                        path: resource.to_path_buf(),
                        reason: "relative path escapes the root".to_string(),
                    })
                }
            }
        }

        if parts.is_empty() {
            return Err(EmbedCacheError::PathInvalid {
                path: resource.to_path_buf(),
                reason: "resource is the root itself".to_string(),
            });
        }

        Ok(Self(parts.join("/")))
    }

    /// Resolve the identifier back to a path under `root`
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_root() {
        let id = Identifier::from_resource(
            Path::new("/project"),
            Path::new("/project/src/components/App.tsx"),
        )
        .unwrap();
        assert_eq!(id.as_str(), "src/components/App.tsx");
    }

    #[test]
    fn top_level_file() {
        let id = Identifier::from_resource(Path::new("/project"), Path::new("/project/a.ts"))
            .unwrap();
        assert_eq!(id.to_string(), "a.ts");
    }

    #[test]
    fn outside_root_is_rejected() {
        let err = Identifier::from_resource(Path::new("/project"), Path::new("/other/a.ts"))
            .unwrap_err();
        assert!(matches!(err, EmbedCacheError::PathInvalid { .. }));
    }

    #[test]
    fn root_itself_is_rejected() {
        assert!(Identifier::from_resource(Path::new("/project"), Path::new("/project")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("/project");
        let path = root.join(OsStr::from_bytes(b"bad\xff.ts"));
        let err = Identifier::from_resource(root, &path).unwrap_err();
        assert!(matches!(err, EmbedCacheError::PathInvalid { .. }));
    }

    #[test]
    fn resolve_round_trips() {
        let root = Path::new("/project");
        let path = root.join("src").join("a.ts");
        let id = Identifier::from_resource(root, &path).unwrap();
        assert_eq!(id.resolve(root), path);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = Identifier::new("src/a.ts");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"src/a.ts\"");
    }
}
