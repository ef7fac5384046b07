//! Collaborators consumed by the computation cache

use crate::error::BoxError;
use crate::identifier::Identifier;
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;

/// Supplies the raw content of a resource
#[async_trait]
pub trait ContentLoader: Send + Sync {
    async fn load(&self, id: &Identifier) -> std::io::Result<String>;
}

/// Computes the derived value from a resource's content.
///
/// May take arbitrarily long and may fail; the cache imposes no timeout.
#[async_trait]
pub trait Producer<V>: Send + Sync {
    async fn produce(&self, content: String, id: &Identifier) -> Result<V, BoxError>;
}

/// Reads resources as UTF-8 files under a root directory
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ContentLoader for FsLoader {
    async fn load(&self, id: &Identifier) -> std::io::Result<String> {
        tokio::fs::read_to_string(id.resolve(&self.root)).await
    }
}

/// Adapts an async closure `(content, identifier) -> Result<V, E>` into a
/// [`Producer`]
pub struct FnProducer<F>(pub F);

#[async_trait]
impl<V, E, F, Fut> Producer<V> for FnProducer<F>
where
    V: Send + 'static,
    E: Into<BoxError> + 'static,
    F: Fn(String, Identifier) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    async fn produce(&self, content: String, id: &Identifier) -> Result<V, BoxError> {
        (self.0)(content, id.clone()).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fs_loader_reads_relative_to_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/a.ts"), "export const a = 1;").unwrap();

        let loader = FsLoader::new(temp.path());
        let content = loader.load(&Identifier::new("src/a.ts")).await.unwrap();
        assert_eq!(content, "export const a = 1;");
    }

    #[tokio::test]
    async fn fs_loader_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let loader = FsLoader::new(temp.path());
        let err = loader.load(&Identifier::new("nope.ts")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn fn_producer_passes_content_and_identifier() {
        let producer = FnProducer(|content: String, id: Identifier| async move {
            Ok::<_, std::io::Error>(format!("{}:{}", id, content.len()))
        });
        let value = producer
            .produce("abcd".to_string(), &Identifier::new("x.ts"))
            .await
            .unwrap();
        assert_eq!(value, "x.ts:4");
    }
}
