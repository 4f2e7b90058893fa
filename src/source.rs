use crate::constants::{is_valid_lang_tag, BULLETIN_EXTENSION};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Read access to the per-language bulletin documents.
///
/// Implementations must return fresh content on every call; nothing above
/// this layer caches.
#[async_trait]
pub trait BulletinSource: Send + Sync {
    async fn read(&self, lang: &str) -> Result<String>;
}

/// Bulletins stored as `<dir>/<lang>.html`
pub struct FsBulletinSource {
    dir: PathBuf,
}

impl FsBulletinSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", lang, BULLETIN_EXTENSION))
    }
}

#[async_trait]
impl BulletinSource for FsBulletinSource {
    async fn read(&self, lang: &str) -> Result<String> {
        if !is_valid_lang_tag(lang) {
            return Err(MarketError::SourceUnavailable {
                lang: lang.to_string(),
                reason: "invalid language tag".to_string(),
            });
        }

        let path = self.path_for(lang);
        debug!("Reading bulletin {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MarketError::SourceUnavailable {
                lang: lang.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

/// In-memory bulletins for development/testing
#[derive(Default)]
pub struct InMemoryBulletinSource {
    documents: HashMap<String, String>,
}

impl InMemoryBulletinSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, lang: &str, markup: impl Into<String>) -> Self {
        self.documents.insert(lang.to_string(), markup.into());
        self
    }

    /// Reads one bulletin from `reader` (e.g. stdin) and registers it under `lang`.
    pub async fn from_reader<R>(lang: &str, mut reader: R) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut markup = String::new();
        reader.read_to_string(&mut markup).await?;
        debug!("Read {} bytes of bulletin markup for '{}'", markup.len(), lang);
        Ok(Self::new().with_document(lang, markup))
    }
}

#[async_trait]
impl BulletinSource for InMemoryBulletinSource {
    async fn read(&self, lang: &str) -> Result<String> {
        self.documents
            .get(lang)
            .cloned()
            .ok_or_else(|| MarketError::SourceUnavailable {
                lang: lang.to_string(),
                reason: "no bulletin registered".to_string(),
            })
    }
}
