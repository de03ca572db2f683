//! Catalog metadata collaborator interface.
//!
//! Metadata (synopsis, cover image) is cosmetic to the core: a provider
//! failure never aborts a search or recommendation loop. The caller owns
//! pacing, since the upstream catalog API rate-limits bursts.

use async_trait::async_trait;
use data_loader::AnimeId;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

/// Per-title metadata. Fields fail independently upstream, so each is
/// optional on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeMetadata {
    pub synopsis: Option<String>,
    pub cover_image: Option<Vec<u8>>,
}

#[derive(Error, Debug)]
pub enum MetadataError {
    /// The provider could not serve this title at all
    #[error("metadata provider unavailable for anime {id}: {reason}")]
    Upstream { id: AnimeId, reason: String },
}

/// External catalog metadata source.
///
/// Implementations fetch what they can: a missing synopsis or cover image
/// is an absent field, not an error. `Upstream` is reserved for whole-title
/// failures, and callers are expected to absorb even those.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, id: AnimeId) -> Result<AnimeMetadata, MetadataError>;
}

/// Paces provider calls: after every `burst` calls, sleep for `pause`.
///
/// Matches the upstream catalog API limit of a few calls per second. One
/// pacer spans one fetch loop; reuse across loops carries the count over.
pub struct CallPacer {
    burst: usize,
    pause: Duration,
    calls: usize,
}

impl CallPacer {
    pub fn new(burst: usize, pause: Duration) -> Self {
        Self {
            burst,
            pause,
            calls: 0,
        }
    }

    /// Call before each provider request.
    pub async fn pace(&mut self) {
        if self.calls == self.burst {
            sleep(self.pause).await;
            self.calls = 0;
        }
        self.calls += 1;
    }
}

impl Default for CallPacer {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1500))
    }
}

/// Fetch metadata for every id, paced, absorbing per-title failures.
///
/// A failing title yields empty metadata and the loop continues; output
/// order matches input order.
pub async fn fetch_all(
    provider: &dyn MetadataProvider,
    ids: &[AnimeId],
    pacer: &mut CallPacer,
) -> Vec<(AnimeId, AnimeMetadata)> {
    let mut results = Vec::with_capacity(ids.len());
    for &id in ids {
        pacer.pace().await;
        let metadata = match provider.fetch_metadata(id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(anime_id = id, error = %e, "metadata fetch failed, continuing without");
                AnimeMetadata::default()
            }
        };
        results.push((id, metadata));
    }
    results
}
