//! Cover Service - request pipeline
//!
//! Acquire bytes → normalize on a blocking worker → persist the artifact →
//! point the business record at it. Any failure aborts the remaining stages;
//! nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{CoverNormalizer, ImageFetcher};
use crate::error::Result;
use crate::storage::{artifact_key, ObjectStore, RecordStore};

use super::types::*;

/// Cover normalization service
pub struct CoverService<O: ObjectStore, R: RecordStore> {
    normalizer: Arc<CoverNormalizer>,
    fetcher: ImageFetcher,
    objects: Arc<O>,
    records: Arc<R>,
    folder: String,
}

impl<O: ObjectStore, R: RecordStore> CoverService<O, R> {
    pub fn new(
        normalizer: Arc<CoverNormalizer>,
        fetcher: ImageFetcher,
        objects: Arc<O>,
        records: Arc<R>,
        folder: &str,
    ) -> Self {
        Self {
            normalizer,
            fetcher,
            objects,
            records,
            folder: folder.to_string(),
        }
    }

    /// Build the service from configuration with the given collaborators
    pub fn from_config(config: &Config, objects: Arc<O>, records: Arc<R>) -> Result<Self> {
        let fetcher = ImageFetcher::new(&config.fetch, &config.limits)?;
        Ok(Self::new(
            Arc::new(CoverNormalizer::from_config(config)),
            fetcher,
            objects,
            records,
            &config.images.folder,
        ))
    }

    pub fn objects(&self) -> &Arc<O> {
        &self.objects
    }

    pub fn records(&self) -> &Arc<R> {
        &self.records
    }

    /// Largest accepted source payload in bytes
    pub fn max_input_bytes(&self) -> usize {
        self.fetcher.max_bytes()
    }

    /// Normalize `image_data` and store it as the cover of `identifier`
    pub async fn normalize(&self, image_data: &str, identifier: &str) -> Result<NormalizeResult> {
        let start = Instant::now();
        let mut stage = Stage::Acquiring;
        enter(identifier, &mut stage, Stage::Acquiring);

        let result = self.run(image_data, identifier, &mut stage, start).await;
        if let Err(e) = &result {
            warn!(
                "Cover {} failed while {} [{}]: {}",
                identifier,
                stage.as_str(),
                e.kind(),
                e
            );
            enter(identifier, &mut stage, Stage::Failed);
        }
        result
    }

    /// Leaves `stage` at the stage that failed, or at `Done`
    async fn run(
        &self,
        image_data: &str,
        identifier: &str,
        stage: &mut Stage,
        start: Instant,
    ) -> Result<NormalizeResult> {
        let bytes = self.fetcher.acquire(image_data).await?;
        debug!("Cover {}: acquired {} bytes", identifier, bytes.len());

        enter(identifier, stage, Stage::Decoding);
        let normalizer = self.normalizer.clone();
        let image = tokio::task::spawn_blocking(move || normalizer.decode(&bytes)).await??;

        enter(identifier, stage, Stage::Cropping);
        let (crop, target) = self.normalizer.plan(&image);

        enter(identifier, stage, Stage::CompressLoop);
        let normalizer = self.normalizer.clone();
        let outcome =
            tokio::task::spawn_blocking(move || normalizer.compress(&image, crop, target)).await??;
        if outcome.stop.is_best_effort() {
            warn!(
                "Cover {}: emitting {} bytes above ceiling ({:?})",
                identifier,
                outcome.data.len(),
                outcome.stop
            );
        }

        enter(identifier, stage, Stage::Persisting);
        let encoder = self.normalizer.encoder();
        let key = artifact_key(&self.folder, identifier, encoder.extension());
        self.objects
            .put(&key, &outcome.data, encoder.content_type(), true)
            .await?;
        let url = self.objects.public_url(&key).await?;

        enter(identifier, stage, Stage::UpdatingRecord);
        self.records.update_record_image(identifier, &url).await?;
        enter(identifier, stage, Stage::Done);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Cover {} stored at {} ({} bytes, {}x{} q{}, {} passes) in {}ms",
            identifier,
            key,
            outcome.data.len(),
            outcome.width,
            outcome.height,
            outcome.quality,
            outcome.iterations,
            elapsed_ms
        );

        Ok(NormalizeResult {
            url,
            key,
            bytes: outcome.data.len(),
            width: outcome.width,
            height: outcome.height,
            quality: outcome.quality,
            iterations: outcome.iterations,
            stop: outcome.stop,
            elapsed_ms,
        })
    }

    /// Get health status
    pub fn health(&self) -> HealthResult {
        HealthResult {
            healthy: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: self.normalizer.encoder().content_type().to_string(),
        }
    }
}

fn enter(identifier: &str, stage: &mut Stage, next: Stage) {
    *stage = next;
    debug!("Cover {}: {}", identifier, next.as_str());
}
