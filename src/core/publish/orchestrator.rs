//! Analysis publisher - main orchestrator for publishing one analysis
//!
//! Drives the per-analysis state machine:
//!
//! 1. Load the analysis context from the sidecar descriptors
//! 2. Skip if the completion marker exists
//! 3. Require a barcode unless the library is single-cell
//! 4. Classify the analysis directory
//! 5. Stage sequence and non-sequence files as two independent batches
//! 6. Resolve the registry record for sequence files
//! 7. Create the destination collection and publish each file
//! 8. Write the marker when every file was published

use super::marker::{marker_exists, write_marker, PublishMarker};
use super::result::PublishResult;
use super::summary::{PublishOutcome, PublishSummary};
use crate::adapters::registry::RunRegistry;
use crate::adapters::store::{ObjectId, ObjectStore};
use crate::config::SeqferryConfig;
use crate::core::classify::FileClassifier;
use crate::core::metadata::{primer_for, product_id, MetadataResolver, RegistryMatch};
use crate::core::sidecar::{load_analysis_context, SidecarLocator};
use crate::core::staging::StagingTransformer;
use crate::domain::analysis::AnalysisContext;
use crate::domain::errors::{SeqferryError, StoreError};
use crate::domain::ids::ProductId;
use crate::domain::metadata::{DataLevel, MetadataAttribute, MetadataRecord};
use crate::domain::source_file::SourceFile;
use crate::domain::Result;
use crate::{log_error_with_context, log_file_skipped, log_publish_complete, log_publish_start};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// What to publish
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Directory holding the analysis output files
    pub analysis_dir: PathBuf,

    /// Run folder that receives the completion marker
    pub runfolder: PathBuf,

    /// Secondary analysis identifier
    pub analysis_id: String,

    /// Explicit metadata XML (otherwise discovered in `analysis_dir`)
    pub metadata_xml: Option<PathBuf>,

    /// Explicit primers report (otherwise discovered in `analysis_dir`)
    pub primers_report: Option<PathBuf>,
}

/// A staged file ready for upload
struct StagedFile<'a> {
    source: &'a SourceFile,
    staged: PathBuf,
}

/// Registry outcome shared by every sequence file of the analysis
enum Provenance {
    Resolved(MetadataRecord),
    Missing,
    Failed(String),
}

/// Publishes one analysis into the object store
pub struct AnalysisPublisher {
    store: Arc<dyn ObjectStore>,
    resolver: MetadataResolver,
    classifier: FileClassifier,
    locator: SidecarLocator,
    transformer: StagingTransformer,
    scratch_root: PathBuf,
    dest_collection: String,
    dry_run: bool,
}

impl AnalysisPublisher {
    /// Create a new analysis publisher
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if a configured pattern is invalid
    pub fn new(
        config: &SeqferryConfig,
        store: Arc<dyn ObjectStore>,
        registry: Arc<dyn RunRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            resolver: MetadataResolver::new(registry),
            classifier: FileClassifier::for_analysis(&config.classification)?,
            locator: SidecarLocator::from_config(&config.sidecar)?,
            transformer: StagingTransformer::new(&config.staging),
            scratch_root: config.staging.scratch_root(),
            dest_collection: config.store.dest_collection.clone(),
            dry_run: config.application.dry_run,
        })
    }

    /// Override dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the staging pipeline
    pub fn with_transformer(mut self, transformer: StagingTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Publishes the analysis described by `request`
    ///
    /// # Errors
    ///
    /// Returns an error for sidecar, configuration and marker failures.
    /// Per-file and per-batch failures are counted in the summary instead.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishSummary> {
        let paths = self
            .locator
            .locate(
                &request.analysis_dir,
                request.metadata_xml.as_deref(),
                request.primers_report.as_deref(),
            )
            .await?;
        let context = load_analysis_context(&paths, &request.analysis_id).await?;

        self.publish_context(&context, &request.analysis_dir, &request.runfolder)
            .await
    }

    /// Publishes an analysis whose context is already known
    ///
    /// # Errors
    ///
    /// Same as [`AnalysisPublisher::publish`]
    pub async fn publish_context(
        &self,
        context: &AnalysisContext,
        analysis_dir: &Path,
        runfolder: &Path,
    ) -> Result<PublishSummary> {
        let start_time = Instant::now();
        let analysis_id = context.analysis_id.as_str();
        let marker_path = context.marker_path(runfolder);

        if marker_exists(&marker_path).await {
            tracing::info!(
                analysis_id = %analysis_id,
                marker = %marker_path.display(),
                "Analysis already loaded; skipping"
            );
            return Ok(PublishSummary::new(
                analysis_id,
                "",
                PublishResult::default(),
                PublishOutcome::AlreadyLoaded,
            )
            .with_duration(start_time.elapsed()));
        }

        if !context.single_cell && context.barcode.is_none() {
            return Err(SeqferryError::Configuration(format!(
                "Analysis {} (movie {}) has no barcode and is not single-cell",
                analysis_id, context.movie_name
            )));
        }

        log_publish_start!(analysis_id, analysis_dir.display());

        let partition = self.classifier.classify(analysis_dir).await?;
        for excluded in &partition.excluded {
            tracing::debug!(file = %excluded.base_name(), "Excluded by pattern");
        }

        let scratch = tempfile::Builder::new()
            .prefix("seqferry-")
            .tempdir_in(&self.scratch_root)
            .map_err(|e| {
                SeqferryError::Io(format!(
                    "Cannot create scratch directory in {}: {}",
                    self.scratch_root.display(),
                    e
                ))
            })?;

        let mut result = PublishResult::default();
        let sequence = self
            .stage_batch(
                &scratch.path().join("sequence"),
                &partition.sequence,
                context,
                &mut result,
            )
            .await;
        let non_sequence = self
            .stage_batch(
                &scratch.path().join("non_sequence"),
                &partition.non_sequence,
                context,
                &mut result,
            )
            .await;

        let provenance = if sequence.is_empty() {
            Provenance::Missing
        } else {
            self.resolve_provenance(context).await?
        };

        let destination = context.destination(&self.dest_collection);
        if !self.dry_run {
            if let Err(e) = self.store.create_collection(&destination).await {
                log_error_with_context!(&e, format!("Cannot create collection {destination}"));
                result.merge(PublishResult::failed_files(sequence.len() + non_sequence.len()));
                return Ok(self.finish(context, &destination, result, start_time));
            }
        }

        let pid = product_id(
            &context.run_name,
            &context.well_label,
            context.tag_id(),
            context.plate_number,
        );

        for file in &sequence {
            let outcome = match &provenance {
                Provenance::Resolved(secondary) => {
                    let mut record = self.primary_record(context, &pid, file.source, true);
                    record.merge(secondary.clone());
                    self.publish_file(file, &destination, &record).await
                }
                Provenance::Missing => {
                    log_file_skipped!(file.source.base_name(), "no registry record");
                    PublishResult::skipped()
                }
                Provenance::Failed(reason) => {
                    tracing::error!(
                        file = %file.source.base_name(),
                        reason = %reason,
                        "Registry lookup failed"
                    );
                    PublishResult::failed()
                }
            };
            result.merge(outcome);
        }

        for file in &non_sequence {
            let record = self.primary_record(context, &pid, file.source, false);
            result.merge(self.publish_file(file, &destination, &record).await);
        }

        if !self.dry_run && result.qualifies_for_marker() {
            let marker = PublishMarker::new(context, &destination, &result);
            write_marker(&marker_path, &marker).await?;
        }

        Ok(self.finish(context, &destination, result, start_time))
    }

    async fn stage_batch<'a>(
        &self,
        batch_dir: &Path,
        files: &'a [SourceFile],
        context: &AnalysisContext,
        result: &mut PublishResult,
    ) -> Vec<StagedFile<'a>> {
        match self.transformer.stage(batch_dir, files, context).await {
            Ok(staged) => files
                .iter()
                .zip(staged)
                .map(|(source, staged)| StagedFile { source, staged })
                .collect(),
            Err(e) => {
                log_error_with_context!(&e, format!("Staging {} files failed", files.len()));
                result.merge(PublishResult::failed_batch(files.len()));
                Vec::new()
            }
        }
    }

    async fn resolve_provenance(&self, context: &AnalysisContext) -> Result<Provenance> {
        let lookup = self
            .resolver
            .lookup_registry(
                &context.run_name,
                &context.well_label,
                context.tag_id(),
                context.plate_number,
            )
            .await;

        match lookup {
            Ok(RegistryMatch::Found(record)) => Ok(Provenance::Resolved(
                self.resolver.resolve_secondary(std::slice::from_ref(&*record)),
            )),
            Ok(RegistryMatch::NotFound) => Ok(Provenance::Missing),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log_error_with_context!(&e, "Run registry lookup failed");
                Ok(Provenance::Failed(e.to_string()))
            }
        }
    }

    fn primary_record(
        &self,
        context: &AnalysisContext,
        pid: &ProductId,
        source: &SourceFile,
        is_target: bool,
    ) -> MetadataRecord {
        let mut extra = MetadataRecord::new();
        if let Some(primer) = primer_for(&source.base_name(), &context.primers) {
            extra.insert(MetadataAttribute::Primer, primer);
        }
        self.resolver
            .resolve_primary(context, DataLevel::Secondary, pid, &extra, is_target)
    }

    async fn publish_file(
        &self,
        file: &StagedFile<'_>,
        destination: &str,
        record: &MetadataRecord,
    ) -> PublishResult {
        let name = file
            .staged
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.source.base_name());
        let remote = format!("{destination}/{name}");

        if self.dry_run {
            tracing::info!(
                remote = %remote,
                attributes = record.len(),
                "Dry run: would publish file"
            );
            return PublishResult::published();
        }

        match self.put_with_metadata(&file.staged, &remote, record).await {
            Ok(id) => {
                tracing::debug!(
                    object = %id,
                    source = %file.source.path().display(),
                    "Published file"
                );
                PublishResult::published()
            }
            Err(e) => {
                log_error_with_context!(&e, format!("Failed to publish {remote}"));
                PublishResult::failed()
            }
        }
    }

    async fn put_with_metadata(
        &self,
        local: &Path,
        remote: &str,
        record: &MetadataRecord,
    ) -> std::result::Result<ObjectId, StoreError> {
        let id = self.store.put_object(local, remote).await?;
        self.store.attach_metadata(&id, record).await?;
        Ok(id)
    }

    fn finish(
        &self,
        context: &AnalysisContext,
        destination: &str,
        result: PublishResult,
        start_time: Instant,
    ) -> PublishSummary {
        let outcome = if self.dry_run {
            PublishOutcome::DryRun
        } else if result.qualifies_for_marker() {
            PublishOutcome::Complete
        } else if result.is_fully_published() {
            PublishOutcome::Unmarked
        } else {
            PublishOutcome::Partial
        };

        let duration = start_time.elapsed();
        log_publish_complete!(context.analysis_id, result, duration);

        let summary =
            PublishSummary::new(context.analysis_id.as_str(), destination, result, outcome)
                .with_duration(duration);
        summary.log_summary();
        summary
    }
}
