//! Integration tests for the analysis publish pipeline

mod common;

use async_trait::async_trait;
use common::{
    context_builder, sample_context, sample_record, test_config, AnalysisFixture, InMemoryStore,
    StaticRegistry, BARCODE,
};
use seqferry::adapters::store::{LocalObjectStore, ObjectId, ObjectStore};
use seqferry::core::publish::{
    read_marker, AnalysisPublisher, PublishOutcome, PublishRequest, PublishResult,
};
use seqferry::core::staging::steps::Copy;
use seqferry::core::staging::{StagingStep, StagingTransformer, StepContext};
use seqferry::domain::{MetadataAttribute, SeqferryError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn publisher(
    fixture: &AnalysisFixture,
    store: &Arc<InMemoryStore>,
    registry: StaticRegistry,
) -> AnalysisPublisher {
    AnalysisPublisher::new(&test_config(&fixture.scratch), store.clone(), Arc::new(registry))
        .unwrap()
}

const BAM: &str = "m84047.hifi_reads.bc2001.bam";
const PBI: &str = "m84047.hifi_reads.bc2001.bam.pbi";
const REPORT: &str = "m84047.ccs_report.json";

#[tokio::test]
async fn test_complete_publish_writes_marker() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 3, 0));
    assert_eq!(summary.outcome, PublishOutcome::Complete);
    assert_eq!(summary.destination, fixture.destination());
    assert_eq!(
        store.object_names(),
        vec![fixture.remote(REPORT), fixture.remote(BAM), fixture.remote(PBI)]
    );
    assert_eq!(store.object(&fixture.remote(BAM)).unwrap(), b"BAM\x01reads");

    let marker = read_marker(&fixture.marker_path()).await.unwrap();
    assert_eq!(marker.files_processed, 3);
    assert_eq!(marker.destination, fixture.destination());
}

#[tokio::test]
async fn test_sequence_and_non_sequence_metadata() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    let bam = store.metadata_of(&fixture.remote(BAM)).unwrap();
    assert_eq!(bam.first(MetadataAttribute::Target), Some("1"));
    assert_eq!(bam.first(MetadataAttribute::Run), Some(common::RUN_NAME));
    assert_eq!(bam.first(MetadataAttribute::Well), Some("B1"));
    assert_eq!(bam.first(MetadataAttribute::TagId), Some(BARCODE));
    assert_eq!(bam.first(MetadataAttribute::DataLevel), Some("secondary"));
    assert_eq!(bam.first(MetadataAttribute::SampleName), Some("DTOL13000001"));
    assert_eq!(bam.first(MetadataAttribute::StudyId), Some("5901"));
    let product = bam.first(MetadataAttribute::ProductId).unwrap();
    assert_eq!(product.len(), 64);

    let pbi = store.metadata_of(&fixture.remote(PBI)).unwrap();
    assert_eq!(pbi.first(MetadataAttribute::Target), Some("0"));
    assert_eq!(pbi.first(MetadataAttribute::ProductId), Some(product));
    assert!(!pbi.contains(MetadataAttribute::SampleName));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));
    let context = sample_context();

    publisher
        .publish_context(&context, &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();
    let interactions = store.interactions();

    let summary = publisher
        .publish_context(&context, &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(0, 0, 0));
    assert_eq!(summary.outcome, PublishOutcome::AlreadyLoaded);
    assert_eq!(store.interactions(), interactions);
}

#[tokio::test]
async fn test_missing_barcode_touches_nothing() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(StaticRegistry::new(vec![sample_record()]));
    let publisher = AnalysisPublisher::new(
        &test_config(&fixture.scratch),
        store.clone(),
        registry.clone(),
    )
    .unwrap();
    let context = context_builder().build().unwrap();

    let result = publisher
        .publish_context(&context, &fixture.analysis_dir, &fixture.runfolder)
        .await;

    assert!(matches!(result, Err(SeqferryError::Configuration(_))));
    assert_eq!(store.interactions(), 0);
    assert_eq!(registry.queries(), 0);
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_single_cell_needs_no_barcode() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let mut record = sample_record();
    record.tag_id = None;
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![record]));
    let context = context_builder().single_cell(true).build().unwrap();

    let summary = publisher
        .publish_context(&context, &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 3, 0));
    let bam = store.metadata_of(&fixture.remote(BAM)).unwrap();
    assert!(!bam.contains(MetadataAttribute::TagId));
}

#[tokio::test]
async fn test_registry_miss_skips_sequence_files() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::empty());

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 2, 0));
    assert_eq!(summary.outcome, PublishOutcome::Partial);
    assert!(store.object(&fixture.remote(BAM)).is_none());
    assert!(store.object(&fixture.remote(PBI)).is_some());
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_ambiguous_registry_match_is_fatal() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let mut other = sample_record();
    other.sample_name = Some("DTOL13000002".to_string());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record(), other]));

    let result = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await;

    assert!(matches!(result, Err(SeqferryError::Configuration(_))));
    assert!(store.object_names().is_empty());
}

#[tokio::test]
async fn test_registry_outage_counts_errors() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::unavailable());

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 2, 1));
    assert!(!fixture.marker_path().exists());
}

struct FailOnBam;

#[async_trait]
impl StagingStep for FailOnBam {
    fn name(&self) -> &'static str {
        "fail-on-bam"
    }

    async fn apply(&self, current: &Path, _ctx: &StepContext) -> seqferry::domain::Result<PathBuf> {
        if current.to_string_lossy().ends_with(".bam") {
            return Err(SeqferryError::Staging("no space left on device".to_string()));
        }
        Ok(current.to_path_buf())
    }
}

#[tokio::test]
async fn test_staging_failure_fails_only_its_batch() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let transformer = StagingTransformer::with_steps(
        vec![Box::new(Copy::new(0)), Box::new(FailOnBam)],
        Duration::from_secs(30),
    );
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]))
        .with_transformer(transformer);

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 2, 1));
    assert_eq!(store.object_names(), vec![fixture.remote(REPORT), fixture.remote(PBI)]);
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_collection_failure_fails_everything_staged() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::failing_collections());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 0, 3));
    assert_eq!(summary.outcome, PublishOutcome::Partial);
    assert!(store.object_names().is_empty());
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_put_failure_is_counted_and_batch_continues() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::failing_puts(".pbi"));
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(3, 2, 1));
    assert!(store.object(&fixture.remote(REPORT)).is_some());
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_single_published_file_does_not_write_marker() {
    let fixture = AnalysisFixture::single_file();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(1, 1, 0));
    assert_eq!(summary.outcome, PublishOutcome::Unmarked);
    assert!(summary.is_successful());
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_retry_replaces_metadata_of_republished_file() {
    let fixture = AnalysisFixture::single_file();
    let store = Arc::new(
        LocalObjectStore::open(fixture.root.path().join("store"))
            .await
            .unwrap(),
    );
    let config = test_config(&fixture.scratch);
    let publish_with_sample = |sample: &str| {
        let mut record = sample_record();
        record.sample_name = Some(sample.to_string());
        AnalysisPublisher::new(
            &config,
            store.clone(),
            Arc::new(StaticRegistry::new(vec![record])),
        )
        .unwrap()
    };

    for sample in ["DTOL13000001", "DTOL13000002"] {
        let summary = publish_with_sample(sample)
            .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
            .await
            .unwrap();
        assert_eq!(summary.result, PublishResult::new(1, 1, 0));
    }

    let record = store
        .metadata(&ObjectId::new(fixture.remote(BAM)))
        .await
        .unwrap()
        .unwrap();
    let samples: Vec<&str> = record
        .values(MetadataAttribute::SampleName)
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(samples, vec!["DTOL13000002"]);
    let runs = record.values(MetadataAttribute::Run).unwrap();
    assert_eq!(runs.len(), 1);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]))
        .with_dry_run(true);

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.outcome, PublishOutcome::DryRun);
    assert_eq!(summary.result, PublishResult::new(3, 3, 0));
    assert_eq!(store.interactions(), 0);
    assert!(!fixture.marker_path().exists());
}

#[tokio::test]
async fn test_fasta_is_compressed_before_upload() {
    let fixture = AnalysisFixture::new();
    fixture.write("m84047.hifi_reads.bc2001.fasta", b">read1\nACGT\n");
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish_context(&sample_context(), &fixture.analysis_dir, &fixture.runfolder)
        .await
        .unwrap();

    assert_eq!(summary.result, PublishResult::new(4, 4, 0));
    let gz = store
        .object(&fixture.remote("m84047.hifi_reads.bc2001.fasta.gz"))
        .unwrap();
    assert_eq!(&gz[..2], &[0x1f, 0x8b]);
}

const METADATA_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<pbds:ConsensusReadSet xmlns:pbds="http://pacificbiosciences.com/PacBioDatasets.xsd"
    xmlns:pbmeta="http://pacificbiosciences.com/PacBioCollectionMetadata.xsd" Tags="ccs">
  <pbds:DataSetMetadata>
    <pbmeta:Collections>
      <pbmeta:CollectionMetadata Context="m84047_230404_172822_s1">
        <pbmeta:RunDetails><pbmeta:Name>TRACTION-RUN-1140</pbmeta:Name></pbmeta:RunDetails>
        <pbmeta:WellSample Name="DTOL">
          <pbmeta:WellName>B01</pbmeta:WellName>
          <pbsample:BioSamples xmlns:pbsample="http://pacificbiosciences.com/PacBioSampleInfo.xsd">
            <pbsample:BioSample Name="DTOL13000001">
              <pbsample:DNABarcodes>
                <pbsample:DNABarcode Name="bc2001--bc2001"/>
              </pbsample:DNABarcodes>
            </pbsample:BioSample>
          </pbsample:BioSamples>
        </pbmeta:WellSample>
      </pbmeta:CollectionMetadata>
    </pbmeta:Collections>
  </pbds:DataSetMetadata>
</pbds:ConsensusReadSet>"#;

#[tokio::test]
async fn test_publish_discovers_sidecar() {
    let fixture = AnalysisFixture::new();
    fixture.write("m84047.consensusreadset.xml", METADATA_XML.as_bytes());
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let summary = publisher
        .publish(&PublishRequest {
            analysis_dir: fixture.analysis_dir.clone(),
            runfolder: fixture.runfolder.clone(),
            analysis_id: common::ANALYSIS_ID.to_string(),
            metadata_xml: None,
            primers_report: None,
        })
        .await
        .unwrap();

    // the descriptor itself is published alongside the data
    assert_eq!(summary.result, PublishResult::new(4, 4, 0));
    assert!(store
        .object(&fixture.remote("m84047.consensusreadset.xml"))
        .is_some());
    assert!(fixture.marker_path().exists());
}

#[tokio::test]
async fn test_publish_without_sidecar_is_fatal() {
    let fixture = AnalysisFixture::new();
    let store = Arc::new(InMemoryStore::new());
    let publisher = publisher(&fixture, &store, StaticRegistry::new(vec![sample_record()]));

    let result = publisher
        .publish(&PublishRequest {
            analysis_dir: fixture.analysis_dir.clone(),
            runfolder: fixture.runfolder.clone(),
            analysis_id: common::ANALYSIS_ID.to_string(),
            metadata_xml: None,
            primers_report: None,
        })
        .await;

    assert!(matches!(result, Err(SeqferryError::Sidecar(_))));
    assert_eq!(store.interactions(), 0);
}
