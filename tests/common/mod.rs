//! Shared test doubles and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use seqferry::adapters::registry::{RegistryQuery, RegistryRecord, RegistryResult, RunRegistry};
use seqferry::adapters::store::{ObjectId, ObjectStore, StoreResult};
use seqferry::config::{parse_config, SeqferryConfig};
use seqferry::domain::analysis::{AnalysisContext, AnalysisContextBuilder};
use seqferry::domain::{MetadataRecord, RegistryError, StoreError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

pub const RUN_NAME: &str = "TRACTION-RUN-1140";
pub const MOVIE_NAME: &str = "m84047_230404_172822_s1";
pub const ANALYSIS_ID: &str = "0000021";
pub const BARCODE: &str = "bc2001--bc2001";
pub const DEST_COLLECTION: &str = "/seq/pacbio";

/// Object store held in memory
///
/// Every trait call bumps an interaction counter. Failures can be injected
/// for collection creation and for uploads whose remote path contains a
/// given fragment.
#[derive(Default)]
pub struct InMemoryStore {
    interactions: AtomicUsize,
    collections: Mutex<BTreeSet<String>>,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    metadata: Mutex<BTreeMap<String, MetadataRecord>>,
    fail_collections: bool,
    fail_puts_matching: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_collections() -> Self {
        Self {
            fail_collections: true,
            ..Self::default()
        }
    }

    pub fn failing_puts(fragment: &str) -> Self {
        Self {
            fail_puts_matching: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    pub fn interactions(&self) -> usize {
        self.interactions.load(Ordering::SeqCst)
    }

    pub fn object_names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(path).cloned()
    }

    pub fn metadata_of(&self, path: &str) -> Option<MetadataRecord> {
        self.metadata.lock().unwrap().get(path).cloned()
    }

    fn touch(&self) {
        self.interactions.fetch_add(1, Ordering::SeqCst);
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_collection(&self, path: &str) -> StoreResult<()> {
        self.touch();
        if self.fail_collections {
            return Err(StoreError::CollectionFailed(format!("{path}: injected")));
        }
        let mut collections = self.collections.lock().unwrap();
        let mut current = path;
        while !current.is_empty() {
            collections.insert(current.to_string());
            current = parent_of(current);
        }
        Ok(())
    }

    async fn remove_collection(&self, path: &str) -> StoreResult<()> {
        self.touch();
        let prefix = format!("{path}/");
        self.collections
            .lock()
            .unwrap()
            .retain(|c| c != path && !c.starts_with(&prefix));
        self.objects.lock().unwrap().retain(|o, _| !o.starts_with(&prefix));
        self.metadata.lock().unwrap().retain(|o, _| !o.starts_with(&prefix));
        Ok(())
    }

    async fn put_object(&self, local: &Path, remote: &str) -> StoreResult<ObjectId> {
        self.touch();
        if let Some(fragment) = &self.fail_puts_matching {
            if remote.contains(fragment.as_str()) {
                return Err(StoreError::PutFailed(format!("{remote}: injected")));
            }
        }
        if !self.collections.lock().unwrap().contains(parent_of(remote)) {
            return Err(StoreError::PutFailed(format!("{remote}: no parent collection")));
        }
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|e| StoreError::PutFailed(format!("{}: {}", local.display(), e)))?;
        self.objects.lock().unwrap().insert(remote.to_string(), bytes);
        self.metadata.lock().unwrap().remove(remote);
        Ok(ObjectId::new(remote))
    }

    async fn attach_metadata(&self, id: &ObjectId, record: &MetadataRecord) -> StoreResult<()> {
        self.touch();
        if !self.objects.lock().unwrap().contains_key(id.as_str()) {
            return Err(StoreError::ObjectNotFound(id.to_string()));
        }
        self.metadata
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .merge(record.clone());
        Ok(())
    }

    async fn metadata(&self, id: &ObjectId) -> StoreResult<Option<MetadataRecord>> {
        self.touch();
        if !self.objects.lock().unwrap().contains_key(id.as_str()) {
            return Err(StoreError::ObjectNotFound(id.to_string()));
        }
        Ok(self.metadata.lock().unwrap().get(id.as_str()).cloned())
    }
}

/// Registry answering from a fixed record list
pub struct StaticRegistry {
    records: Vec<RegistryRecord>,
    unavailable: bool,
    queries: AtomicUsize,
}

impl StaticRegistry {
    pub fn new(records: Vec<RegistryRecord>) -> Self {
        Self {
            records,
            unavailable: false,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::empty()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RunRegistry for StaticRegistry {
    async fn find(&self, query: &RegistryQuery) -> RegistryResult<Vec<RegistryRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(RegistryError::Unavailable("injected".to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }
}

/// Registry record for the standard fixture analysis
pub fn sample_record() -> RegistryRecord {
    RegistryRecord {
        run_name: RUN_NAME.to_string(),
        well_label: "B1".to_string(),
        tag_id: Some(BARCODE.to_string()),
        plate_number: None,
        sample_name: Some("DTOL13000001".to_string()),
        sample_id: Some("9001".to_string()),
        study_id: Some("5901".to_string()),
        study_name: Some("Darwin Tree of Life".to_string()),
        library_id: Some("TRAC-2-1".to_string()),
        library_type: Some("Pacbio_HiFi".to_string()),
        extra: BTreeMap::new(),
    }
}

/// Configuration whose scratch space lives under `scratch`
pub fn test_config(scratch: &Path) -> SeqferryConfig {
    let mut config = parse_config(&format!(
        r#"
[store]
root = "/unused"
dest_collection = "{DEST_COLLECTION}"

[registry]
path = "/unused/registry.json"
"#
    ))
    .expect("test config");
    config.staging.scratch_dir = scratch.display().to_string();
    config.staging.bandwidth_limit_kbps = 0;
    config
}

/// Context of the standard fixture analysis
pub fn sample_context() -> AnalysisContext {
    context_builder().barcode(BARCODE).build().unwrap()
}

pub fn context_builder() -> AnalysisContextBuilder {
    AnalysisContextBuilder::new()
        .run_name(RUN_NAME)
        .well_label("B01")
        .unwrap()
        .movie_name(MOVIE_NAME)
        .analysis_id(ANALYSIS_ID)
        .unwrap()
}

/// On-disk layout of one analysis inside a run folder
pub struct AnalysisFixture {
    pub root: TempDir,
    pub runfolder: PathBuf,
    pub analysis_dir: PathBuf,
    pub scratch: PathBuf,
}

impl AnalysisFixture {
    /// Run folder with one HiFi BAM, its index, a report and an excluded file
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let runfolder = root.path().join("r84047_20230404_172222");
        let analysis_dir = runfolder.join("1_B01").join(ANALYSIS_ID);
        let scratch = root.path().join("scratch");
        std::fs::create_dir_all(&analysis_dir).unwrap();
        std::fs::create_dir_all(&scratch).unwrap();

        let fixture = Self {
            root,
            runfolder,
            analysis_dir,
            scratch,
        };
        fixture.write("m84047.hifi_reads.bc2001.bam", b"BAM\x01reads");
        fixture.write("m84047.hifi_reads.bc2001.bam.pbi", b"PBI\x01");
        fixture.write("m84047.ccs_report.json", b"{}");
        fixture.write("m84047.segmented.bam", b"BAM\x01segments");
        fixture
    }

    /// Analysis directory holding a single HiFi BAM
    pub fn single_file() -> Self {
        let fixture = Self::new();
        for name in [
            "m84047.hifi_reads.bc2001.bam.pbi",
            "m84047.ccs_report.json",
            "m84047.segmented.bam",
        ] {
            std::fs::remove_file(fixture.analysis_dir.join(name)).unwrap();
        }
        fixture
    }

    pub fn write(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.analysis_dir.join(name), contents).unwrap();
    }

    pub fn marker_path(&self) -> PathBuf {
        sample_context().marker_path(&self.runfolder)
    }

    pub fn destination(&self) -> String {
        format!("{DEST_COLLECTION}/{RUN_NAME}/{ANALYSIS_ID}")
    }

    /// Remote path of a staged file
    pub fn remote(&self, name: &str) -> String {
        format!("{}/{ANALYSIS_ID}.{MOVIE_NAME}.{name}", self.destination())
    }
}
