//! Integration tests for run log archiving

mod common;

use common::{test_config, InMemoryStore};
use seqferry::adapters::store::{ObjectId, ObjectStore};
use seqferry::core::archive::{list_members, LogArchiver};
use seqferry::domain::{MetadataAttribute, SeqferryError};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const RUN_FOLDER: &str = "150910_HS40_17550_A_C75BCANXX";

/// Run folder with 43 archivable files and a few excluded ones
struct RunFolder {
    root: TempDir,
    path: PathBuf,
    expected: BTreeSet<String>,
}

impl RunFolder {
    fn new(name: &str) -> Self {
        let root = TempDir::new().unwrap();
        let path = root.path().join(name);
        std::fs::create_dir_all(root.path().join("scratch")).unwrap();

        let mut relative = Vec::new();
        relative.extend((0..20).map(|i| format!("Logs/{name}_Cycle{i:03}_Log.00.log")));
        relative.extend((0..10).map(|i| format!("Config/Effective_{i}.cfg")));
        relative.extend((0..8).map(|i| format!("InterOp/Metrics{i}Out.bin")));
        relative.extend((1..=4).map(|lane| format!("Data/Intensities/L00{lane}/s_{lane}.locs")));
        relative.push("RunInfo.xml".to_string());
        assert_eq!(relative.len(), 43);

        let mut expected = BTreeSet::new();
        for rel in &relative {
            write_file(&path.join(rel), rel);
            expected.insert(format!("{name}/{rel}"));
        }

        for excluded in ["Data/reads.bam", "Data/reads.bam.pbi", "Data/Intensities/cal.h5"] {
            write_file(&path.join(excluded), excluded);
        }

        Self {
            root,
            path,
            expected,
        }
    }

    fn scratch(&self) -> PathBuf {
        self.root.path().join("scratch")
    }
}

fn write_file(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn members_of(store: &InMemoryStore, id: &ObjectId) -> BTreeSet<String> {
    let bytes = store.object(id.as_str()).expect("archive object");
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("archive.tgz");
    std::fs::write(&path, bytes).unwrap();
    list_members(&path).unwrap()
}

#[tokio::test]
async fn test_archive_holds_exactly_the_matched_files() {
    let run = RunFolder::new(RUN_FOLDER);
    let store = Arc::new(InMemoryStore::new());
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    let id = archiver
        .archive_and_publish(&run.path, Some(999), "/seq/illumina/logs")
        .await
        .unwrap();

    assert_eq!(
        id.as_str(),
        "/seq/illumina/logs/150910_HS40_17550_A_C75BCANXX_logs.tgz"
    );
    assert_eq!(store.object_names(), vec![id.to_string()]);

    let members = members_of(&store, &id);
    assert_eq!(members.len(), 43);
    assert_eq!(members, run.expected);
}

#[tokio::test]
async fn test_explicit_run_id_wins() {
    let run = RunFolder::new(RUN_FOLDER);
    let store = Arc::new(InMemoryStore::new());
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    let id = archiver
        .archive_and_publish(&run.path, Some(999), "/seq/illumina/logs")
        .await
        .unwrap();

    let meta = store.metadata(&id).await.unwrap().unwrap();
    assert_eq!(meta.first(MetadataAttribute::Run), Some("999"));
    assert_eq!(meta.first(MetadataAttribute::FileType), Some("tgz"));
    assert_eq!(meta.first(MetadataAttribute::DataLevel), Some("primary"));
}

#[tokio::test]
async fn test_run_id_inferred_from_folder_name() {
    let run = RunFolder::new(RUN_FOLDER);
    let store = Arc::new(InMemoryStore::new());
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    let id = archiver
        .archive_and_publish(&run.path, None, "/seq/illumina/logs")
        .await
        .unwrap();

    let meta = store.metadata(&id).await.unwrap().unwrap();
    assert_eq!(meta.first(MetadataAttribute::Run), Some("17550"));
}

#[tokio::test]
async fn test_no_run_id_anywhere_is_configuration_error() {
    let run = RunFolder::new("instrument_logs");
    let store = Arc::new(InMemoryStore::new());
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    let result = archiver
        .archive_and_publish(&run.path, None, "/seq/illumina/logs")
        .await;

    assert!(matches!(result, Err(SeqferryError::Configuration(_))));
    assert_eq!(store.interactions(), 0);
}

#[tokio::test]
async fn test_store_failure_is_reported() {
    let run = RunFolder::new(RUN_FOLDER);
    let store = Arc::new(InMemoryStore::failing_puts("_logs.tgz"));
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    let result = archiver
        .archive_and_publish(&run.path, None, "/seq/illumina/logs")
        .await;

    assert!(matches!(result, Err(SeqferryError::Store(_))));
    assert!(store.object_names().is_empty());
}

#[tokio::test]
async fn test_scratch_space_is_cleaned_up() {
    let run = RunFolder::new(RUN_FOLDER);
    let store = Arc::new(InMemoryStore::new());
    let archiver = LogArchiver::new(&test_config(&run.scratch()), store.clone()).unwrap();

    archiver
        .archive_and_publish(&run.path, None, "/seq/illumina/logs")
        .await
        .unwrap();

    assert_eq!(std::fs::read_dir(run.scratch()).unwrap().count(), 0);
}
