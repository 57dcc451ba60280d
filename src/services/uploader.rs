//! Content uploader
//!
//! Uploads every regular file of a deploy folder, then the path manifest that
//! indexes them. Per-file failures never abort the run: the file is recorded
//! with the `upload-failed` sentinel and the remaining files continue.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{DEFAULT_UPLOAD_CONCURRENCY, DEFAULT_UPLOAD_TIMEOUT};
use crate::domain::content_type;
use crate::domain::manifest::MANIFEST_FILE;
use crate::domain::{Manifest, ManifestOutcome, ObjectId, PathMap, Signer, Tag, UploadedObject};
use crate::error::UploadError;
use crate::infrastructure::ObjectStore;

/// A file found in the deploy folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Site-relative path with `/` separators
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Every regular file under `root`, recursively
pub fn enumerate_files(root: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
        files.push(SourceFile {
            relative_path: to_site_path(relative),
            absolute_path: entry.path().to_path_buf(),
        });
    }
    Ok(files)
}

fn to_site_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

pub struct ContentUploader<'a> {
    store: &'a dyn ObjectStore,
    signer: &'a Signer,
    timeout: Duration,
    concurrency: usize,
}

impl<'a> ContentUploader<'a> {
    pub fn new(store: &'a dyn ObjectStore, signer: &'a Signer) -> Self {
        Self {
            store,
            signer,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    /// Builder: per-upload timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: number of uploads in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Tags for an object of the given content type
    pub fn tags_for(&self, content_type: &str) -> Vec<Tag> {
        let mut tags = vec![Tag::content_type(content_type), Tag::app_name()];
        if self.signer.is_evm() {
            tags.push(Tag::new(
                "Unix-Time",
                chrono::Utc::now().timestamp_millis().to_string(),
            ));
        }
        tags
    }

    /// Upload one object, bounded by the timeout
    pub async fn upload_bytes(&self, data: Vec<u8>, content_type: &str) -> Result<String, UploadError> {
        let tags = self.tags_for(content_type);
        match tokio::time::timeout(self.timeout, self.store.upload(data, &tags, self.signer)).await {
            Ok(result) => result,
            Err(_) => Err(UploadError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }

    async fn upload_file(&self, file: SourceFile) -> UploadedObject {
        let content_type = content_type::for_path(&file.absolute_path);

        let result = match tokio::fs::read(&file.absolute_path).await {
            Ok(data) => self.upload_bytes(data, content_type).await,
            Err(source) => Err(UploadError::Io {
                path: file.absolute_path.display().to_string(),
                source,
            }),
        };

        let id = match result {
            Ok(id) => {
                if self.store.is_dry_run() {
                    info!("[DRY RUN] Would upload {} with ID {}", file.relative_path, id);
                } else {
                    info!("Uploaded {} with ID: {}", file.relative_path, id);
                }
                ObjectId::Stored(id)
            }
            Err(e) => {
                warn!(
                    "⚠️  Skipping {} due to upload failure: {}. Continuing deployment...",
                    file.relative_path, e
                );
                ObjectId::Failed
            }
        };

        UploadedObject {
            relative_path: file.relative_path,
            content_type,
            id,
        }
    }

    /// Upload every file under `root`.
    ///
    /// Only enumeration errors are returned; each settled upload, failed or
    /// not, has an entry in the map.
    pub async fn upload_tree(&self, root: &Path) -> Result<PathMap> {
        let files = enumerate_files(root)?;
        info!("📤 Uploading {} files from {}", files.len(), root.display());

        let pb = progress_bar(files.len());
        let objects: Vec<UploadedObject> = stream::iter(files)
            .map(|file| {
                let pb = pb.clone();
                async move {
                    pb.set_message(file.relative_path.clone());
                    let object = self.upload_file(file).await;
                    pb.inc(1);
                    object
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        pb.finish_and_clear();

        Ok(objects
            .into_iter()
            .map(|object| (object.relative_path.clone(), object))
            .collect())
    }

    /// Write `manifest.json` into the deploy folder and upload it
    pub async fn publish_manifest(&self, deploy_folder: &Path, objects: &PathMap) -> (Manifest, ManifestOutcome) {
        let manifest = Manifest::from_objects(objects);
        if !manifest.has_index() {
            warn!(
                "⚠️  {} has no index.html; the deployment will not serve a root document",
                deploy_folder.display()
            );
        }

        let json = match manifest.to_json() {
            Ok(json) => json,
            Err(e) => return (manifest, ManifestOutcome::Failed(e.to_string())),
        };

        let local_path = deploy_folder.join(MANIFEST_FILE);
        if let Err(e) = tokio::fs::write(&local_path, &json).await {
            warn!("⚠️  Could not write {}: {}", local_path.display(), e);
        }

        match self.upload_bytes(json.into_bytes(), content_type::MANIFEST).await {
            Ok(id) => {
                if self.store.is_dry_run() {
                    info!("[DRY RUN] Would upload manifest with ID {}", id);
                } else {
                    info!("🗺️  Manifest uploaded with ID: {}", id);
                }
                (manifest, ManifestOutcome::Published(id))
            }
            Err(e) => {
                warn!("⚠️  Manifest upload failed: {}", e);
                (manifest, ManifestOutcome::Failed(e.to_string()))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingStore;
    use super::*;
    use crate::domain::manifest::UPLOAD_FAILED;
    use crate::infrastructure::DryRunStore;
    use tempfile::TempDir;

    const HEX: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn evm() -> Signer {
        Signer::resolve(HEX, None).unwrap()
    }

    fn native() -> Signer {
        Signer::resolve(r#"{"n":"AQAB","d":"AQAB"}"#, None).unwrap()
    }

    fn site(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_enumerate_skips_directories_and_uses_slashes() {
        let dir = site(&[("index.html", "<html/>"), ("assets/js/app.js", "x")]);
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let mut paths: Vec<_> = enumerate_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.relative_path)
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["assets/js/app.js", "index.html"]);
    }

    #[tokio::test]
    async fn test_dry_run_returns_entry_per_file() {
        let dir = site(&[
            ("index.html", "<html/>"),
            ("style.css", "body{}"),
            ("img/logo.png", "png"),
            ("LICENSE", "mit"),
        ]);
        let store = DryRunStore::new();
        let signer = evm();
        let objects = ContentUploader::new(&store, &signer)
            .upload_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(objects.len(), 4);
        assert!(objects.values().all(|o| o.id.as_str().starts_with("fake-")));
        assert_eq!(objects["style.css"].content_type, "text/css");
        assert_eq!(objects["LICENSE"].content_type, "application/octet-stream");
        assert_eq!(store.upload_count(), 4);
    }

    #[tokio::test]
    async fn test_root_manifest_json_is_site_content() {
        // Web app manifest shipped by the build at the folder root
        let dir = site(&[("index.html", "<html/>"), ("manifest.json", r#"{"short_name":"App"}"#)]);
        let store = DryRunStore::new();
        let signer = native();
        let objects = ContentUploader::new(&store, &signer)
            .upload_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(objects.keys().collect::<Vec<_>>(), vec!["index.html", "manifest.json"]);
        assert_eq!(objects["manifest.json"].content_type, "application/json");
        assert!(objects["manifest.json"].id.is_stored());
        assert_eq!(store.upload_count(), 2);
    }

    #[tokio::test]
    async fn test_single_failure_is_contained() {
        let dir = site(&[
            ("index.html", "<html/>"),
            ("broken.js", "BROKEN"),
            ("style.css", "body{}"),
        ]);
        let store = RecordingStore {
            fail_marker: Some(b"BROKEN".to_vec()),
            ..Default::default()
        };
        let signer = native();
        let uploader = ContentUploader::new(&store, &signer);
        let objects = uploader.upload_tree(dir.path()).await.unwrap();

        assert_eq!(objects.len(), 3);
        assert_eq!(objects["broken.js"].id, ObjectId::Failed);
        assert_eq!(objects.values().filter(|o| o.id.is_stored()).count(), 2);
        assert_eq!(store.count(), 3);

        let (manifest, outcome) = uploader.publish_manifest(dir.path(), &objects).await;
        assert_eq!(manifest.paths.len(), 3);
        assert_eq!(manifest.paths["broken.js"].id, UPLOAD_FAILED);
        assert!(matches!(outcome, ManifestOutcome::Published(_)));
        assert_eq!(store.count(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_all_settle() {
        let files: Vec<(String, String)> = (0..12)
            .map(|i| (format!("page{i}.html"), if i % 5 == 0 { "BROKEN".into() } else { format!("p{i}") }))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let dir = site(&refs);

        let store = RecordingStore {
            fail_marker: Some(b"BROKEN".to_vec()),
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        };
        let signer = evm();
        let objects = ContentUploader::new(&store, &signer)
            .with_concurrency(4)
            .upload_tree(dir.path())
            .await
            .unwrap();

        assert_eq!(objects.len(), 12);
        assert_eq!(objects.values().filter(|o| o.id == ObjectId::Failed).count(), 3);
        assert_eq!(store.count(), 12);
    }

    #[tokio::test]
    async fn test_timeout_is_an_upload_failure() {
        let dir = site(&[("index.html", "<html/>")]);
        let store = RecordingStore {
            delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let signer = evm();
        let objects = ContentUploader::new(&store, &signer)
            .with_timeout(Duration::from_millis(20))
            .upload_tree(dir.path())
            .await
            .unwrap();
        assert_eq!(objects["index.html"].id, ObjectId::Failed);
    }

    #[tokio::test]
    async fn test_evm_uploads_carry_uniqueness_tag() {
        let signer = evm();
        let store = DryRunStore::new();
        let tags = ContentUploader::new(&store, &signer).tags_for("text/html");
        assert!(tags.iter().any(|t| t.name == "Unix-Time"));
        assert!(tags.contains(&Tag::app_name()));

        let signer = native();
        let tags = ContentUploader::new(&store, &signer).tags_for("text/html");
        assert_eq!(tags, vec![Tag::content_type("text/html"), Tag::app_name()]);
    }

    #[tokio::test]
    async fn test_manifest_written_locally_and_tagged() {
        let dir = site(&[("index.html", "<html/>")]);
        let store = RecordingStore::default();
        let signer = native();
        let uploader = ContentUploader::new(&store, &signer);
        let objects = uploader.upload_tree(dir.path()).await.unwrap();
        let (_, outcome) = uploader.publish_manifest(dir.path(), &objects).await;
        assert!(matches!(outcome, ManifestOutcome::Published(_)));

        let local = std::fs::read_to_string(dir.path().join("manifest.json")).unwrap();
        assert!(local.contains("\"arweave/paths\""));

        let uploads = store.uploads.lock().unwrap();
        let (body, tags) = uploads.last().unwrap();
        assert_eq!(body, local.as_bytes());
        assert_eq!(
            crate::domain::tag::find(tags, "Content-Type"),
            Some("application/x.arweave-manifest+json")
        );
    }

    #[tokio::test]
    async fn test_manifest_paths_identical_across_runs() {
        let dir = site(&[("index.html", "<html/>"), ("a/b.css", "x")]);
        let signer = native();

        let first_store = DryRunStore::new();
        let first = ContentUploader::new(&first_store, &signer)
            .upload_tree(dir.path())
            .await
            .unwrap();

        let second_store = DryRunStore::new();
        let second = ContentUploader::new(&second_store, &signer)
            .upload_tree(dir.path())
            .await
            .unwrap();

        let first_paths: Vec<_> = Manifest::from_objects(&first).paths.into_keys().collect();
        let second_paths: Vec<_> = Manifest::from_objects(&second).paths.into_keys().collect();
        assert_eq!(first_paths, second_paths);
    }

    #[tokio::test]
    async fn test_manifest_upload_failure() {
        let dir = site(&[("index.html", "<html/>")]);
        let store = RecordingStore {
            fail_content_type: Some(content_type::MANIFEST.to_string()),
            ..Default::default()
        };
        let signer = native();
        let uploader = ContentUploader::new(&store, &signer);
        let objects = uploader.upload_tree(dir.path()).await.unwrap();
        assert!(objects["index.html"].id.is_stored());

        let (_, outcome) = uploader.publish_manifest(dir.path(), &objects).await;
        assert!(matches!(outcome, ManifestOutcome::Failed(_)));
        assert_eq!(outcome.id(), ObjectId::Failed);
    }
}
