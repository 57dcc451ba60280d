//! Path manifest types
//!
//! A deployment is addressed by its manifest: a JSON index from site-relative
//! paths to object ids, uploaded as an object of its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Id recorded for objects whose upload did not succeed
pub const UPLOAD_FAILED: &str = "upload-failed";

pub const MANIFEST_FORMAT: &str = "arweave/paths";
pub const MANIFEST_VERSION: &str = "0.1.0";
pub const INDEX_PATH: &str = "index.html";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Remote id of an uploaded object, or the failure sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectId {
    Stored(String),
    Failed,
}

impl ObjectId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stored(id) => id,
            Self::Failed => UPLOAD_FAILED,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file of the deploy folder after its upload settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub relative_path: String,
    pub content_type: &'static str,
    pub id: ObjectId,
}

/// Uploaded objects keyed by relative path
pub type PathMap = BTreeMap<String, UploadedObject>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIndex {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
}

/// `arweave/paths` manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: String,
    pub version: String,
    pub index: ManifestIndex,
    pub paths: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Build the manifest from every settled upload, failed ones included
    pub fn from_objects(objects: &PathMap) -> Self {
        let paths = objects
            .iter()
            .map(|(path, object)| {
                (
                    path.clone(),
                    ManifestEntry {
                        id: object.id.as_str().to_string(),
                    },
                )
            })
            .collect();

        Self {
            manifest: MANIFEST_FORMAT.to_string(),
            version: MANIFEST_VERSION.to_string(),
            index: ManifestIndex {
                path: INDEX_PATH.to_string(),
            },
            paths,
        }
    }

    pub fn has_index(&self) -> bool {
        self.paths.contains_key(&self.index.path)
    }

    /// Canonical serialized form. Keys are ordered, so identical inputs
    /// always produce identical bytes.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(path: &str, id: ObjectId) -> (String, UploadedObject) {
        (
            path.to_string(),
            UploadedObject {
                relative_path: path.to_string(),
                content_type: "text/html",
                id,
            },
        )
    }

    #[test]
    fn test_manifest_shape() {
        let objects: PathMap = [
            object("index.html", ObjectId::Stored("abc".into())),
            object("style.css", ObjectId::Stored("def".into())),
        ]
        .into_iter()
        .collect();

        let manifest = Manifest::from_objects(&objects);
        let value: serde_json::Value =
            serde_json::from_str(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(value["manifest"], "arweave/paths");
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["index"]["path"], "index.html");
        assert_eq!(value["paths"]["style.css"]["id"], "def");
        assert!(manifest.has_index());
    }

    #[test]
    fn test_failed_uploads_keep_their_entry() {
        let objects: PathMap = [
            object("index.html", ObjectId::Stored("abc".into())),
            object("img/logo.png", ObjectId::Failed),
            object("app.js", ObjectId::Stored("ghi".into())),
        ]
        .into_iter()
        .collect();

        let manifest = Manifest::from_objects(&objects);
        assert_eq!(manifest.paths.len(), 3);
        assert_eq!(manifest.paths["img/logo.png"].id, UPLOAD_FAILED);
        assert_eq!(manifest.paths["app.js"].id, "ghi");
    }

    #[test]
    fn test_serialization_independent_of_insertion_order() {
        let forward: PathMap = [
            object("a.html", ObjectId::Stored("1".into())),
            object("b.html", ObjectId::Stored("2".into())),
        ]
        .into_iter()
        .collect();
        let mut reverse = PathMap::new();
        let (k, v) = object("b.html", ObjectId::Stored("2".into()));
        reverse.insert(k, v);
        let (k, v) = object("a.html", ObjectId::Stored("1".into()));
        reverse.insert(k, v);

        assert_eq!(
            Manifest::from_objects(&forward).to_json().unwrap(),
            Manifest::from_objects(&reverse).to_json().unwrap()
        );
        assert!(!Manifest::from_objects(&forward).has_index());
    }
}
