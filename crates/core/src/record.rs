//! Files produced by enumeration

use crate::location::object_uri;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where an enumerated file lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileRef {
    Local(PathBuf),
    Object { bucket: String, key: String },
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRef::Local(path) => write!(f, "{}", path.display()),
            FileRef::Object { bucket, key } => f.write_str(&object_uri(bucket, key)),
        }
    }
}

/// A file newer than the checkpoint
///
/// Transient: handed to the caller and never retained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// Path or `s3://` URI
    #[serde(rename = "identifier", serialize_with = "serialize_display")]
    pub file: FileRef,
    /// Modification time, Unix seconds
    pub modified_time: f64,
}

impl FileRecord {
    pub fn new(file: FileRef, modified_time: f64) -> Self {
        Self { file, modified_time }
    }

    /// Path for local files, `s3://bucket/key` for objects
    pub fn identifier(&self) -> String {
        self.file.to_string()
    }
}

fn serialize_display<S: serde::Serializer>(file: &FileRef, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        let local = FileRecord::new(FileRef::Local(PathBuf::from("/data/a.txt")), 1.0);
        assert_eq!(local.identifier(), "/data/a.txt");

        let object = FileRecord::new(
            FileRef::Object {
                bucket: "bkt".to_string(),
                key: "in/y".to_string(),
            },
            200.0,
        );
        assert_eq!(object.identifier(), "s3://bkt/in/y");

        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["identifier"], "s3://bkt/in/y");
        assert_eq!(json["modified_time"], 200.0);
    }
}
