use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "manifest.toml";
pub const MANIFEST_SCHEMA: &str = "score-report.scheme-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// `manifest.toml` of a scheme directory. Every file in the directory must
/// be listed with its sha256.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub notes: Option<ManifestNotes>,
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestNotes {
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub sha256: String,
    /// `scheme` files are loaded; `notes` files are only verified.
    pub kind: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ManifestFile {
    pub fn is_scheme(&self) -> bool {
        self.kind == "scheme"
    }
}
