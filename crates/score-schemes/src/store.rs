use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use score_model::{Scheme, SchemeSummary, ScoreError};

use crate::consistency::check_scheme;
use crate::definition::parse_scheme;
use crate::embedded::BUILTIN_SCHEMES;
use crate::error::{Result, SchemeError};
use crate::hash::sha256_hex;
use crate::manifest::{
    MANIFEST_FILE, MANIFEST_SCHEMA, MANIFEST_SCHEMA_VERSION, Manifest, ManifestFile,
};
use crate::paths::schemes_dir_from_env;

const ALLOWED_KINDS: &[&str] = &["scheme", "notes"];

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifySummary {
    pub schemes_dir: PathBuf,
    pub file_count: usize,
    pub scheme_count: usize,
    pub schemes: Vec<SchemeSummary>,
}

/// Read-only registry of consistent schemes keyed by id.
///
/// Schemes are shared behind [`Arc`] so sessions can hold the scheme they
/// were started with independently of the store's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SchemeStore {
    schemes: BTreeMap<String, Arc<Scheme>>,
}

impl SchemeStore {
    pub fn builder() -> SchemeStoreBuilder {
        SchemeStoreBuilder::default()
    }

    /// Store holding the embedded schemes.
    pub fn builtin() -> Result<Self> {
        let mut builder = Self::builder();
        for (origin, text) in BUILTIN_SCHEMES {
            builder.add_toml(text, origin)?;
        }
        Ok(builder.build())
    }

    /// `SCORE_SCHEMES_DIR` when set, otherwise the embedded schemes.
    pub fn from_env() -> Result<Self> {
        match schemes_dir_from_env() {
            Some(dir) => Ok(Self::load_dir(&dir)?.0),
            None => Self::builtin(),
        }
    }

    /// Verify a scheme directory against its `manifest.toml` and load every
    /// listed scheme file.
    pub fn load_dir(schemes_dir: &Path) -> Result<(Self, VerifySummary)> {
        let manifest = load_manifest(&schemes_dir.join(MANIFEST_FILE))?;
        validate_manifest(&manifest, schemes_dir)?;

        let mut files = manifest.files.clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut builder = Self::builder();
        for file in &files {
            let bytes = verify_file(schemes_dir, file)?;
            if !file.is_scheme() {
                continue;
            }
            let full_path = schemes_dir.join(&file.path);
            let text = String::from_utf8(bytes).map_err(|e| {
                SchemeError::io(
                    &full_path,
                    std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                )
            })?;
            builder.add_toml(&text, &file.path)?;
        }
        let store = builder.build();

        let summary = VerifySummary {
            schemes_dir: schemes_dir.to_path_buf(),
            file_count: files.len(),
            scheme_count: store.len(),
            schemes: store.list_schemes(),
        };
        Ok((store, summary))
    }

    pub fn get_scheme(&self, id: &str) -> std::result::Result<Arc<Scheme>, ScoreError> {
        self.schemes
            .get(id)
            .cloned()
            .ok_or_else(|| ScoreError::UnknownScheme { id: id.to_string() })
    }

    /// Summaries ordered by scheme id.
    pub fn list_schemes(&self) -> Vec<SchemeSummary> {
        self.schemes.values().map(|s| s.summary()).collect()
    }

    pub fn schemes(&self) -> impl Iterator<Item = &Arc<Scheme>> {
        self.schemes.values()
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

/// Collects schemes before the store is frozen. Every scheme passes
/// [`check_scheme`] on the way in.
#[derive(Debug, Default)]
pub struct SchemeStoreBuilder {
    schemes: BTreeMap<String, Arc<Scheme>>,
}

impl SchemeStoreBuilder {
    pub fn add(&mut self, scheme: Scheme) -> Result<&mut Self> {
        if let Err(e) = check_scheme(&scheme) {
            warn!(scheme = %scheme.id, error = %e, "rejecting inconsistent scheme");
            return Err(e);
        }
        if self.schemes.contains_key(&scheme.id) {
            return Err(SchemeError::DuplicateScheme { id: scheme.id });
        }
        debug!(
            scheme = %scheme.id,
            version = %scheme.version,
            strategy = %scheme.strategy(),
            fields = scheme.fields.len(),
            "loaded scheme"
        );
        self.schemes.insert(scheme.id.clone(), Arc::new(scheme));
        Ok(self)
    }

    pub fn add_toml(&mut self, text: &str, origin: &str) -> Result<&mut Self> {
        let scheme = parse_scheme(text, origin)?;
        self.add(scheme)
    }

    pub fn build(self) -> SchemeStore {
        SchemeStore {
            schemes: self.schemes,
        }
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| SchemeError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| SchemeError::Toml {
        origin: path.display().to_string(),
        source: e,
    })
}

fn validate_manifest(manifest: &Manifest, schemes_dir: &Path) -> Result<()> {
    if manifest.manifest.schema != MANIFEST_SCHEMA {
        return Err(SchemeError::InvalidManifest {
            message: format!("unsupported schema: {}", manifest.manifest.schema),
        });
    }
    if manifest.manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(SchemeError::InvalidManifest {
            message: format!(
                "unsupported schema_version: {}",
                manifest.manifest.schema_version
            ),
        });
    }

    let mut manifest_paths: BTreeSet<PathBuf> = BTreeSet::new();
    for file in &manifest.files {
        if !ALLOWED_KINDS.contains(&file.kind.as_str()) {
            return Err(SchemeError::InvalidManifest {
                message: format!("unsupported kind '{}' for {}", file.kind, file.path),
            });
        }
        validate_sha(&file.sha256, &file.path)?;
        let path = normalize_path(&validate_path(&file.path)?);
        if !manifest_paths.insert(path) {
            return Err(SchemeError::InvalidManifest {
                message: format!("{} is listed twice", file.path),
            });
        }
    }

    for path in list_files_under(schemes_dir)? {
        if path == Path::new(MANIFEST_FILE) {
            continue;
        }
        if !manifest_paths.contains(&normalize_path(&path)) {
            return Err(SchemeError::UnexpectedFile {
                path: schemes_dir.join(path),
            });
        }
    }
    Ok(())
}

fn verify_file(schemes_dir: &Path, file: &ManifestFile) -> Result<Vec<u8>> {
    let full_path = schemes_dir.join(&file.path);
    let bytes = std::fs::read(&full_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SchemeError::MissingFile {
                path: full_path.clone(),
            }
        } else {
            SchemeError::io(full_path.clone(), e)
        }
    })?;

    let actual = sha256_hex(&bytes);
    let expected = file.sha256.to_ascii_lowercase();
    if actual != expected {
        return Err(SchemeError::Sha256Mismatch {
            path: full_path,
            expected,
            actual,
        });
    }
    Ok(bytes)
}

fn validate_sha(sha: &str, path: &str) -> Result<()> {
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SchemeError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "sha256 must be 64 hex characters".to_string(),
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<PathBuf> {
    if path.contains('\\') {
        return Err(SchemeError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }

    let p = PathBuf::from(path);
    if p.is_absolute() {
        return Err(SchemeError::InvalidPath {
            path: p,
            message: "manifest path must be relative".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(SchemeError::InvalidPath {
            path: p,
            message: "manifest path must not traverse out of the scheme directory".to_string(),
        });
    }
    Ok(p)
}

fn list_files_under(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut stack = vec![root.to_path_buf()];
    let mut files = BTreeSet::new();

    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).map_err(|e| SchemeError::io(&dir, e))? {
            let entry = entry.map_err(|e| SchemeError::io(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = path
                    .strip_prefix(root)
                    .map_err(|e| SchemeError::InvalidPath {
                        path: path.clone(),
                        message: format!("failed to relativize path: {e}"),
                    })?
                    .to_path_buf();
                files.insert(rel);
            }
        }
    }
    Ok(files)
}

fn normalize_path(p: &Path) -> PathBuf {
    p.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str())
        .collect()
}
