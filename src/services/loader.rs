//! Suite loading: resolve a suite path through a [`SuiteSource`] and apply defaults.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::models::{
    Callback, Expectation, LoadedSuite, Payload, RequestArgs, RequestData, SuiteDefinition,
    SuiteStatus, UnitPayload,
};
use crate::services::discovery::suite_identity;

/// Resolves suite paths into suite definitions.
///
/// Paths handed to a source are suite identities: normalized, with the file
/// extension stripped. A single-file run passes the path as given.
#[async_trait]
pub trait SuiteSource<R>: Send + Sync {
    async fn resolve(&self, path: &Path) -> Result<SuiteDefinition<R>, LoadError>;

    /// File extensions this source can load. `None` accepts every suite file.
    fn extensions(&self) -> Option<&[String]> {
        None
    }
}

/// Load one suite and materialize its defaults.
pub async fn load_suite<R, S>(source: &S, path: &Path) -> Result<LoadedSuite<R>, LoadError>
where
    S: SuiteSource<R> + ?Sized,
{
    let definition = source.resolve(path).await?;
    debug!("Loaded suite '{}' from {}", definition.name, path.display());
    Ok(LoadedSuite::from_definition(definition, path.to_path_buf()))
}

// ============================================================================
// JSON suite files
// ============================================================================

/// Reads suites from JSON files.
#[derive(Debug, Clone)]
pub struct FileSuiteSource {
    extensions: Vec<String>,
}

impl Default for FileSuiteSource {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
        }
    }
}

impl FileSuiteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extensions tried, in order, when the path itself is not a file.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    async fn locate(&self, path: &Path) -> Option<PathBuf> {
        if is_file(path).await {
            return Some(path.to_path_buf());
        }
        for extension in &self.extensions {
            let mut candidate = OsString::from(path.as_os_str());
            candidate.push(".");
            candidate.push(extension);
            let candidate = PathBuf::from(candidate);
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl SuiteSource<Value> for FileSuiteSource {
    fn extensions(&self) -> Option<&[String]> {
        Some(self.extensions.as_slice())
    }

    async fn resolve(&self, path: &Path) -> Result<SuiteDefinition<Value>, LoadError> {
        let file = self
            .locate(path)
            .await
            .ok_or_else(|| LoadError::Unresolved {
                path: path.to_path_buf(),
            })?;

        let content = tokio::fs::read_to_string(&file)
            .await
            .map_err(|source| LoadError::Read {
                path: file.clone(),
                source,
            })?;

        parse_suite(&content).map_err(|reason| LoadError::NoSuiteExport { path: file, reason })
    }
}

/// Parse the content of a JSON suite file.
pub fn parse_suite(content: &str) -> Result<SuiteDefinition<Value>, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;
    if !value.is_object() {
        return Err("suite file must contain a JSON object".to_string());
    }
    let file: SuiteFile = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok(file.into())
}

/// On-disk suite shape. Missing `name`/`url` are reported when the unit runs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuiteFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    method: Option<String>,
    timeout: Option<u64>,
    bail: Option<bool>,
    status: Option<SuiteStatus>,
    #[serde(default)]
    payload: Option<PayloadFile>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PayloadFile {
    List(Vec<UnitFile>),
    Single(UnitFile),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitFile {
    name: Option<String>,
    #[serde(default)]
    args: RequestArgs,
    #[serde(default)]
    data: Option<Value>,
    /// `null` is a real expectation, absence is not
    #[serde(default, deserialize_with = "present")]
    expect: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    callback: Option<Value>,
    resp_pluck: Option<Vec<String>>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl From<SuiteFile> for SuiteDefinition<Value> {
    fn from(file: SuiteFile) -> Self {
        SuiteDefinition {
            name: file.name,
            url: file.url,
            method: file.method,
            timeout: file.timeout,
            bail: file.bail,
            status: file.status,
            payload: file.payload.map(|payload| match payload {
                PayloadFile::List(units) => {
                    Payload::List(units.into_iter().map(UnitPayload::from).collect())
                }
                PayloadFile::Single(unit) => Payload::Single(unit.into()),
            }),
        }
    }
}

impl From<UnitFile> for UnitPayload<Value> {
    fn from(unit: UnitFile) -> Self {
        UnitPayload {
            name: unit.name,
            args: unit.args,
            data: unit
                .data
                .filter(|data| !data.is_null())
                .map(RequestData::Value),
            expect: unit.expect.map_or(Expectation::Absent, Expectation::Value),
            callback: unit.callback.map(|value| Callback::Invalid(value.to_string())),
            resp_pluck: unit.resp_pluck,
        }
    }
}

// ============================================================================
// Programmatic suites
// ============================================================================

type SuiteFactory<R> = Arc<dyn Fn() -> SuiteDefinition<R> + Send + Sync>;

/// Suites registered in code, keyed by suite identity.
///
/// Registered suites can carry native callbacks and asynchronous data or
/// expectation streams, which data files cannot express. Each resolution calls
/// the factory again, so streams are fresh for every run.
pub struct RegistrySuiteSource<R = Value> {
    suites: HashMap<PathBuf, SuiteFactory<R>>,
}

impl<R> Default for RegistrySuiteSource<R> {
    fn default() -> Self {
        Self {
            suites: HashMap::new(),
        }
    }
}

impl<R> RegistrySuiteSource<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suite for the file at `path`.
    pub fn register<F>(&mut self, path: impl AsRef<Path>, factory: F) -> &mut Self
    where
        F: Fn() -> SuiteDefinition<R> + Send + Sync + 'static,
    {
        self.suites
            .insert(suite_identity(path.as_ref()), Arc::new(factory));
        self
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

#[async_trait]
impl<R: Send + 'static> SuiteSource<R> for RegistrySuiteSource<R> {
    async fn resolve(&self, path: &Path) -> Result<SuiteDefinition<R>, LoadError> {
        let factory = self
            .suites
            .get(path)
            .or_else(|| self.suites.get(&suite_identity(path)))
            .ok_or_else(|| LoadError::Unresolved {
                path: path.to_path_buf(),
            })?;
        Ok(factory())
    }
}
