use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::intake::IntakeService;
use crate::notify::WebhookNotifier;
use crate::storage::{LocalFileStorage, ObjectStorage, SupabaseStorage};
use crate::store::{JobStore, LocalJobStore, PostgrestJobStore};
use crate::supabase::SupabaseConfig;

const APP_DIR: &str = "image-request-intake";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUCKET: &str = "image-generation-assets";
const DEFAULT_TABLE: &str = "image_generation_requests";

/// Route under which the local storage backend publishes its objects.
pub const LOCAL_STORAGE_ROUTE: &str = "/storage";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is required when {reason}")]
    Missing { var: &'static str, reason: &'static str },

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local { dir: PathBuf, public_base_url: String },
    Supabase { bucket: String },
}

#[derive(Debug, Clone)]
pub enum DatastoreBackend {
    Local { dir: PathBuf },
    Supabase { table: String },
}

/// Process configuration, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub storage: StorageBackend,
    pub datastore: DatastoreBackend,
    pub supabase: Option<SupabaseConfig>,
    pub webhook_url: Option<Url>,
    pub webhook_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let max_upload_bytes =
            parse_or("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?;
        let webhook_timeout = Duration::from_secs(parse_or(
            "WEBHOOK_TIMEOUT_SECS",
            get("WEBHOOK_TIMEOUT_SECS"),
            DEFAULT_WEBHOOK_TIMEOUT_SECS,
        )?);
        let webhook_url = get("WEBHOOK_URL")
            .map(|value| parse_http_url("WEBHOOK_URL", &value))
            .transpose()?;

        let storage_backend = backend_kind("STORAGE_BACKEND", get("STORAGE_BACKEND"))?;
        let datastore_backend = backend_kind("DATASTORE_BACKEND", get("DATASTORE_BACKEND"))?;

        let supabase = if storage_backend == BackendKind::Supabase
            || datastore_backend == BackendKind::Supabase
        {
            let reason = "a backend is set to supabase";
            let url = get("SUPABASE_URL").ok_or(ConfigError::Missing {
                var: "SUPABASE_URL",
                reason,
            })?;
            let key = get("SUPABASE_KEY").ok_or(ConfigError::Missing {
                var: "SUPABASE_KEY",
                reason,
            })?;
            Some(SupabaseConfig {
                url: parse_http_url("SUPABASE_URL", &url)?,
                key,
            })
        } else {
            None
        };

        let storage = match storage_backend {
            BackendKind::Local => StorageBackend::Local {
                dir: get("STORAGE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_data_dir("storage")),
                public_base_url: resolve_public_base_url(
                    get("PUBLIC_BASE_URL").as_deref(),
                    &host,
                    port,
                ),
            },
            BackendKind::Supabase => StorageBackend::Supabase {
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
        };
        let datastore = match datastore_backend {
            BackendKind::Local => DatastoreBackend::Local {
                dir: get("JOBS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_data_dir("jobs")),
            },
            BackendKind::Supabase => DatastoreBackend::Supabase {
                table: get("JOBS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
        };

        Ok(Self {
            host,
            port,
            max_upload_bytes,
            storage,
            datastore,
            supabase,
            webhook_url,
            webhook_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory to serve publicly when objects live on local disk.
    pub fn local_storage_dir(&self) -> Option<&PathBuf> {
        match &self.storage {
            StorageBackend::Local { dir, .. } => Some(dir),
            StorageBackend::Supabase { .. } => None,
        }
    }

    /// Wire the configured backends into an [`IntakeService`].
    pub fn intake_service(&self) -> Result<IntakeService, ConfigError> {
        let client = Client::new();
        let supabase = || {
            self.supabase.clone().ok_or(ConfigError::Missing {
                var: "SUPABASE_URL",
                reason: "a backend is set to supabase",
            })
        };

        let storage: Arc<dyn ObjectStorage> = match &self.storage {
            StorageBackend::Local {
                dir,
                public_base_url,
            } => Arc::new(LocalFileStorage::new(dir.clone(), public_base_url.clone())),
            StorageBackend::Supabase { bucket } => Arc::new(SupabaseStorage::new(
                client.clone(),
                supabase()?,
                bucket.clone(),
            )),
        };
        let jobs: Arc<dyn JobStore> = match &self.datastore {
            DatastoreBackend::Local { dir } => Arc::new(LocalJobStore::new(dir.clone())),
            DatastoreBackend::Supabase { table } => Arc::new(PostgrestJobStore::new(
                client.clone(),
                supabase()?,
                table.clone(),
            )),
        };
        let notifier = WebhookNotifier::with_timeout(self.webhook_url.clone(), self.webhook_timeout)?;

        Ok(IntakeService::new(storage, jobs, notifier))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Local,
    Supabase,
}

fn backend_kind(var: &'static str, value: Option<String>) -> Result<BackendKind, ConfigError> {
    let Some(value) = value else {
        return Ok(BackendKind::Local);
    };
    match value.to_ascii_lowercase().as_str() {
        "local" => Ok(BackendKind::Local),
        "supabase" => Ok(BackendKind::Supabase),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected `local` or `supabase`".to_string(),
        }),
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
    }
}

fn parse_http_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason,
    };
    let parsed = Url::parse(value).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(invalid(format!("unsupported scheme `{scheme}`"))),
    }
}

fn default_data_dir(name: &str) -> PathBuf {
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR);
    base.push(name);
    base
}

/// Public prefix for locally stored objects, e.g. `https://intake.example.com/storage`.
///
/// Accepts a bare domain and repairs doubled schemes such as `http://https://`.
fn resolve_public_base_url(configured: Option<&str>, host: &str, port: u16) -> String {
    let raw = match configured {
        Some(value) => value.to_string(),
        None => {
            let host = if host == "0.0.0.0" { "localhost" } else { host };
            format!("{host}:{port}")
        }
    };
    let mut base = raw.trim().trim_end_matches('/').to_string();
    for (doubled, fixed) in [
        ("http://http://", "http://"),
        ("https://https://", "https://"),
        ("http://https://", "https://"),
        ("https://http://", "http://"),
    ] {
        while base.starts_with(doubled) {
            base = base.replacen(doubled, fixed, 1);
        }
    }
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    format!("{base}{LOCAL_STORAGE_ROUTE}")
}
