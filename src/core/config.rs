use std::env;

/// Extension kept by bucket listings unless configured otherwise.
pub const DEFAULT_LIST_EXTENSION: &str = ".parquet";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub list_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            force_path_style: false,
            list_extension: DEFAULT_LIST_EXTENSION.to_string(),
        }
    }
}

impl StorageConfig {
    /// Reads the storage settings from the environment.
    ///
    /// Credentials and the default region are resolved later by the AWS
    /// provider chain; only overrides live here.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORAGE_S3_FORCE_PATH_STYLE` is not a boolean or
    /// `STORAGE_LIST_EXTENSION` is empty.
    pub fn from_env() -> Result<Self, String> {
        let force_path_style = match env::var("STORAGE_S3_FORCE_PATH_STYLE") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| format!("STORAGE_S3_FORCE_PATH_STYLE: invalid boolean {raw:?}"))?,
            Err(_) => false,
        };

        let list_extension = match env::var("STORAGE_LIST_EXTENSION") {
            Ok(ext) if ext.trim().is_empty() => {
                return Err("STORAGE_LIST_EXTENSION: must not be empty".to_string());
            }
            Ok(ext) => ext,
            Err(_) => DEFAULT_LIST_EXTENSION.to_string(),
        };

        Ok(Self {
            region: env::var("STORAGE_S3_REGION").ok(),
            endpoint_url: env::var("STORAGE_S3_ENDPOINT_URL").ok(),
            force_path_style,
            list_extension,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
