use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Server configuration, resolved once at startup and shared read-only with the handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Uploaded templates are spooled here for the duration of a request.
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Pre-filled into the input form; every request still carries its own endpoint.
    pub default_api_url: String,
    pub default_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            default_api_url: DEFAULT_API_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("TEXTDECK_BIND") {
            config.bind_addr = bind;
        }
        if let Some(dir) = get("TEXTDECK_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("TEXTDECK_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("TEXTDECK_MAX_UPLOAD_MB") {
            match raw.parse::<usize>() {
                Ok(mb) if mb > 0 => config.max_upload_bytes = mb * 1024 * 1024,
                _ => log::warn!(
                    "TEXTDECK_MAX_UPLOAD_MB={raw:?} is not a positive integer, using {DEFAULT_MAX_UPLOAD_MB}"
                ),
            }
        }
        if let Some(url) = get("TEXTDECK_DEFAULT_API_URL") {
            config.default_api_url = url;
        }
        if let Some(model) = get("TEXTDECK_DEFAULT_MODEL") {
            config.default_model = model;
        }

        config
    }

    /// Create the upload directory if it is missing. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        log::debug!("Upload directory ready at {}", self.upload_dir.display());
        Ok(())
    }
}
