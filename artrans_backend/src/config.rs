use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArtransConfig {
    pub api_port: u16,
    pub paths: ArtransPaths,
}

impl ArtransConfig {
    /// Reads `ARTRANS_HOME` and `ARTRANS_API_PORT`; without a home override the
    /// data directory sits next to the executable.
    pub fn from_env() -> Result<Self> {
        let paths = match env::var("ARTRANS_HOME") {
            Ok(raw) if !raw.trim().is_empty() => ArtransPaths::from_base_dir(raw.trim())?,
            _ => ArtransPaths::discover()?,
        };
        Ok(Self {
            api_port: api_port_from_env(),
            paths,
        })
    }

    pub fn new(api_port: u16, paths: ArtransPaths) -> Self {
        Self { api_port, paths }
    }

    pub fn with_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        Ok(Self {
            api_port: api_port_from_env(),
            paths: ArtransPaths::from_base_dir(base)?,
        })
    }
}

fn api_port_from_env() -> u16 {
    env::var("ARTRANS_API_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8080)
}

#[derive(Debug, Clone, Default)]
pub struct ArtransPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl ArtransPaths {
    pub fn discover() -> Result<Self> {
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("artrans.db");
        Ok(Self {
            base,
            data_dir,
            db_path,
        })
    }
}

/// Operator-supplied overrides for where imported comments land.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTarget {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
}

impl ImportTarget {
    /// Blank values are treated as unspecified.
    pub fn new(site_name: Option<String>, site_url: Option<String>) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        }
        Self {
            site_name: non_blank(site_name),
            site_url: non_blank(site_url),
        }
    }

    /// Page keys are re-rooted on the target URL only when both overrides are set.
    pub fn url_resolver_enabled(&self) -> bool {
        self.site_name.is_some() && self.site_url.is_some()
    }
}
