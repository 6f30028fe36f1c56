use std::{fs, path::Path, time::Duration};

use crate::errors::KubeError;

const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const SERVICE_ACCOUNT_CA: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

#[derive(Clone, Debug)]
pub struct KubeConfig {
    /// Base URL of the API server, e.g. `https://kubernetes.default.svc`.
    pub api_server: String,
    pub token: Option<String>,
    /// PEM bundle trusted in addition to the system roots.
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub timeout: Duration,
    /// `limit` for list calls; follow-up pages use the returned `continue` token.
    pub page_size: u32,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            api_server: "https://kubernetes.default.svc".to_string(),
            token: None,
            ca_pem: None,
            insecure_skip_tls_verify: false,
            timeout: Duration::from_secs(10),
            page_size: 500,
        }
    }
}

impl KubeConfig {
    pub fn new(api_server: impl Into<String>) -> Self {
        Self {
            api_server: api_server.into(),
            ..Self::default()
        }
    }

    /// Service account credentials mounted into every pod, when present.
    pub fn with_service_account(mut self) -> Result<Self, KubeError> {
        if self.token.is_none() && Path::new(SERVICE_ACCOUNT_TOKEN).exists() {
            self = self.with_token_file(SERVICE_ACCOUNT_TOKEN)?;
        }
        if self.ca_pem.is_none() && Path::new(SERVICE_ACCOUNT_CA).exists() {
            self = self.with_ca_file(SERVICE_ACCOUNT_CA)?;
        }
        Ok(self)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_token_file(mut self, path: impl AsRef<Path>) -> Result<Self, KubeError> {
        let token = read(path.as_ref())?;
        self.token = Some(String::from_utf8_lossy(&token).trim().to_string());
        Ok(self)
    }

    pub fn with_ca_file(mut self, path: impl AsRef<Path>) -> Result<Self, KubeError> {
        self.ca_pem = Some(read(path.as_ref())?);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), KubeError> {
        let url = self.api_server.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(KubeError::InvalidConfig(format!(
                "api server must be an http(s) url, got {url:?}"
            )));
        }
        if self.token.as_deref().is_some_and(str::is_empty) {
            return Err(KubeError::InvalidConfig("token must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(KubeError::InvalidConfig("timeout must be positive".into()));
        }
        if self.page_size == 0 {
            return Err(KubeError::InvalidConfig("page size must be positive".into()));
        }
        Ok(())
    }
}

fn read(path: &Path) -> Result<Vec<u8>, KubeError> {
    fs::read(path).map_err(|source| KubeError::Io {
        path: path.display().to_string(),
        source,
    })
}
