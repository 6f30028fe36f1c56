use async_trait::async_trait;
use reqwest::{
    Certificate, Client, StatusCode, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use kc_core::{DirectoryError, WorkloadDirectory};
use kc_model::WorkloadInstance;

use crate::{config::KubeConfig, errors::KubeError};

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<Object>,
    #[serde(default)]
    metadata: ListMeta,
}

#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    #[serde(rename = "continue", default)]
    continue_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Object {
    metadata: ObjectMeta,
}

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// [`WorkloadDirectory`] talking plain HTTP(S) to a Kubernetes API server.
#[derive(Clone, Debug)]
pub struct KubeDirectory {
    client: Client,
    base: Url,
    page_size: u32,
}

impl KubeDirectory {
    pub fn new(cfg: &KubeConfig) -> Result<Self, KubeError> {
        cfg.validate()?;
        let base = Url::parse(cfg.api_server.trim())
            .map_err(|e| KubeError::InvalidConfig(format!("api server url: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &cfg.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| KubeError::InvalidConfig("token is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(cfg.timeout)
            .danger_accept_invalid_certs(cfg.insecure_skip_tls_verify);
        if let Some(pem) = &cfg.ca_pem {
            builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
        }

        Ok(Self {
            client: builder.build()?,
            base,
            page_size: cfg.page_size,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, KubeError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| KubeError::InvalidConfig("api server url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Collect every page of a list call.
    async fn list_names(&self, mut url: Url, selector: Option<&str>) -> Result<Vec<String>, KubeError> {
        {
            let mut query = url.query_pairs_mut();
            if let Some(selector) = selector {
                query.append_pair("labelSelector", selector);
            }
            query.append_pair("limit", &self.page_size.to_string());
        }

        let mut names = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut page_url = url.clone();
            if let Some(token) = &token {
                page_url.query_pairs_mut().append_pair("continue", token);
            }
            trace!(url = %page_url, "listing");

            let response = self.client.get(page_url).send().await?;
            let body = check(response).await?;
            let page: ObjectList = serde_json::from_str(&body).map_err(|e| {
                KubeError::InvalidResponse(format!("failed to parse list: {e}, body: {body}"))
            })?;
            names.extend(page.items.into_iter().map(|o| o.metadata.name));

            match page.metadata.continue_token.filter(|t| !t.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(names)
    }
}

async fn check(response: reqwest::Response) -> Result<String, KubeError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    let message = serde_json::from_str::<Status>(&body)
        .ok()
        .map(|s| s.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(body);
    Err(KubeError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl WorkloadDirectory for KubeDirectory {
    #[instrument(level = "debug", skip(self))]
    async fn list_namespaces(&self, selector: &str) -> Result<Vec<String>, DirectoryError> {
        let url = self.url(&["api", "v1", "namespaces"])?;
        let namespaces = self.list_names(url, Some(selector)).await?;
        debug!(count = namespaces.len(), "listed namespaces");
        Ok(namespaces)
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_instances(&self, namespace: &str) -> Result<Vec<WorkloadInstance>, DirectoryError> {
        let url = self.url(&["api", "v1", "namespaces", namespace, "pods"])?;
        let pods = self.list_names(url, None).await?;
        Ok(pods
            .into_iter()
            .map(|name| WorkloadInstance::new(namespace, name))
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<(), DirectoryError> {
        let url = self.url(&["api", "v1", "namespaces", namespace, "pods", name])?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(KubeError::from)?;
        if response.status() == StatusCode::ACCEPTED {
            debug!("pod deletion accepted");
        }
        check(response).await?;
        Ok(())
    }
}
