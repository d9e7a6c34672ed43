//! Product catalog sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use salva_core::config::CatalogConfig;
use salva_core::product::Product;
use salva_core::{Result, SalvaError};

const SERVICE: &str = "catalog";

/// Lists the products on sale, in shelf order.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>>;
}

/// Reads `GET {base_url}/api/products`.
#[derive(Clone)]
pub struct HttpProductCatalog {
    client: Client,
    base_url: String,
}

impl HttpProductCatalog {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = crate::http::build_client(SERVICE, None)?;
        Ok(Self::new(client, config.base_url.clone()))
    }

    fn products_url(&self) -> String {
        format!("{}/api/products", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn list(&self) -> Result<Vec<Product>> {
        let url = self.products_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| crate::http::transport_error(SERVICE, e))?;

        let response = crate::http::ensure_success(SERVICE, response).await?;

        response.json::<Vec<Product>>().await.map_err(|e| {
            SalvaError::transport(SERVICE, format!("Failed to parse products: {}", e))
        })
    }
}

/// Serves the product list from a JSON seed file.
#[derive(Debug, Clone)]
pub struct FileProductCatalog {
    path: PathBuf,
}

impl FileProductCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProductCatalog for FileProductCatalog {
    async fn list(&self) -> Result<Vec<Product>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SalvaError::io(format!(
                "Failed to read product catalog at {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
