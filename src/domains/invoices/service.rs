use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared::config::ExtractionConfig;
use shared::{AppError, Result, ServiceClient};
use tracing::{debug, error, info};

/// Remote service that turns a receipt URL into structured invoice fields.
#[async_trait]
pub trait InvoiceExtractor: Send + Sync {
    /// Returns the raw JSON body; field coercion happens on the caller side.
    async fn extract(&self, url: &str) -> Result<Value>;
}

#[derive(Serialize)]
struct ExtractionRequest<'a> {
    url: &'a str,
}

pub struct HttpInvoiceExtractor {
    client: ServiceClient,
    endpoint: String,
}

impl HttpInvoiceExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = ServiceClient::new(
            config.base_url.clone(),
            "invoice-extraction".to_string(),
            config.timeout_seconds,
        )?;
        debug!("⏱️ Timeout de extracción: {:?}", client.timeout());
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl InvoiceExtractor for HttpInvoiceExtractor {
    async fn extract(&self, url: &str) -> Result<Value> {
        if url.trim().is_empty() {
            return Err(AppError::validation("QR payload is empty"));
        }
        info!("📡 Solicitando extracción de factura para: {}", url);

        match self.client.post(&self.endpoint, &ExtractionRequest { url }).await {
            Ok(body) => {
                info!("✅ Extracción completada");
                Ok(body)
            }
            Err(e) => {
                error!("❌ Extracción fallida ({}): {}", e.error_code(), e);
                Err(e)
            }
        }
    }
}
