use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved receipt. Built once by the camera screen and never mutated after
/// it is appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    /// Issuance date reported by the invoice itself.
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descuentos: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itbms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emisor: Option<Emisor>,
    /// `None` when the service returned no product data, `Some(vec![])` when
    /// it returned an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emisor {
    pub nombre: Option<String>,
    pub ruc: Option<String>,
    pub dv: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub descripcion: String,
    pub cantidad: f64,
    pub precio_unitario: f64,
    pub descuento: f64,
    pub precio_total: f64,
}

/// Fields recovered from the extraction service, before the user confirms
/// the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedInvoice {
    pub date: DateTime<Utc>,
    pub total: f64,
    pub descuentos: f64,
    pub itbms: f64,
    pub emisor: Option<Emisor>,
    pub products: Option<Vec<Product>>,
}

impl Emisor {
    /// Issuer name, when present and not blank.
    pub fn display_name(&self) -> Option<&str> {
        self.nombre
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

impl Invoice {
    /// Date the record entered the local list, falling back to the
    /// issuance date for records built without one.
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(self.date)
    }
}
