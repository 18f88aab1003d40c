use chrono::{DateTime, Utc};
use tracing::info;

use crate::models::invoice::Invoice;

/// Add-invoice capability handed to the camera screen. Appending always
/// succeeds.
pub trait InvoiceSink {
    fn add_invoice(&mut self, invoice: Invoice);
}

/// In-memory, append-only invoice list owned by the root controller. Lives as
/// long as the process.
#[derive(Debug, Default)]
pub struct InvoiceStore {
    invoices: Vec<Invoice>,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot in insertion order.
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}

impl InvoiceSink for InvoiceStore {
    fn add_invoice(&mut self, invoice: Invoice) {
        info!("💾 Factura agregada: {} ({})", invoice.title, invoice.id);
        self.invoices.push(invoice);
    }
}

/// Timestamp ids (milliseconds since epoch). Two saves in the same
/// millisecond get consecutive values so ids are never reused.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_millis();
        let id = match self.last {
            Some(last) if candidate <= last => last + 1,
            _ => candidate,
        };
        self.last = Some(id);
        id.to_string()
    }
}
