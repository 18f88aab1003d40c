pub mod service;

pub use service::{HttpInvoiceExtractor, InvoiceExtractor};
