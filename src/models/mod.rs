pub mod invoice;
pub mod scan;

pub use invoice::{Emisor, ExtractedInvoice, Invoice, Product};
pub use scan::{BarcodeEvent, PermissionStatus, Symbology};
