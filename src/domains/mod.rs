pub mod qr;
pub mod invoices;
