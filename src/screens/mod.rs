pub mod camera;
pub mod invoice_list;

pub use camera::{process_detection, CameraPermissions, CameraScreen, CameraView, ScanPhase, ScanTicket};
pub use invoice_list::{InvoiceDetail, InvoiceListScreen, InvoiceListView, InvoiceRow};

/// Bottom tabs of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Camera,
    Invoices,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Camera => "Cámara",
            Tab::Invoices => "Facturas",
        }
    }
}

/// The one navigation action the camera screen needs.
pub trait Navigator {
    fn navigate_to_invoices(&mut self);
}
