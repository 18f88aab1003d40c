use chrono::Utc;
use shared::{AppError, Config, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domains::invoices::{HttpInvoiceExtractor, InvoiceExtractor};
use crate::domains::qr::QrService;
use crate::models::invoice::Invoice;
use crate::models::scan::{BarcodeEvent, PermissionStatus};
use crate::screens::{process_detection, CameraPermissions, CameraScreen, InvoiceListScreen, Navigator, Tab};
use crate::store::{IdGenerator, InvoiceStore};

/// Tracks the active bottom tab.
#[derive(Debug, Default)]
pub struct TabNavigator {
    active: Tab,
}

impl TabNavigator {
    pub fn active(&self) -> Tab {
        self.active
    }
}

impl Navigator for TabNavigator {
    fn navigate_to_invoices(&mut self) {
        self.active = Tab::Invoices;
    }
}

/// Root controller. Owns the only mutable invoice list and hands each screen
/// the narrow capability it needs.
pub struct AppState {
    store: InvoiceStore,
    ids: IdGenerator,
    navigator: TabNavigator,
    pub camera: CameraScreen,
    pub invoice_list: InvoiceListScreen,
    extractor: Arc<dyn InvoiceExtractor>,
    qr_service: QrService,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let extractor = HttpInvoiceExtractor::new(&config.extraction)?;
        info!(
            "🚀 Extraction service: {}{}",
            config.extraction.base_url, config.extraction.endpoint
        );
        Ok(Self::with_extractor(config, Arc::new(extractor)))
    }

    pub fn with_extractor(config: &Config, extractor: Arc<dyn InvoiceExtractor>) -> Self {
        let timezone = config.extraction.invoice_timezone;
        Self {
            store: InvoiceStore::new(),
            ids: IdGenerator::new(),
            navigator: TabNavigator::default(),
            camera: CameraScreen::new(timezone),
            invoice_list: InvoiceListScreen::new(timezone),
            extractor,
            qr_service: QrService::new(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.navigator.active()
    }

    /// Switches tabs. Focusing the camera resets its flow.
    pub fn switch_tab(&mut self, tab: Tab) {
        if self.navigator.active == tab {
            return;
        }
        self.navigator.active = tab;
        match tab {
            Tab::Camera => self.camera.on_focus(),
            Tab::Invoices => self.invoice_list.dismiss(),
        }
    }

    pub fn invoices(&self) -> &[Invoice] {
        self.store.invoices()
    }

    pub fn request_camera_permission(&mut self, permissions: &mut dyn CameraPermissions) -> PermissionStatus {
        self.camera.request_permission(permissions)
    }

    /// Feeds one detector event through the camera flow.
    pub async fn handle_detection(&mut self, event: &BarcodeEvent) -> bool {
        let extractor = Arc::clone(&self.extractor);
        process_detection(&mut self.camera, extractor.as_ref(), event).await
    }

    /// Decodes an image file and feeds the result to the detector.
    pub async fn scan_image(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        if self.camera.permission() != PermissionStatus::Granted {
            return Err(AppError::PermissionDenied);
        }
        let event = self.qr_service.scan_file(path).await?;
        Ok(self.handle_detection(&event).await)
    }

    /// Form edits only reach the camera while its tab is on screen.
    pub fn edit_title(&mut self, title: impl Into<String>) -> bool {
        self.camera_focused() && self.camera.set_title(title)
    }

    pub fn edit_description(&mut self, description: impl Into<String>) -> bool {
        self.camera_focused() && self.camera.set_description(description)
    }

    pub fn save_invoice(&mut self) -> bool {
        if !self.camera_focused() {
            debug!("Guardar ignorado: la cámara no está en pantalla");
            return false;
        }
        let saved = self
            .camera
            .save(&mut self.store, &mut self.navigator, &mut self.ids, Utc::now());
        if saved {
            self.invoice_list.dismiss();
        }
        saved
    }

    pub fn cancel_form(&mut self) {
        if self.camera_focused() {
            self.camera.cancel();
        }
    }

    pub fn scan_again(&mut self) {
        if self.camera_focused() {
            self.camera.scan_again();
        }
    }

    fn camera_focused(&self) -> bool {
        self.navigator.active == Tab::Camera
    }

    pub fn open_invoice(&mut self, index: usize) -> bool {
        self.invoice_list.select(self.store.invoices(), index)
    }
}
