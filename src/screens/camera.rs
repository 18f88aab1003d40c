use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use shared::Result;
use std::fmt;
use tracing::{debug, info, warn};

use crate::domains::invoices::InvoiceExtractor;
use crate::models::invoice::{ExtractedInvoice, Invoice};
use crate::models::scan::{BarcodeEvent, PermissionStatus, Symbology};
use crate::processing::extraction::{parse_extraction_response, prefill_description, prefill_title};
use crate::screens::Navigator;
use crate::store::{IdGenerator, InvoiceSink};

/// Platform camera permission prompt.
pub trait CameraPermissions {
    fn request(&mut self) -> PermissionStatus;
}

/// Editable confirmation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Fields carried over from a successful extraction.
    pub extracted: Option<ExtractedInvoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    /// `armed == false` after a detection was dismissed, until "scan again".
    Scanning { armed: bool },
    Loading { url: String },
    FormReview(FormState),
}

/// Handle for one in-flight extraction. Only accepted back by the same focus
/// session that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    generation: u64,
    pub url: String,
}

pub struct CameraScreen {
    permission: PermissionStatus,
    phase: ScanPhase,
    generation: u64,
    notice: Option<String>,
    timezone: Tz,
}

impl CameraScreen {
    pub fn new(timezone: Tz) -> Self {
        Self {
            permission: PermissionStatus::Undetermined,
            phase: ScanPhase::Scanning { armed: true },
            generation: 0,
            notice: None,
            timezone,
        }
    }

    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    pub fn phase(&self) -> &ScanPhase {
        &self.phase
    }

    pub fn set_permission(&mut self, status: PermissionStatus) {
        info!("🔐 Permiso de cámara: {:?}", status);
        self.permission = status;
    }

    pub fn request_permission(&mut self, permissions: &mut dyn CameraPermissions) -> PermissionStatus {
        let status = permissions.request();
        self.set_permission(status);
        status
    }

    /// Screen regained focus: start over and drop whatever was in flight.
    pub fn on_focus(&mut self) {
        self.generation += 1;
        self.phase = ScanPhase::Scanning { armed: true };
        self.notice = None;
        debug!("🔄 Cámara enfocada (sesión {})", self.generation);
    }

    /// Accepts the first QR detection while armed. Later detections are
    /// ignored until the screen is re-armed.
    pub fn on_barcode(&mut self, event: &BarcodeEvent) -> Option<ScanTicket> {
        if self.permission != PermissionStatus::Granted {
            debug!("📵 Detección ignorada: cámara sin permiso");
            return None;
        }
        if event.symbology != Symbology::Qr {
            debug!("Detección ignorada: simbología {:?}", event.symbology);
            return None;
        }
        if self.phase != (ScanPhase::Scanning { armed: true }) {
            debug!("⚠️ Detección duplicada ignorada");
            return None;
        }

        info!("🔍 QR detectado: {}", event.data);
        self.phase = ScanPhase::Loading {
            url: event.data.clone(),
        };
        Some(ScanTicket {
            generation: self.generation,
            url: event.data.clone(),
        })
    }

    /// Applies the extraction outcome. Returns `false` when the ticket is
    /// stale and the result was discarded.
    pub fn complete_extraction(
        &mut self,
        ticket: ScanTicket,
        outcome: Result<Value>,
        now: DateTime<Utc>,
    ) -> bool {
        let loading_this_url = matches!(&self.phase, ScanPhase::Loading { url } if *url == ticket.url);
        if ticket.generation != self.generation || !loading_this_url {
            warn!("🗑️ Resultado de extracción descartado para {}", ticket.url);
            return false;
        }

        let form = match outcome {
            Ok(body) => {
                let extracted = parse_extraction_response(&body, self.timezone, now);
                FormState {
                    url: ticket.url,
                    title: prefill_title(&extracted),
                    description: prefill_description(&extracted),
                    extracted: Some(extracted),
                }
            }
            Err(e) => {
                warn!("❌ Extracción fallida, entrada manual: {}", e);
                self.notice = Some(e.user_message().to_string());
                FormState {
                    url: ticket.url,
                    ..FormState::default()
                }
            }
        };

        self.phase = ScanPhase::FormReview(form);
        true
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        match &mut self.phase {
            ScanPhase::FormReview(form) => {
                form.title = title.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        match &mut self.phase {
            ScanPhase::FormReview(form) => {
                form.description = description.into();
                true
            }
            _ => false,
        }
    }

    /// Commits the form through the add-invoice capability. Blank title or
    /// description is a silent no-op.
    pub fn save(
        &mut self,
        sink: &mut dyn InvoiceSink,
        navigator: &mut dyn Navigator,
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> bool {
        let ScanPhase::FormReview(form) = &self.phase else {
            return false;
        };

        let title = form.title.trim();
        let description = form.description.trim();
        if title.is_empty() || description.is_empty() {
            debug!("Guardar ignorado: título o descripción vacíos");
            return false;
        }

        let extracted = form.extracted.clone();
        let invoice = Invoice {
            id: ids.next_id(now),
            url: form.url.clone(),
            title: title.to_string(),
            description: description.to_string(),
            date: extracted.as_ref().map(|e| e.date).unwrap_or(now),
            created_at: Some(now),
            total: extracted.as_ref().map(|e| e.total),
            descuentos: extracted.as_ref().map(|e| e.descuentos),
            itbms: extracted.as_ref().map(|e| e.itbms),
            emisor: extracted.as_ref().and_then(|e| e.emisor.clone()),
            products: extracted.and_then(|e| e.products),
        };

        sink.add_invoice(invoice);
        self.phase = ScanPhase::Scanning { armed: true };
        navigator.navigate_to_invoices();
        true
    }

    /// Leaves the form; the detector stays off until "scan again".
    pub fn cancel(&mut self) {
        if let ScanPhase::FormReview(_) = self.phase {
            self.phase = ScanPhase::Scanning { armed: false };
        }
    }

    /// Re-arms the detector. From `Loading` this also abandons the request.
    pub fn scan_again(&mut self) {
        if let ScanPhase::Loading { .. } = self.phase {
            self.generation += 1;
        }
        self.phase = ScanPhase::Scanning { armed: true };
    }

    /// One-shot user notice, cleared once read.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn view(&self) -> CameraView<'_> {
        match self.permission {
            PermissionStatus::Undetermined => return CameraView::RequestingPermission,
            PermissionStatus::Denied => return CameraView::PermissionDenied,
            PermissionStatus::Granted => {}
        }

        match &self.phase {
            ScanPhase::Scanning { armed } => CameraView::Scanning {
                can_scan_again: !armed,
            },
            ScanPhase::Loading { url } => CameraView::Loading { url },
            ScanPhase::FormReview(form) => CameraView::Form(form),
        }
    }
}

/// Async driver for one detection: disarm, call the service, fill the form.
pub async fn process_detection(
    screen: &mut CameraScreen,
    extractor: &dyn InvoiceExtractor,
    event: &BarcodeEvent,
) -> bool {
    let Some(ticket) = screen.on_barcode(event) else {
        return false;
    };
    let outcome = extractor.extract(&ticket.url).await;
    screen.complete_extraction(ticket, outcome, Utc::now())
}

// ============================================================================
// VIEW
// ============================================================================

#[derive(Debug, PartialEq)]
pub enum CameraView<'a> {
    RequestingPermission,
    PermissionDenied,
    Scanning { can_scan_again: bool },
    Loading { url: &'a str },
    Form(&'a FormState),
}

impl fmt::Display for CameraView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraView::RequestingPermission => writeln!(f, "Solicitando permiso de cámara..."),
            CameraView::PermissionDenied => {
                writeln!(f, "Sin acceso a la cámara")?;
                writeln!(f, "Por favor, habilita los permisos de cámara en tu dispositivo")?;
                writeln!(f, "[permiso] Conceder permiso")
            }
            CameraView::Scanning { can_scan_again } => {
                writeln!(f, "📷 Apunta la cámara a un código QR")?;
                writeln!(f, "El escaneo es automático")?;
                if *can_scan_again {
                    writeln!(f, "[otra] Escanear de nuevo")?;
                }
                Ok(())
            }
            CameraView::Loading { url } => {
                writeln!(f, "Obteniendo datos de la factura...")?;
                writeln!(f, "{}", url)
            }
            CameraView::Form(form) => {
                writeln!(f, "Nueva Factura")?;
                writeln!(f, "URL escaneada: {}", form.url)?;
                writeln!(f, "Título: {}", form.title)?;
                writeln!(f, "Descripción: {}", form.description)?;
                writeln!(f, "[guardar] Guardar   [cancelar] Cancelar")
            }
        }
    }
}
