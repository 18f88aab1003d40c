use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::models::invoice::{Emisor, Invoice, Product};

pub const EMPTY_LIST_MESSAGE: &str = "No hay facturas guardadas. Escanea un código QR para agregar una.";
pub const NO_PRODUCTS_MESSAGE: &str = "No hay detalles de productos";
pub const ZERO_PRODUCTS_MESSAGE: &str = "0 productos";

const DESCRIPTION_PREVIEW_CHARS: usize = 80;

fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Read-only list of saved invoices with an optional detail overlay.
pub struct InvoiceListScreen {
    selected: Option<usize>,
    timezone: Tz,
}

impl InvoiceListScreen {
    pub fn new(timezone: Tz) -> Self {
        Self {
            selected: None,
            timezone,
        }
    }

    /// Opens the detail overlay. Out-of-range rows are ignored.
    pub fn select(&mut self, invoices: &[Invoice], index: usize) -> bool {
        if index < invoices.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn format_date(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.timezone).format("%d/%m/%Y").to_string()
    }

    pub fn view(&self, invoices: &[Invoice]) -> InvoiceListView {
        if invoices.is_empty() {
            return InvoiceListView::Empty;
        }

        let rows = invoices.iter().map(|invoice| self.row(invoice)).collect();
        let detail = self
            .selected
            .and_then(|index| invoices.get(index))
            .map(|invoice| self.detail(invoice));

        InvoiceListView::Rows { rows, detail }
    }

    fn row(&self, invoice: &Invoice) -> InvoiceRow {
        InvoiceRow {
            title: invoice.title.clone(),
            description: truncate(&invoice.description, DESCRIPTION_PREVIEW_CHARS),
            total: format_money(invoice.total.unwrap_or(0.0)),
            registered: self.format_date(invoice.registered_at()),
            issued: self.format_date(invoice.date),
        }
    }

    fn detail(&self, invoice: &Invoice) -> InvoiceDetail {
        let nonzero = |amount: Option<f64>| amount.filter(|v| *v != 0.0).map(format_money);

        InvoiceDetail {
            title: invoice.title.clone(),
            description: invoice.description.clone(),
            url: invoice.url.clone(),
            issued: self.format_date(invoice.date),
            registered: self.format_date(invoice.registered_at()),
            issuer: invoice.emisor.as_ref().map(IssuerBlock::from),
            products: invoice
                .products
                .as_ref()
                .map(|products| products.iter().map(ProductLine::from).collect()),
            discount: nonzero(invoice.descuentos),
            tax: nonzero(invoice.itbms),
            total: format_money(invoice.total.unwrap_or(0.0)),
        }
    }
}

// ============================================================================
// VIEW MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceListView {
    Empty,
    Rows {
        rows: Vec<InvoiceRow>,
        detail: Option<InvoiceDetail>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRow {
    pub title: String,
    pub description: String,
    pub total: String,
    pub registered: String,
    pub issued: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssuerBlock {
    pub nombre: String,
    pub ruc: Option<String>,
    pub dv: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    pub descripcion: String,
    pub cantidad: f64,
    pub precio_unitario: String,
    pub descuento: Option<String>,
    pub precio_total: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    pub title: String,
    pub description: String,
    pub url: String,
    pub issued: String,
    pub registered: String,
    pub issuer: Option<IssuerBlock>,
    /// `None` when the service returned no product data.
    pub products: Option<Vec<ProductLine>>,
    pub discount: Option<String>,
    pub tax: Option<String>,
    pub total: String,
}

impl From<&Emisor> for IssuerBlock {
    fn from(emisor: &Emisor) -> Self {
        Self {
            nombre: emisor.display_name().unwrap_or("Emisor desconocido").to_string(),
            ruc: emisor.ruc.clone(),
            dv: emisor.dv.clone(),
        }
    }
}

impl From<&Product> for ProductLine {
    fn from(product: &Product) -> Self {
        Self {
            descripcion: product.descripcion.clone(),
            cantidad: product.cantidad,
            precio_unitario: format_money(product.precio_unitario),
            descuento: (product.descuento != 0.0).then(|| format_money(product.descuento)),
            precio_total: format_money(product.precio_total),
        }
    }
}

impl fmt::Display for InvoiceListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceListView::Empty => writeln!(f, "{}", EMPTY_LIST_MESSAGE),
            InvoiceListView::Rows { rows, detail } => {
                for (index, row) in rows.iter().enumerate() {
                    writeln!(f, "[{}] {}  {}", index + 1, row.title, row.total)?;
                    writeln!(f, "    {}", row.description)?;
                    writeln!(f, "    Registrada: {}  Emitida: {}", row.registered, row.issued)?;
                }
                if let Some(detail) = detail {
                    writeln!(f)?;
                    write!(f, "{}", detail)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for InvoiceDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==== {} ====", self.title)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "Emitida: {}  Registrada: {}", self.issued, self.registered)?;
        writeln!(f, "URL: {}", self.url)?;

        if let Some(issuer) = &self.issuer {
            writeln!(f, "-- Emisor --")?;
            writeln!(f, "{}", issuer.nombre)?;
            match (&issuer.ruc, &issuer.dv) {
                (Some(ruc), Some(dv)) => writeln!(f, "RUC: {}  DV: {}", ruc, dv)?,
                (Some(ruc), None) => writeln!(f, "RUC: {}", ruc)?,
                (None, Some(dv)) => writeln!(f, "DV: {}", dv)?,
                (None, None) => {}
            }
        }

        writeln!(f, "-- Productos --")?;
        match &self.products {
            Some(products) if products.is_empty() => writeln!(f, "{}", ZERO_PRODUCTS_MESSAGE)?,
            Some(products) => {
                for line in products {
                    write!(f, "{} x{} @ {}", line.descripcion, line.cantidad, line.precio_unitario)?;
                    if let Some(descuento) = &line.descuento {
                        write!(f, " (desc. {})", descuento)?;
                    }
                    writeln!(f, " = {}", line.precio_total)?;
                }
            }
            None => writeln!(f, "{}", NO_PRODUCTS_MESSAGE)?,
        }

        writeln!(f, "-- Totales --")?;
        if let Some(discount) = &self.discount {
            writeln!(f, "Descuentos: {}", discount)?;
        }
        if let Some(tax) = &self.tax {
            writeln!(f, "ITBMS: {}", tax)?;
        }
        writeln!(f, "Total: {}", self.total)?;
        writeln!(f, "[cerrar] Cerrar")
    }
}
