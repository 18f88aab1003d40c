use crate::models::invoice::{Emisor, ExtractedInvoice, Product};
use crate::processing::coercion::{coerce_field, parse_invoice_date};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

pub const UNKNOWN_INVOICE_TITLE: &str = "Factura desconocida";
pub const UNKNOWN_ISSUER: &str = "Emisor desconocido";

// ============================================================================
// RESPONSE PARSING
// ============================================================================

/// Reads an extraction service body field by field. A bad field degrades to
/// its default and never aborts the rest of the parse.
pub fn parse_extraction_response(body: &Value, tz: Tz, now: DateTime<Utc>) -> ExtractedInvoice {
    ExtractedInvoice {
        date: parse_invoice_date(body.get("fecha").and_then(Value::as_str), tz, now),
        total: coerce_field(body.get("total")),
        descuentos: coerce_field(body.get("descuentos")),
        itbms: coerce_field(body.get("itbms")),
        emisor: body.get("emisor").and_then(parse_emisor),
        products: body.get("productos").and_then(parse_products),
    }
}

fn parse_emisor(value: &Value) -> Option<Emisor> {
    let fields = value.as_object()?;
    Some(Emisor {
        nombre: fields.get("nombre").and_then(text_field),
        ruc: fields.get("ruc").and_then(text_field),
        dv: fields.get("dv").and_then(text_field),
    })
}

fn parse_products(value: &Value) -> Option<Vec<Product>> {
    let items = value.as_array()?;
    Some(items.iter().map(parse_product).collect())
}

fn parse_product(item: &Value) -> Product {
    Product {
        descripcion: item
            .get("descripcion")
            .and_then(text_field)
            .unwrap_or_default(),
        cantidad: coerce_field(item.get("cantidad")),
        precio_unitario: coerce_field(item.get("precioUnitario")),
        descuento: coerce_field(item.get("descuento")),
        precio_total: coerce_field(item.get("precioTotal")),
    }
}

/// RUC and DV sometimes arrive as bare numbers.
fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

// ============================================================================
// FORM PRE-FILL
// ============================================================================

pub fn prefill_title(extracted: &ExtractedInvoice) -> String {
    extracted
        .emisor
        .as_ref()
        .and_then(Emisor::display_name)
        .unwrap_or(UNKNOWN_INVOICE_TITLE)
        .to_string()
}

pub fn prefill_description(extracted: &ExtractedInvoice) -> String {
    let issuer = extracted
        .emisor
        .as_ref()
        .and_then(Emisor::display_name)
        .unwrap_or(UNKNOWN_ISSUER);
    format!("Factura por ${:.2} de {}", extracted.total, issuer)
}
