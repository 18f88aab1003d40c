#[cfg(test)]
mod integration_tests {
    use factura_scan::domains::invoices::{HttpInvoiceExtractor, InvoiceExtractor};
    use factura_scan::models::scan::{BarcodeEvent, PermissionStatus};
    use factura_scan::screens::camera::ScanPhase;
    use factura_scan::screens::{CameraPermissions, CameraView, InvoiceListView, Tab};
    use factura_scan::AppState;
    use serde_json::json;
    use shared::config::{AppConfig, ExtractionConfig};
    use shared::Config;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const RECEIPT_URL: &str =
        "https://dgi-fep.mef.gob.pa/Consultas/FacturasPorQR?chFE=FE01200002679372-1-844914-7300002025051500311570140020317481978892&iAmb=1";

    struct Allow;

    impl CameraPermissions for Allow {
        fn request(&mut self) -> PermissionStatus {
            PermissionStatus::Granted
        }
    }

    fn config_for(server: &MockServer) -> Config {
        Config {
            extraction: ExtractionConfig {
                base_url: server.uri(),
                endpoint: "/api/invoices/extract".to_string(),
                timeout_seconds: Some(5),
                invoice_timezone: chrono_tz::UTC,
            },
            app: AppConfig {
                environment: "test".to_string(),
                log_level: "debug".to_string(),
            },
        }
    }

    async fn app_with_response(server: &MockServer, response: ResponseTemplate) -> AppState {
        Mock::given(method("POST"))
            .and(path("/api/invoices/extract"))
            .and(body_json(json!({ "url": RECEIPT_URL })))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;

        let mut state = AppState::new(&config_for(server)).expect("Failed to create AppState for test");
        state.request_camera_permission(&mut Allow);
        state
    }

    fn sample_body() -> serde_json::Value {
        json!({
            "fecha": "15/05/2025 09:50:04",
            "total": "107.00",
            "descuentos": null,
            "itbms": 7,
            "emisor": { "nombre": "Lum Corporation", "ruc": "155622190-2-2017", "dv": "45" },
            "productos": [
                {
                    "descripcion": "Asesoría y Desarrollo",
                    "cantidad": 1,
                    "precioUnitario": "100.00",
                    "descuento": 0,
                    "precioTotal": "100.00"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_scan_extract_save_and_list() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        assert!(state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await);

        match state.camera.view() {
            CameraView::Form(form) => {
                assert_eq!(form.title, "Lum Corporation");
                assert_eq!(form.description, "Factura por $107.00 de Lum Corporation");
            }
            other => panic!("expected form, got {:?}", other),
        }

        assert!(state.save_invoice());
        assert_eq!(state.active_tab(), Tab::Invoices);
        assert_eq!(state.invoices().len(), 1);

        let saved = state.invoices().last().unwrap();
        assert_eq!(saved.url, RECEIPT_URL);
        assert_eq!(saved.total, Some(107.0));
        assert_eq!(saved.descuentos, Some(0.0));
        assert_eq!(saved.itbms, Some(7.0));
        assert_eq!(saved.date.to_rfc3339(), "2025-05-15T09:50:04+00:00");
        assert_eq!(saved.products.as_ref().map(Vec::len), Some(1));
        assert_eq!(state.camera.phase(), &ScanPhase::Scanning { armed: true });

        assert!(state.open_invoice(0));
        let view = state.invoice_list.view(state.invoices());
        let InvoiceListView::Rows { rows, detail: Some(detail) } = view else {
            panic!("expected rows with detail");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(detail.total, "$107.00");
        assert_eq!(detail.tax.as_deref(), Some("$7.00"));
        assert!(detail.discount.is_none());
        assert!(detail.to_string().contains("Asesoría y Desarrollo"));
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_manual_entry() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(500).set_body_string("scraper down")).await;

        assert!(state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await);

        match state.camera.view() {
            CameraView::Form(form) => {
                assert_eq!(form.url, RECEIPT_URL);
                assert!(form.title.is_empty());
                assert!(form.description.is_empty());
            }
            other => panic!("expected form, got {:?}", other),
        }
        assert!(state.camera.take_notice().is_some());

        state.camera.set_title("Factura de luz");
        state.camera.set_description("Factura correspondiente a noviembre 2024");
        assert!(state.save_invoice());

        let saved = state.invoices().last().unwrap();
        assert_eq!(saved.title, "Factura de luz");
        assert!(saved.total.is_none());
        assert!(saved.emisor.is_none());
    }

    #[tokio::test]
    async fn test_blank_title_does_not_save_or_navigate() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await;
        state.camera.set_title("   ");

        assert!(!state.save_invoice());
        assert!(state.invoices().is_empty());
        assert_eq!(state.active_tab(), Tab::Camera);
        assert_eq!(
            state.invoice_list.view(state.invoices()),
            InvoiceListView::Empty
        );
    }

    #[tokio::test]
    async fn test_duplicate_detections_issue_one_request() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        assert!(state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await);
        assert!(!state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await);
        assert!(!state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await);
        // the mock's expect(1) is verified when the server drops
    }

    #[tokio::test]
    async fn test_refocus_after_save_rearms_camera() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await;
        state.save_invoice();
        state.switch_tab(Tab::Camera);

        assert_eq!(state.camera.view(), CameraView::Scanning { can_scan_again: false });
        assert_eq!(state.invoices().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_qr_image_file() {
        use image::{DynamicImage, ImageFormat, Luma};
        use qrcode::QrCode;
        use std::io::Cursor;

        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        let rendered = QrCode::new(RECEIPT_URL.as_bytes())
            .unwrap()
            .render::<Luma<u8>>()
            .min_dimensions(400, 400)
            .build();
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(rendered)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let path = std::env::temp_dir().join(format!("factura_scan_it_{}.png", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();

        let handled = state.scan_image(&path).await;
        std::fs::remove_file(&path).ok();

        assert!(handled.unwrap());
        assert!(matches!(state.camera.phase(), ScanPhase::FormReview(_)));
    }

    #[tokio::test]
    async fn test_scan_image_requires_camera_permission() {
        let server = MockServer::start().await;
        let mut state = AppState::new(&config_for(&server)).unwrap();

        let err = state.scan_image("no-existe.png").await.unwrap_err();

        assert_eq!(err.error_code(), "PERMISSION_DENIED");
        assert!(state.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_hidden_form_cannot_be_edited_or_saved() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;

        state.handle_detection(&BarcodeEvent::qr(RECEIPT_URL)).await;
        state.switch_tab(Tab::Invoices);

        assert!(!state.edit_title("Factura de luz"));
        assert!(!state.edit_description("Noviembre 2024"));
        assert!(!state.save_invoice());
        assert!(state.invoices().is_empty());
        assert_eq!(state.active_tab(), Tab::Invoices);

        state.switch_tab(Tab::Camera);
        assert!(!state.save_invoice());
        assert_eq!(state.camera.view(), CameraView::Scanning { can_scan_again: false });
        assert!(state.invoices().is_empty());
    }

    #[tokio::test]
    async fn test_response_after_refocus_is_discarded() {
        let server = MockServer::start().await;
        let mut state =
            app_with_response(&server, ResponseTemplate::new(200).set_body_json(sample_body())).await;
        let extractor = HttpInvoiceExtractor::new(&config_for(&server).extraction).unwrap();

        let ticket = state.camera.on_barcode(&BarcodeEvent::qr(RECEIPT_URL)).unwrap();
        state.switch_tab(Tab::Invoices);
        state.switch_tab(Tab::Camera);

        let outcome = extractor.extract(&ticket.url).await;
        assert!(outcome.is_ok());
        assert!(!state.camera.complete_extraction(ticket, outcome, chrono::Utc::now()));

        assert_eq!(state.camera.phase(), &ScanPhase::Scanning { armed: true });
        assert!(!state.save_invoice());
        assert!(state.invoices().is_empty());
    }
}
