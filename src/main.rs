use anyhow::Result;
use factura_scan::{
    models::scan::{BarcodeEvent, PermissionStatus},
    screens::{CameraPermissions, Tab},
    AppState,
};
use shared::Config;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
Comandos:
  escanear <ruta>      decodifica el QR de una imagen
  qr <texto>           simula una detección con el texto dado
  titulo <texto>       edita el título del formulario
  descripcion <texto>  edita la descripción del formulario
  guardar | cancelar | otra
  camara | facturas    cambia de pestaña
  ver <n> | cerrar     abre o cierra el detalle de una factura
  permiso              vuelve a solicitar acceso a la cámara
  ayuda | salir";

#[derive(Debug, PartialEq)]
enum Command {
    ScanImage(String),
    Qr(String),
    Title(String),
    Description(String),
    Save,
    Cancel,
    ScanAgain,
    Tab(Tab),
    Open(usize),
    Close,
    Permission,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (name, arg) = match line.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name.to_lowercase().as_str() {
        "escanear" if !arg.is_empty() => Command::ScanImage(arg.to_string()),
        "qr" if !arg.is_empty() => Command::Qr(arg.to_string()),
        "titulo" | "título" => Command::Title(arg.to_string()),
        "descripcion" | "descripción" => Command::Description(arg.to_string()),
        "guardar" => Command::Save,
        "cancelar" => Command::Cancel,
        "otra" => Command::ScanAgain,
        "camara" | "cámara" => Command::Tab(Tab::Camera),
        "facturas" => Command::Tab(Tab::Invoices),
        "ver" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Command::Open(n - 1),
            _ => Command::Unknown(line.to_string()),
        },
        "cerrar" => Command::Close,
        "permiso" => Command::Permission,
        "ayuda" | "?" => Command::Help,
        "salir" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

/// Camera permission answered on the terminal.
struct TerminalPermissions;

impl CameraPermissions for TerminalPermissions {
    fn request(&mut self) -> PermissionStatus {
        print!("¿Permitir acceso a la cámara? [s/n] ");
        io::stdout().flush().ok();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => PermissionStatus::Denied,
            Ok(_) => match answer.trim().to_lowercase().as_str() {
                "s" | "si" | "sí" | "y" | "yes" => PermissionStatus::Granted,
                _ => PermissionStatus::Denied,
            },
        }
    }
}

fn render(state: &mut AppState) {
    println!("\n── {} ──", state.active_tab().label());
    match state.active_tab() {
        Tab::Camera => {
            print!("{}", state.camera.view());
            if let Some(notice) = state.camera.take_notice() {
                println!("⚠️  {}", notice);
            }
        }
        Tab::Invoices => print!("{}", state.invoice_list.view(state.invoices())),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.app.log_level))
        .with_writer(io::stderr)
        .init();

    info!("🧾 factura_scan iniciado ({})", config.app.environment);
    if config.is_development() {
        debug!("⚙️ Configuración: {:?}", config.extraction);
    }

    let mut state = AppState::new(&config)?;
    render(&mut state);
    state.request_camera_permission(&mut TerminalPermissions);
    render(&mut state);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Command::ScanImage(path) => {
                state.switch_tab(Tab::Camera);
                if let Err(e) = state.scan_image(&path).await {
                    warn!(
                        "❌ Escaneo fallido: {}",
                        serde_json::to_string(&e.to_response()).unwrap_or_else(|_| e.to_string())
                    );
                    println!("⚠️  {}", e.user_message());
                }
            }
            Command::Qr(text) => {
                state.switch_tab(Tab::Camera);
                state.handle_detection(&BarcodeEvent::qr(text)).await;
            }
            Command::Title(text) => {
                state.edit_title(text);
            }
            Command::Description(text) => {
                state.edit_description(text);
            }
            Command::Save => {
                state.save_invoice();
            }
            Command::Cancel => state.cancel_form(),
            Command::ScanAgain => state.scan_again(),
            Command::Tab(tab) => state.switch_tab(tab),
            Command::Open(index) => {
                state.switch_tab(Tab::Invoices);
                state.open_invoice(index);
            }
            Command::Close => state.invoice_list.dismiss(),
            Command::Permission => {
                state.request_camera_permission(&mut TerminalPermissions);
            }
            Command::Help => {
                println!("{}", HELP);
                continue;
            }
            Command::Quit => break,
            Command::Unknown(text) => {
                println!("Comando desconocido: {} (escribe 'ayuda')", text);
                continue;
            }
        }

        render(&mut state);
    }

    info!("👋 {} facturas en memoria al salir", state.invoices().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("escanear recibo.jpg"), Command::ScanImage("recibo.jpg".to_string()));
        assert_eq!(parse_command("qr https://x.y/z?a=1 b"), Command::Qr("https://x.y/z?a=1 b".to_string()));
        assert_eq!(parse_command("titulo   Factura de luz "), Command::Title("Factura de luz".to_string()));
        assert_eq!(parse_command("titulo"), Command::Title(String::new()));
        assert_eq!(parse_command("GUARDAR"), Command::Save);
        assert_eq!(parse_command("facturas"), Command::Tab(Tab::Invoices));
        assert_eq!(parse_command("ver 2"), Command::Open(1));
        assert_eq!(parse_command("salir"), Command::Quit);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(parse_command("ver 0"), Command::Unknown(_)));
        assert!(matches!(parse_command("ver dos"), Command::Unknown(_)));
        assert!(matches!(parse_command("escanear"), Command::Unknown(_)));
        assert!(matches!(parse_command("bailar"), Command::Unknown(_)));
    }
}
