// Carrion Language Server Protocol implementation
//
// Provides IDE features:
// - Syntax error diagnostics
// - Completion (member, general, snippets)
// - Hover information (builtins, grimoires, spells, variables)
// - Go to definition
// - Document symbols, semantic tokens, formatting

mod server;
mod tracing_setup;

use server::CarrionLanguageServer;
use tokio::net::TcpListener;
use tower_lsp::{LspService, Server};

enum Transport {
    Stdio,
    Tcp(u16),
}

const DEFAULT_TCP_PORT: u16 = 7777;

#[tokio::main]
async fn main() {
    let (transport, log_file) = parse_args();
    let _log_guard = tracing_setup::init(log_file.as_deref());

    match transport {
        Transport::Stdio => serve_stdio().await,
        Transport::Tcp(port) => serve_tcp(port).await,
    }
}

fn parse_args() -> (Transport, Option<String>) {
    let args: Vec<String> = std::env::args().collect();
    let mut transport = Transport::Stdio;
    let mut log_file = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => transport = Transport::Stdio,
            "--tcp" => {
                if let Some(port) = args.get(i + 1).and_then(|p| p.parse::<u16>().ok()) {
                    transport = Transport::Tcp(port);
                    i += 1;
                } else {
                    transport = Transport::Tcp(DEFAULT_TCP_PORT);
                }
            }
            "--log-file" => {
                if let Some(path) = args.get(i + 1) {
                    log_file = Some(path.clone());
                    i += 1;
                } else {
                    eprintln!("--log-file requires a path");
                    std::process::exit(2);
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("carrion-lsp {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                std::process::exit(2);
            }
        }
        i += 1;
    }

    (transport, log_file)
}

fn print_usage() {
    println!("Usage: carrion-lsp [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --stdio            Serve over stdin/stdout (default)");
    println!("  --tcp [PORT]       Listen on 127.0.0.1:PORT (default {DEFAULT_TCP_PORT})");
    println!("  --log-file PATH    Append logs to PATH instead of stderr");
    println!("  -h, --help         Show this help");
    println!("  -V, --version      Show version");
}

async fn serve_stdio() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = build_service();
    Server::new(stdin, stdout, socket).serve(service).await;
}

/// One accepted connection at a time; the listener keeps accepting after
/// a client disconnects.
async fn serve_tcp(port: u16) {
    let listener = match TcpListener::bind(("127.0.0.1", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to listen on port {port}: {err}");
            std::process::exit(1);
        }
    };
    tracing::info!("carrion-lsp listening on port {port}");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                tracing::warn!("failed to accept connection: {err}");
                continue;
            }
        };
        tracing::info!("client connected from {peer}");

        let (read, write) = tokio::io::split(stream);
        let (service, socket) = build_service();
        Server::new(read, write, socket).serve(service).await;
        tracing::info!("client {peer} disconnected");
    }
}

fn build_service() -> (
    LspService<CarrionLanguageServer>,
    tower_lsp::ClientSocket,
) {
    LspService::build(CarrionLanguageServer::new)
        .custom_method(
            "carrion/refreshCatalog",
            CarrionLanguageServer::refresh_catalog,
        )
        .custom_method("carrion/loadPackage", CarrionLanguageServer::load_package)
        .finish()
}
