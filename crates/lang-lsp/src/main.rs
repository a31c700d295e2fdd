//! Lang Language Server binary.
//!
//! Usage:
//!   lang-lsp [options]
//!
//! Options:
//!   --stdio      Use stdio for communication (default)
//!   --log        Enable logging to stderr
//!   --version    Show version information
//!   --help       Show this help message

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut enable_logging = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => {}
            "--log" => enable_logging = true,
            "--version" => {
                println!("lang-lsp {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if enable_logging {
        // Stdout carries the protocol; logs go to stderr only.
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
        tracing::info!("Lang Language Server starting (stdio)");
    }

    match lang_lsp::run_stdio() {
        Ok(code) => process::exit(code),
        Err(error) => {
            eprintln!("LSP server error: {error}");
            process::exit(1);
        }
    }
}

fn print_help() {
    eprintln!("Lang Language Server");
    eprintln!();
    eprintln!("Usage: lang-lsp [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stdio      Use stdio for communication (default)");
    eprintln!("  --log        Enable logging to stderr");
    eprintln!("  --version    Show version information");
    eprintln!("  --help       Show this help message");
}
