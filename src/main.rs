use clap::{Arg, Command};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};

mod mcp;
mod tools;
mod utils;

use mcp::server::{DocumentState, LinkServer, ServerConfig};
use utils::openrouter::{DEFAULT_MAX_ANSWER_TOKENS, DEFAULT_MODEL};

const DEFAULT_PDF_PATH: &str = "assets/links.pdf";

#[tokio::main]
async fn main() {
    let command = Command::new("mcp-pdflinks")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A Model Context Protocol server for a categorized PDF link directory")
        .long_about(
            "This MCP server provides the following tools:\n\
             - list-categories: List the link categories found in the PDF\n\
             - category-links: List the links of one category, or all of them\n\
             - search-links: Search links by title or category\n\
             - ask-document: Answer a question about the links via OpenRouter\n\
             - reload-document: Re-read the PDF and rebuild the catalog",
        )
        .arg(
            Arg::new("pdf")
                .long("pdf")
                .value_name("PATH")
                .help("Path to the link directory PDF (default: assets/links.pdf)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .value_name("KEY")
                .help("OpenRouter API key for the ask-document tool")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .value_name("NAME")
                .help("Model routed to by OpenRouter (default: openrouter/auto)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("max-answer-tokens")
                .long("max-answer-tokens")
                .value_name("N")
                .help("Cap on answer length in tokens (default: 256)")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors and skip the startup banner (for MCP clients)")
                .action(clap::ArgAction::SetTrue),
        );

    #[cfg(feature = "voice")]
    let command = command
        .arg(
            Arg::new("record-seconds")
                .long("record-seconds")
                .value_name("SECONDS")
                .help("Clip length for voice-question (default: 5, max: 30)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("whisper-model")
                .long("whisper-model")
                .value_name("PATH")
                .help("Path to a ggml whisper model for transcription")
                .action(clap::ArgAction::Set),
        );

    let matches = command.get_matches();

    // Logging goes to stderr only; stdout is reserved for JSON-RPC.
    let max_level = if matches.get_flag("quiet") {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(max_level)
        .init();

    let pdf_path = matches
        .get_one::<String>("pdf")
        .cloned()
        .or_else(|| env::var("PDFLINKS_PDF").ok())
        .unwrap_or_else(|| DEFAULT_PDF_PATH.to_string());
    let pdf_path = PathBuf::from(pdf_path);

    let api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| env::var("OPENROUTER_API_KEY").ok());

    // Log configuration status without exposing the secret itself
    match &api_key {
        Some(_) => info!("ask-document tool enabled"),
        None => {
            warn!("OpenRouter API key not found - ask-document tool will be disabled")
        }
    }

    let model = matches
        .get_one::<String>("model")
        .cloned()
        .or_else(|| env::var("PDFLINKS_MODEL").ok())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let max_answer_tokens = matches
        .get_one::<u32>("max-answer-tokens")
        .copied()
        .unwrap_or(DEFAULT_MAX_ANSWER_TOKENS);

    #[cfg(feature = "voice")]
    let record_seconds = matches
        .get_one::<u64>("record-seconds")
        .copied()
        .unwrap_or(utils::voice::DEFAULT_RECORD_SECONDS);

    #[cfg(feature = "voice")]
    let whisper_model = matches
        .get_one::<String>("whisper-model")
        .cloned()
        .or_else(|| env::var("PDFLINKS_WHISPER_MODEL").ok())
        .map(PathBuf::from);

    if !matches.get_flag("quiet") {
        eprintln!(
            "mcp-pdflinks {} - PDF link directory over MCP\n",
            env!("CARGO_PKG_VERSION")
        );
    }

    // A missing or unreadable document is fatal at startup, before the
    // transport opens.
    info!("Loading link directory from {}", pdf_path.display());
    let state = match DocumentState::load(&pdf_path) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load document: {}", e);
            process::exit(1);
        }
    };

    let config = ServerConfig {
        pdf_path,
        api_key,
        model,
        max_answer_tokens,
        #[cfg(feature = "voice")]
        record_seconds,
        #[cfg(feature = "voice")]
        whisper_model,
    };

    info!("Starting MCP server...");
    let mut server = LinkServer::new(config, state);
    if let Err(e) = server.start().await {
        error!("Failed to start server: {}", e);
        process::exit(1);
    }
}
