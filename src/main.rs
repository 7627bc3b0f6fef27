use std::fs::File;
use std::sync::Arc;

use bookmate::core::config;
use bookmate::service::HttpBookService;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "bookmate", about = "Conversational book recommendations in the terminal")]
struct Args {
    /// Recommender backend, e.g. http://localhost:5000
    #[arg(short, long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to bookmate.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("bookmate.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, args.base_url.as_deref());
    log::info!(
        "BookMate starting up against {} (timeout: {:?})",
        resolved.base_url,
        resolved.request_timeout
    );

    let service = HttpBookService::new(resolved.base_url.clone(), resolved.request_timeout)?;
    bookmate::tui::run(&resolved, Arc::new(service))?;
    Ok(())
}
