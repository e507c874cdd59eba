use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

use conan_center_mcp::service::{ConanCenterService, ServiceConfig};

/// MCP server for querying ConanCenter package metadata with response caching
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the ConanCenter remote REST API
    #[arg(long, env = "CONAN_MCP_REMOTE_URL", default_value = "https://center2.conan.io")]
    remote_url: String,

    /// Base URL for raw conan-center-index files
    #[arg(
        long,
        env = "CONAN_MCP_INDEX_URL",
        default_value = "https://raw.githubusercontent.com/conan-io/conan-center-index/master"
    )]
    index_url: String,

    /// Override the search-result cache TTL, in seconds
    #[arg(long, env = "CONAN_MCP_SEARCH_TTL_SECS")]
    search_ttl_secs: Option<u64>,

    /// Override the README/examples cache TTL, in seconds
    #[arg(long, env = "CONAN_MCP_README_TTL_SECS")]
    readme_ttl_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting ConanCenter MCP server on stdio...");

    let config = ServiceConfig {
        remote_url: args.remote_url,
        index_url: args.index_url,
        search_ttl_secs: args.search_ttl_secs,
        readme_ttl_secs: args.readme_ttl_secs,
    };

    let conan_service = ConanCenterService::new(config)?;

    // Serve using stdio transport
    let service = conan_service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;
    Ok(())
}
