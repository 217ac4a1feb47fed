//! Debug script to check extraction against a live page
//!
//! Run with: cargo run --example debug_stream -p streamscope-core -- <url>
//! Set RUST_LOG=streamscope_core=debug to see fetch and field logs.

use std::sync::Arc;

use streamscope_core::{Downloader, HttpDownloader, StreamScope};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args().nth(1).unwrap_or_else(|| {
        "https://rumble.com/vdofb7-1-year-old-pulls-pony-behind-electric-car.html".to_string()
    });

    let downloader = Arc::new(HttpDownloader::new()?);
    let scope = StreamScope::with_downloader(downloader.clone())?;

    let (service, link) = scope.link_handler(&url)?;
    println!("Service {} resolved id '{}' -> {}\n", service, link.id, link.url);

    match scope.stream_info(&url).await {
        Ok(info) => {
            println!("Title:    {}", info.name);
            println!("Uploader: {} ({})", info.uploader_name, info.uploader_url);
            println!("Length:   {}s", info.length);
            println!("Views:    {}", info.view_count);
            println!("Type:     {:?}", info.stream_type);
            println!("Video:    {} streams", info.video_streams.len());
            println!("Audio:    {} streams", info.audio_streams.len());
            println!("Related:  {} items", info.related_items.len());
            if info.is_partial() {
                println!("\n✗ {} fields failed:", info.errors.len());
                for error in &info.errors {
                    println!("  {}: {}", error.field, error.message);
                }
            } else {
                println!("\n✓ All fields extracted");
            }
        }
        Err(e) => {
            println!("✗ Failed to load stream: {}", e);

            // Save the raw page for inspection
            let response = downloader.get(&link.url, &[]).await?;
            std::fs::write("debug_stream_page.html", &response.body)?;
            println!("HTML saved to debug_stream_page.html");
        }
    }

    Ok(())
}
