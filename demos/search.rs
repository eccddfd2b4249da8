//! Full-text search example.
//!
//! Searches English Wikipedia for the first command-line argument and
//! fetches the wikitext of the top hit.

use std::time::Duration;
use wikinet::client::WikiClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "rust".to_string());

    let client = WikiClient::builder("https://en.wikipedia.org/w/api.php")
        .user_agent("wikinet-demo/0.1 (ops@example.org)")
        .timeout(Duration::from_secs(15))
        .maxlag(5)
        .build()?;

    let hits = client.search(&query, 10).await?;
    println!("{} results for {:?}", hits.len(), query);
    for hit in &hits {
        println!("  {} ({} words)", hit.title, hit.word_count);
    }

    if let Some(first) = hits.first() {
        let page = client.query_page(&first.title).await?;
        let chars = page.content().map(str::len).unwrap_or(0);
        println!(
            "\n{} is at revision {:?}, {} bytes of wikitext",
            page.title, page.last_rev_id, chars
        );
    }

    println!("Cookies held: {}", client.cookie_jar().len());
    Ok(())
}
