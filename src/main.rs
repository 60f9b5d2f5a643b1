use log::{info, warn};
use tokio::signal;
use url::Url;
use variantscraper::fetchers::HttpFetcher;
use variantscraper::{HarvestConfig, Harvester, HtmlListingRenderer, ListingRenderer};

const SEARCH: &str = "https://www.rockbottomgolf.com/golf-clubs/hybrids/#/?profile_id=7ce0e69e2cb37bcee2e3073332381477&session_id=43e6a6e8-d701-11e9-b23e-0242ac110003&authorized_profile_id=&Searchcat1=Woods&Searchcat2=Hybrids&Gender=Mens&Dexterity=Right&Flex=Regular&sort_by_field=Price+Low+To+High&search_return=all&Searchcondition=Used";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .init();

    let mut args = std::env::args().skip(1);
    let search_url = Url::parse(&args.next().unwrap_or_else(|| SEARCH.to_string()))?;

    let mut config = HarvestConfig::default();
    if let Some(limit) = args.next() {
        config = config.with_max_urls(limit.parse()?);
    }

    let renderer = HtmlListingRenderer::new(Box::new(HttpFetcher::from_config(&config)?))?;
    let links = renderer.list(&search_url).await?;

    let harvester = Harvester::with_http(config)?;
    info!(
        "Found {} products, scraping with concurrency {}",
        links.len(),
        harvester.config().concurrency
    );
    let cancel = harvester.cancel_token();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let result = harvester.scrape(links).await?;

    for failure in &result.failures {
        warn!("{}: {}", failure.url, failure.error);
    }
    println!("{}", serde_json::to_string_pretty(&result.records)?);

    let summary = &result.summary;
    info!(
        "{} URLs: {} with variants, {} empty, {} failed",
        summary.total_urls, summary.succeeded, summary.empty, summary.failed
    );
    harvester.stats().log_summary();

    Ok(())
}
