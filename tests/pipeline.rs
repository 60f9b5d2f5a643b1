use url::Url;
use variantscraper::core::ConfigError;
use variantscraper::fetchers::HttpFetcher;
use variantscraper::{
    scrape, HarvestConfig, HarvestError, Harvester, HtmlListingRenderer, ListingRenderer,
    ProductUrl, Summary, VariantRecord,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_page(name: &str, variants: &[&str]) -> String {
    let options: String = variants
        .iter()
        .enumerate()
        .map(|(i, v)| format!(r#"<option data-product-attribute-value="{}">{}</option>"#, i, v))
        .collect();
    format!(
        r#"<html><body>
             <h1 class="productView-title">{}</h1>
             <select class="form-select form-select--small form-select--alt">{}</select>
           </body></html>"#,
        name, options
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lists_and_scrapes_a_category() {
    let server = MockServer::start().await;
    let listing = r#"
        <ul class="productGrid">
          <li><a href="/cobra-f-max/">Cobra</a></li>
          <li><a href="/gift-card/">Gift card</a></li>
          <li><a href="/discontinued/">Gone</a></li>
        </ul>
    "#;
    mount_page(&server, "/hybrids/", 200, listing.to_string()).await;
    mount_page(
        &server,
        "/cobra-f-max/",
        200,
        product_page("Cobra F-Max", &["3H Regular", "4H Regular"]),
    )
    .await;
    mount_page(&server, "/gift-card/", 200, "<h1 class=\"productView-title\">Gift</h1>".into()).await;
    mount_page(&server, "/discontinued/", 404, "gone".into()).await;

    let config = HarvestConfig::default().with_concurrency(2);
    let renderer =
        HtmlListingRenderer::new(Box::new(HttpFetcher::from_config(&config).unwrap())).unwrap();
    let search_url = Url::parse(&format!("{}/hybrids/", server.uri())).unwrap();
    let links = renderer.list(&search_url).await.unwrap();
    assert_eq!(links.len(), 3);

    let harvester = Harvester::with_http(config).unwrap();
    let mut result = harvester.scrape(links).await.unwrap();
    result.records.sort();

    let cobra: ProductUrl = format!("{}/cobra-f-max/", server.uri()).parse().unwrap();
    assert_eq!(
        result.records,
        vec![
            VariantRecord::new("Cobra F-Max", "3H Regular", cobra.clone()),
            VariantRecord::new("Cobra F-Max", "4H Regular", cobra),
        ]
    );
    assert_eq!(
        result.summary,
        Summary {
            total_urls: 3,
            succeeded: 1,
            empty: 1,
            failed: 1,
        }
    );
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].url.as_str().ends_with("/discontinued/"));

    let stats = harvester.stats().get_stats();
    assert_eq!(stats.total_requests, 3);
    assert_eq!(stats.status_codes.get(&404), Some(&1));
}

#[tokio::test]
async fn scrape_rejects_an_empty_url_list() {
    let result = scrape(Vec::new(), 4).await;
    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::NoUrls))
    ));
}

#[tokio::test]
async fn scrape_with_default_fetcher() {
    let server = MockServer::start().await;
    mount_page(&server, "/wedge/", 200, product_page("Vokey SM9", &["52.08", "56.10"])).await;

    let url: ProductUrl = format!("{}/wedge/", server.uri()).parse().unwrap();
    let result = scrape(vec![url.clone(), url], 1).await.unwrap();

    assert_eq!(result.records.len(), 4);
    assert_eq!(result.summary.succeeded, 2);
}
