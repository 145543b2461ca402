/* demos/demo.rs */

use regional::{
    AddressResolver, MemoryVersionStore, RegionClassification, RegionalContent, render_footer,
    resolve_client_address, select_footer_variant, select_query_filter,
};
use regional::migration::{THEME_VERSION_KEY, VersionStore, maybe_update_version};
use std::collections::HashMap;

fn main() {
    println!("=== Regional Content Examples ===\n");

    // Example 1: Header priority
    example_1_header_priority();

    // Example 2: Forwarded chains
    example_2_forwarded_chain();

    // Example 3: Classification to content
    example_3_content_selection();

    // Example 4: Query filters
    example_4_query_filters();

    // Example 5: Theme version check
    example_5_version_check();

    println!("=== All examples completed! ===");
}

fn example_1_header_priority() {
    println!("Example 1: Client-IP beats X-Forwarded-For beats the remote address");

    let mut headers = HashMap::new();
    headers.insert("x-forwarded-for".to_string(), "203.0.113.1".to_string());
    println!(
        "Forwarded only: {}",
        resolve_client_address(&headers, Some("192.0.2.10"))
    );

    headers.insert("client-ip".to_string(), "198.51.100.7".to_string());
    println!(
        "With Client-IP: {}",
        resolve_client_address(&headers, Some("192.0.2.10"))
    );

    println!(
        "No headers: {}",
        resolve_client_address(&HashMap::new(), Some("192.0.2.10"))
    );
    println!();
}

fn example_2_forwarded_chain() {
    println!("Example 2: Multi-hop X-Forwarded-For");

    let mut headers = HashMap::new();
    headers.insert(
        "x-forwarded-for".to_string(),
        "2.16.0.1, 10.0.0.5".to_string(),
    );

    println!("Verbatim: {}", resolve_client_address(&headers, None));
    let resolver = AddressResolver::new().split_forwarded(true);
    println!("First hop: {}", resolver.resolve(&headers, None));
    println!();
}

fn example_3_content_selection() {
    println!("Example 3: Classification drives the footer variant");

    let german = RegionClassification::from_country("2.16.0.1".into(), "DE");
    let unknown = RegionClassification::unknown("203.0.113.1".into());

    for classification in [german, unknown] {
        let content = RegionalContent::from_classification(classification);
        println!(
            "{} ({:?}) -> {} footer, disclaimer {}",
            content.classification.address,
            content.classification.country_code,
            content.footer.name(),
            content.footer.disclaimer.loss_percentage
        );
    }

    match render_footer(&select_footer_variant(true)) {
        Ok(html) => println!("EU footer: {} bytes of HTML", html.len()),
        Err(e) => println!("EU footer failed to render: {e}"),
    }
    println!();
}

fn example_4_query_filters() {
    println!("Example 4: Post visibility filters");

    for is_eu in [true, false] {
        let filter = select_query_filter(is_eu);
        match serde_json::to_string(&filter) {
            Ok(json) => println!("is_eu={is_eu}: {json}"),
            Err(e) => println!("is_eu={is_eu}: failed to serialize: {e}"),
        }
    }
    println!();
}

fn example_5_version_check() {
    println!("Example 5: Theme version check");

    let store = MemoryVersionStore::new();
    for version in ["2.7.1", "2.8.1", "2.8.1"] {
        match maybe_update_version(&store, version) {
            Ok(written) => println!(
                "{version}: written={written}, stored={:?}",
                store.get(THEME_VERSION_KEY)
            ),
            Err(e) => println!("{version}: {e}"),
        }
    }
    println!();
}
