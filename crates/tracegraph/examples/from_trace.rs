//! Example: Laying out a trace built in code
//!
//! This example builds a small trace with the trace model types directly,
//! without decoding a document, and prints the graph description.

use indexmap::IndexMap;

use tracegraph::{
    GraphBuilder,
    config::{AppConfig, LayoutConfig, OutputConfig},
    trace::{TraceRecord, UpstreamCalls},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building trace...\n");

    let database = TraceRecord::new("database")
        .with_kind("gRPC")
        .with_duration("3.1ms")
        .with_response_code(0);

    let payments = TraceRecord::new("payments")
        .with_kind("HTTP")
        .with_uri("http://payments:9090")
        .with_duration("8.4ms")
        .with_response_code(200)
        .with_upstream_calls(UpstreamCalls::Sequence(vec![database]));

    let currency = TraceRecord::new("currency")
        .with_kind("HTTP")
        .with_response_code(500)
        .with_error("upstream timed out");

    let mut upstreams = IndexMap::new();
    upstreams.insert("http://payments:9090".to_string(), payments);
    upstreams.insert("http://currency:9090".to_string(), currency);

    let web = TraceRecord::new("web")
        .with_kind("HTTP")
        .with_uri("/")
        .with_ip_addresses(vec!["10.5.0.2".to_string()])
        .with_duration("15.9ms")
        .with_body("<h1>Hello World</h1>")
        .with_response_code(200)
        .with_upstream_calls(UpstreamCalls::Mapping(upstreams));

    println!(
        "{} records, {} failed, {} levels deep\n",
        web.records_count(),
        web.errors_count(),
        web.depth()
    );

    let config = AppConfig::new(LayoutConfig::new(50, 50, 250, 200), OutputConfig::new(true));
    let builder = GraphBuilder::new(config);

    let graph = builder.transform(&web);
    println!("{}", builder.render_json(&graph)?);

    Ok(())
}
