//! Concurrent load against the barcode endpoint.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use barcode_server::config::ServerConfig;

mod common;

#[tokio::test]
async fn test_concurrent_requests_agree() {
    let server = common::start_server(ServerConfig::default()).await;

    let concurrency = 10;
    let requests_per_task = 20;
    let total_requests = concurrency * requests_per_task;

    let client = reqwest::Client::new();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task in 0..concurrency {
        let client = client.clone();
        // Half the tasks share one symbol, the rest each render their own.
        let text = if task % 2 == 0 {
            "SHARED".to_string()
        } else {
            format!("TASK{}", task)
        };
        let url = server.url(&format!("/barcode/code128/240x60/{}.png", text));
        tasks.push(tokio::spawn(async move {
            let mut results = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                let res = client.get(&url).send().await.unwrap();
                assert!(res.status().is_success());
                let etag = res.headers()["etag"].to_str().unwrap().to_string();
                let body = res.bytes().await.unwrap();
                results.push((text.clone(), etag, body, req_start.elapsed()));
            }
            results
        }));
    }

    let mut all = Vec::new();
    for task in tasks {
        all.extend(task.await.unwrap());
    }
    let duration = start.elapsed();
    assert_eq!(all.len(), total_requests);

    let shared: Vec<_> = all.iter().filter(|(text, ..)| text == "SHARED").collect();
    let etags: HashSet<_> = shared.iter().map(|(_, etag, ..)| etag.clone()).collect();
    assert_eq!(etags.len(), 1);
    assert!(shared.windows(2).all(|pair| pair[0].2 == pair[1].2));

    let distinct: HashSet<_> = all.iter().map(|(_, etag, ..)| etag.clone()).collect();
    assert_eq!(distinct.len(), 1 + concurrency / 2);

    let mut latencies: Vec<Duration> = all.iter().map(|(.., latency)| *latency).collect();
    latencies.sort();
    let p50 = latencies[latencies.len() / 2];
    let p99 = latencies[(latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    server.stop().await.unwrap();
}
