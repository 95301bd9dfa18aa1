//! Benchmark run - Reference wiring
//!
//! Shows how to assemble the refinement loop and the benchmark harness
//! around a collaborator set. This example uses the library's mock
//! collaborators so it runs offline; swap them for real implementations
//! of the four traits to benchmark against a live marketplace.
//!
//! ```bash
//! cargo run --example benchmark_run
//! ```

use appraisal::testing::{evaluation_payload, TestScenario};
use appraisal::{BenchmarkConfig, BenchmarkHarness, GroundTruthItem, RefinementLoop, WorkflowConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let workdir = tempfile::tempdir().expect("create scratch directory");
    let corpus_path = workdir.path().join("listings.json");

    // The mock evaluator finds one confident match per item, priced a
    // little above the label, stopping each run after round one.
    let (analyzer, queries, scraper, evaluator) = TestScenario::new(&corpus_path)
        .with_evaluations([
            evaluation_payload(&[("2718936409", true, "105 €")], 85.0, "sufficient", ""),
            evaluation_payload(&[("2718936410", true, "110 €")], 75.0, "sufficient", ""),
        ])
        .build();

    let workflow_config = WorkflowConfig::default()
        .with_corpus_path(&corpus_path)
        .with_artifacts_root(workdir.path().join("runs"));
    let workflow = RefinementLoop::with_config(analyzer, queries, scraper, evaluator, workflow_config);

    let harness = BenchmarkHarness::with_config(
        workflow,
        BenchmarkConfig::default()
            .with_seed(7)
            .with_results_dir(workdir.path().join("benchmark_results")),
    );

    let corpus = vec![
        GroundTruthItem {
            id: "2718936409".to_string(),
            title: "iPhone 12 128GB".to_string(),
            category: "electronics".to_string(),
            price: "100 €".to_string(),
            local_images: vec!["images/2718936409_0.jpg".to_string()],
        },
        GroundTruthItem {
            id: "2718936410".to_string(),
            title: "iPhone 12 64GB".to_string(),
            category: "electronics".to_string(),
            price: "100 €".to_string(),
            local_images: vec!["images/2718936410_0.jpg".to_string()],
        },
    ];

    let report = harness.run(&corpus, None).await;
    print!("{}", report.render());
}
