//! Integration tests for the refinement loop and the benchmark harness.
//!
//! These tests drive the full workflow through mock collaborators:
//! 1. Analyze the photographs
//! 2. Generate and refine queries from evaluator feedback
//! 3. Scrape, gate on the corpus, evaluate
//! 4. Accumulate matches and statistics
//! 5. Stop on a sufficient verdict or an exhausted budget

use std::path::PathBuf;

use appraisal::testing::{
    evaluation_payload, MockAnalyzer, MockEvaluator, MockQueryGenerator, MockScraper, TestScenario,
};
use appraisal::{
    BenchmarkConfig, BenchmarkHarness, GroundTruthItem, RefinementLoop, StatisticsPolicy,
    WorkflowConfig,
};
use serde_json::json;
use tempfile::TempDir;

fn corpus_path(dir: &TempDir) -> PathBuf {
    dir.path().join("listings.json")
}

fn images() -> Vec<String> {
    vec!["photos/item_0.jpg".to_string(), "photos/item_1.jpg".to_string()]
}

fn loop_with(
    scenario: TestScenario,
    config: WorkflowConfig,
) -> RefinementLoop<MockAnalyzer, MockQueryGenerator, MockScraper, MockEvaluator> {
    let (analyzer, queries, scraper, evaluator) = scenario.build();
    RefinementLoop::with_config(analyzer, queries, scraper, evaluator, config)
}

#[tokio::test]
async fn sufficient_verdict_stops_the_loop_early() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus).with_evaluations([
        evaluation_payload(&[("1", true, "50 €")], 40.0, "not sufficient", "add the model"),
        evaluation_payload(&[("2", true, "60 €")], 80.0, "sufficient", ""),
    ]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    assert!(result.success);
    assert!(!result.is_fatal());
    assert_eq!(result.history.len(), 2);
    assert_eq!(result.best_iteration, 2);
    assert_eq!(result.best.as_ref().unwrap().match_percentage, 80.0);
    assert!(result.item_description.is_some());
}

#[tokio::test]
async fn feedback_flows_into_the_next_round() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let evaluator = MockEvaluator::scripted([
        evaluation_payload(&[], 0.0, "not sufficient", "include the storage size"),
        evaluation_payload(&[("1", true, "70 €")], 90.0, "sufficient", ""),
    ]);
    let queries = MockQueryGenerator::scripted(["iphone 12", "iphone 12 128gb"]);
    let (analyzer, _, scraper, _) = TestScenario::new(&corpus).build();
    let workflow = RefinementLoop::with_config(
        analyzer,
        queries.clone(),
        scraper,
        evaluator.clone(),
        WorkflowConfig::default().with_corpus_path(&corpus),
    );

    let result = workflow.run(&images()).await;

    assert!(result.success);
    // The generator saw the evaluator's feedback on the regeneration call.
    assert_eq!(queries.feedback_seen(), vec!["", "include the storage size"]);
    // The evaluator saw the regenerated query in round 2.
    let calls = evaluator.calls();
    assert_eq!(calls[0].query, "iphone 12");
    assert_eq!(calls[1].query, "iphone 12 128gb");
    assert_eq!(calls[1].feedback, "include the storage size");
    assert_eq!(result.history[1].query, "iphone 12 128gb");
}

#[tokio::test]
async fn budget_exhaustion_keeps_the_strictly_best_round() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    // 40 → 70 → 60: round 2 wins and round 3 does not displace it.
    let scenario = TestScenario::new(&corpus).with_evaluations([
        evaluation_payload(&[("1", true, "50 €")], 40.0, "not sufficient", "a"),
        evaluation_payload(&[("2", true, "55 €")], 70.0, "not sufficient", "b"),
        evaluation_payload(&[("3", true, "60 €")], 60.0, "not sufficient", "c"),
    ]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    assert!(!result.success);
    assert_eq!(result.history.len(), 3);
    assert_eq!(result.best_iteration, 2);
    assert_eq!(result.best.as_ref().unwrap().match_percentage, 70.0);
}

#[tokio::test]
async fn image_analysis_rejection_is_fatal() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scraper = MockScraper::new(&corpus);
    let scenario = TestScenario::new(&corpus)
        .with_analyzer(MockAnalyzer::rejecting("images show two different items"))
        .with_scraper(scraper.clone());
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("images show two different items"));
    assert_eq!(result.best_iteration, 0);
    assert!(result.best.is_none());
    assert!(result.history.is_empty());
    // No search budget was spent.
    assert!(scraper.calls().is_empty());
}

#[tokio::test]
async fn missing_corpus_skips_rounds_but_consumes_budget() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scraper = MockScraper::new(&corpus).inert();
    let evaluator = MockEvaluator::default();
    let scenario = TestScenario::new(&corpus)
        .with_scraper(scraper.clone())
        .with_evaluations([]);
    let (analyzer, queries, _, _) = scenario.build();
    let workflow = RefinementLoop::with_config(
        analyzer,
        queries,
        scraper.clone(),
        evaluator.clone(),
        WorkflowConfig::default().with_corpus_path(&corpus),
    );

    let result = workflow.run(&images()).await;

    assert!(!result.success);
    assert!(!result.is_fatal());
    assert!(result.history.is_empty());
    assert_eq!(result.best_iteration, 0);
    // Every round ran a scrape, none reached evaluation.
    assert_eq!(scraper.calls().len(), 3);
    assert!(evaluator.calls().is_empty());
}

#[tokio::test]
async fn scraper_errors_degrade_the_round_without_aborting() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus)
        .with_scraper(MockScraper::new(&corpus).failing())
        .with_evaluations([evaluation_payload(&[("1", true, "50 €")], 80.0, "sufficient", "")]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    // No corpus ever appears, so the run ends with an empty history
    // instead of an error.
    assert!(!result.success);
    assert!(result.error.is_none());
    assert!(result.history.is_empty());
}

#[tokio::test]
async fn malformed_evaluator_payload_degrades_to_an_empty_round() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus).with_evaluations([
        json!("not an evaluation object"),
        evaluation_payload(&[("1", true, "50 €")], 80.0, "sufficient", ""),
    ]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    assert!(result.success);
    assert_eq!(result.history.len(), 2);
    // The malformed round recorded zero matches but stayed in history.
    assert_eq!(result.history[0].count_positive, 0);
    assert_eq!(result.history[0].match_percentage, 0.0);
    assert_eq!(result.history[0].price_statistics.count, 0);
    assert_eq!(result.best_iteration, 2);
}

#[tokio::test]
async fn failed_query_regeneration_reuses_the_previous_query() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let evaluator = MockEvaluator::scripted([
        evaluation_payload(&[], 0.0, "not sufficient", "broaden the query"),
        evaluation_payload(&[("1", true, "70 €")], 90.0, "sufficient", ""),
    ]);
    let (analyzer, _, scraper, _) = TestScenario::new(&corpus).build();
    let workflow = RefinementLoop::with_config(
        analyzer,
        MockQueryGenerator::failing(),
        scraper,
        evaluator.clone(),
        WorkflowConfig::default().with_corpus_path(&corpus),
    );

    let result = workflow.run(&images()).await;

    assert!(result.success);
    let calls = evaluator.calls();
    // Phase 1 fell back to the description-derived query and round 2
    // reused it after the regeneration failure.
    assert_eq!(calls[0].query, "test item");
    assert_eq!(calls[1].query, "test item");
}

#[tokio::test]
async fn cumulative_statistics_deduplicate_and_grow() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    // Listing "1" is re-evaluated in round 2 with a corrected price; the
    // cumulative set must keep exactly one entry for it.
    let scenario = TestScenario::new(&corpus).with_evaluations([
        evaluation_payload(&[("1", true, "50 €")], 30.0, "not sufficient", "narrow it"),
        evaluation_payload(
            &[("1", true, "100 €"), ("2", true, "150 €")],
            80.0,
            "sufficient",
            "",
        ),
    ]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    let first = &result.history[0].price_statistics;
    assert_eq!(first.count, 1);
    assert_eq!(first.range, "50-50");

    let second = &result.history[1].price_statistics;
    assert_eq!(second.count, 2);
    assert_eq!(second.valid_prices, vec![100.0, 150.0]);
    assert_eq!(second.median, 125.0);
    assert_eq!(second.average, 125.0);
    assert_eq!(second.range, "100-150");
}

#[tokio::test]
async fn per_round_policy_restricts_statistics_to_the_current_round() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus).with_evaluations([
        evaluation_payload(&[("1", true, "50 €")], 30.0, "not sufficient", ""),
        evaluation_payload(&[("2", true, "150 €")], 40.0, "not sufficient", ""),
    ]);
    let config = WorkflowConfig::default()
        .with_corpus_path(&corpus)
        .with_max_rounds(2)
        .with_statistics_policy(StatisticsPolicy::PerRound);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    // Round 2 sees only its own match under the per-round policy.
    assert_eq!(result.history[1].price_statistics.count, 1);
    assert_eq!(result.history[1].price_statistics.range, "150-150");
}

#[tokio::test]
async fn run_artifacts_are_written_when_enabled() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);
    let artifacts_root = dir.path().join("runs");

    let scenario = TestScenario::new(&corpus).with_evaluations([evaluation_payload(
        &[("1", true, "70 €")],
        80.0,
        "sufficient",
        "",
    )]);
    let config = WorkflowConfig::default()
        .with_corpus_path(&corpus)
        .with_artifacts_root(&artifacts_root);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;
    assert!(result.success);

    let run_dirs: Vec<_> = std::fs::read_dir(&artifacts_root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(run_dirs.len(), 1);
    for name in ["image_analysis.json", "evaluation_1.json", "final_result.json"] {
        assert!(run_dirs[0].join(name).is_file(), "missing artifact {name}");
    }
}

#[tokio::test]
async fn zero_match_rounds_still_terminate_within_budget() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    // Every round evaluates to an empty report; the loop must exhaust
    // its budget and stop.
    let scenario = TestScenario::new(&corpus).with_evaluations([
        json!({}),
        json!({}),
        json!({}),
    ]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);

    let result = workflow.run(&images()).await;

    assert!(!result.success);
    assert_eq!(result.history.len(), 3);
    // With every round at zero percent, the earliest completed round is
    // the best one.
    assert_eq!(result.best_iteration, 1);
    assert_eq!(result.predicted_price(), 0.0);
}

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

fn ground_truth(id: &str, category: &str, price: &str, with_images: bool) -> GroundTruthItem {
    GroundTruthItem {
        id: id.to_string(),
        title: format!("item {id}"),
        category: category.to_string(),
        price: price.to_string(),
        local_images: if with_images {
            vec![format!("images/{id}_0.jpg")]
        } else {
            Vec::new()
        },
    }
}

#[tokio::test]
async fn benchmark_scores_predictions_against_ground_truth() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    // Every loop run predicts 110 (single match at 110 €).
    let scenario = TestScenario::new(&corpus).with_evaluations([evaluation_payload(
        &[("m1", true, "110 €")],
        90.0,
        "sufficient",
        "",
    )]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);
    let harness = BenchmarkHarness::with_config(workflow, BenchmarkConfig::default().with_seed(7));

    let items = vec![ground_truth("a", "electronics", "100 €", true)];
    let report = harness.run(&items, None).await;

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.actual, 100.0);
    assert_eq!(record.predicted, 110.0);
    assert!((record.error_pct - 10.0).abs() < 1e-9);
    assert!(record.success);
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn benchmark_skips_unusable_items_and_counts_them() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus).with_evaluations([evaluation_payload(
        &[("m1", true, "110 €")],
        90.0,
        "sufficient",
        "",
    )]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);
    let harness = BenchmarkHarness::with_config(workflow, BenchmarkConfig::default().with_seed(7));

    let items = vec![
        ground_truth("priced", "electronics", "100 €", true),
        ground_truth("no-price", "electronics", "VB", true),
        ground_truth("no-images", "electronics", "100 €", false),
    ];
    let report = harness.run(&items, None).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].id, "priced");
    assert_eq!(report.skipped, 2);
}

#[tokio::test]
async fn benchmark_excludes_fatal_runs_from_aggregates() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus)
        .with_analyzer(MockAnalyzer::rejecting("unusable photographs"));
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);
    let harness = BenchmarkHarness::with_config(workflow, BenchmarkConfig::default().with_seed(7));

    let items = vec![ground_truth("a", "electronics", "100 €", true)];
    let report = harness.run(&items, None).await;

    assert!(report.records.is_empty());
    assert_eq!(report.skipped, 1);
    assert_eq!(report.accuracy, 0.0);
}

#[tokio::test]
async fn benchmark_filters_by_category_and_never_oversamples() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);

    let scenario = TestScenario::new(&corpus).with_evaluations([evaluation_payload(
        &[("m1", true, "110 €")],
        90.0,
        "sufficient",
        "",
    )]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);
    let harness = BenchmarkHarness::with_config(
        workflow,
        BenchmarkConfig::default().with_sample_size(10).with_seed(42),
    );

    let mut items = vec![
        ground_truth("e1", "electronics", "100 €", true),
        ground_truth("e2", "electronics", "120 €", true),
    ];
    for i in 0..5 {
        items.push(ground_truth(&format!("f{i}"), "furniture", "80 €", true));
    }

    let report = harness.run(&items, Some("electronics")).await;

    // Only the two electronics items qualify; sampling never repeats.
    assert_eq!(report.records.len(), 2);
    let mut ids: Vec<_> = report.records.iter().map(|record| record.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 2);
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "electronics");
}

#[tokio::test]
async fn benchmark_sampling_is_seeded_and_without_replacement() {
    let corpus: Vec<GroundTruthItem> = (0..30)
        .map(|i| ground_truth(&format!("item{i}"), "electronics", "100 €", true))
        .collect();

    let mut sampled_ids: Vec<Vec<String>> = Vec::new();
    for _ in 0..2 {
        let dir = TempDir::new().unwrap();
        let corpus_file = corpus_path(&dir);
        // An unscripted evaluator yields empty rounds: no run is fatal,
        // so every sampled item produces a record.
        let scenario = TestScenario::new(&corpus_file);
        let config = WorkflowConfig::default().with_corpus_path(&corpus_file);
        let harness = BenchmarkHarness::with_config(
            loop_with(scenario, config),
            BenchmarkConfig::default().with_sample_size(5).with_seed(42),
        );

        let report = harness.run(&corpus, None).await;
        sampled_ids.push(report.records.iter().map(|record| record.id.clone()).collect());
    }

    assert_eq!(sampled_ids[0].len(), 5);
    // No item repeats within a sample.
    let mut unique = sampled_ids[0].clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
    // The same seed selects the same items in the same order.
    assert_eq!(sampled_ids[0], sampled_ids[1]);
}

#[tokio::test]
async fn benchmark_report_is_persisted_when_configured() {
    let dir = TempDir::new().unwrap();
    let corpus = corpus_path(&dir);
    let results_dir = dir.path().join("benchmark_results");

    let scenario = TestScenario::new(&corpus).with_evaluations([evaluation_payload(
        &[("m1", true, "110 €")],
        90.0,
        "sufficient",
        "",
    )]);
    let config = WorkflowConfig::default().with_corpus_path(&corpus);
    let workflow = loop_with(scenario, config);
    let harness = BenchmarkHarness::with_config(
        workflow,
        BenchmarkConfig::default().with_seed(7).with_results_dir(&results_dir),
    );

    let items = vec![ground_truth("a", "electronics", "100 €", true)];
    harness.run(&items, None).await;

    let files: Vec<_> = std::fs::read_dir(&results_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("benchmark_") && files[0].ends_with(".json"));
}
