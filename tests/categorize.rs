//! End-to-end categorization against a small in-memory embedding model.

use std::collections::HashMap;

use feedback_match::{
    export_csv, Categorizer, Domain, JsonDumpObserver, StatsFileObserver, WordEmbeddings,
    DISTANCE_SENTINEL,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn model() -> WordEmbeddings {
    WordEmbeddings::from_entries(
        2,
        vec![
            ("park".to_string(), vec![0.8, 0.6]),
            ("clean".to_string(), vec![1.0, 0.0]),
            ("cleanliness".to_string(), vec![1.0, 0.0]),
            ("safety".to_string(), vec![0.0, 1.0]),
            ("unsafe".to_string(), vec![0.0, 1.0]),
            ("night".to_string(), vec![0.6, 0.8]),
            ("potholes".to_string(), vec![-1.0, 0.0]),
            ("maintenance".to_string(), vec![-1.0, 0.0]),
        ],
    )
    .unwrap()
}

#[test]
fn parks_example_end_to_end() {
    let model = model();
    let domains = vec![Domain::new(
        "parks",
        strings(&["cleanliness", "safety", "Novel"]),
    )];
    let mut responses = HashMap::new();
    responses.insert(
        "parks".to_string(),
        strings(&["the park was very clean\n", "\n", "i felt unsafe at night\n"]),
    );

    let results = Categorizer::new(&model)
        .categorize(&domains, &responses)
        .unwrap();

    let parks = &results["parks"];

    // The blank line consumed no row: two responses, one per bucket.
    assert_eq!(parks["cleanliness"].len(), 1);
    assert_eq!(parks["cleanliness"][0].response, "the park was very clean\n");
    assert_eq!(parks["safety"].len(), 1);
    assert_eq!(parks["safety"][0].response, "i felt unsafe at night\n");
    assert!(parks["Novel"].is_empty());

    let total: usize = parks.values().map(Vec::len).sum();
    assert_eq!(total, 2);
}

#[test]
fn multiple_domains_process_independently() {
    let model = model();
    let domains = vec![
        Domain::new("parks", strings(&["cleanliness", "Novel"])),
        Domain::new("roads", strings(&["maintenance", "Novel"])),
    ];
    let mut responses = HashMap::new();
    responses.insert(
        "parks".to_string(),
        strings(&["clean park\n", "mysteryword\n"]),
    );
    responses.insert("roads".to_string(), strings(&["potholes\n"]));

    let results = Categorizer::new(&model)
        .categorize(&domains, &responses)
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results["parks"]["cleanliness"].len(), 2);
    assert_eq!(results["roads"]["maintenance"].len(), 1);
    assert!(results["roads"]["Novel"].is_empty());

    // "mysteryword" exhausted the vocabulary: every category scored
    // infinite, the first declared one won, and the sentinel was recorded.
    let fallback = results["parks"]["cleanliness"]
        .iter()
        .find(|entry| entry.response == "mysteryword\n")
        .unwrap();
    assert_eq!(fallback.score, DISTANCE_SENTINEL);
}

#[test]
fn serialized_result_uses_the_stable_field_names() {
    let model = model();
    let domains = vec![Domain::new("parks", strings(&["cleanliness", "Novel"]))];
    let mut responses = HashMap::new();
    responses.insert("parks".to_string(), strings(&["clean park\n"]));

    let results = Categorizer::new(&model)
        .categorize(&domains, &responses)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&results).unwrap()).unwrap();
    let entry = &json["parks"]["cleanliness"][0];
    assert!(entry.get("response").is_some());
    assert!(entry.get("score").is_some());
    assert_eq!(entry.as_object().unwrap().len(), 2);
}

#[test]
fn observers_and_export_capture_a_full_run() {
    let model = model();
    let dir = tempfile::tempdir().unwrap();
    let stats_path = dir.path().join("stats.txt");
    let dump_path = dir.path().join("results.json");
    let csv_path = dir.path().join("results.csv");

    let domains = vec![Domain::new("parks", strings(&["cleanliness", "Novel"]))];
    let mut responses = HashMap::new();
    responses.insert("parks".to_string(), strings(&["clean park\n"]));

    let results = Categorizer::new(&model)
        .with_observer(Box::new(StatsFileObserver::create(&stats_path).unwrap()))
        .with_observer(Box::new(JsonDumpObserver::new(&dump_path)))
        .categorize(&domains, &responses)
        .unwrap();
    export_csv(&results, &csv_path).unwrap();

    let stats = std::fs::read_to_string(&stats_path).unwrap();
    assert!(stats.contains("[parks] similarity matrix populated"));

    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&dump_path).unwrap()).unwrap();
    assert_eq!(dump["parks"]["cleanliness"][0]["response"], "clean park\n");

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("domain,category,response,score"));
    assert!(csv.contains("parks,cleanliness"));
}
