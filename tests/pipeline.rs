mod common;

use app_market_profiler::{
    config::{DatasetConfig, FieldIndex},
    error::PipelineError,
    frequency::frequency_table,
    io_utils,
    metric::{MetricFormat, parse_plain},
    pipeline::Pipeline,
    record::Record,
    stats::category_average,
};
use encoding_rs::UTF_8;

use common::{GOOGLE_PLAY_SAMPLE, TestWorkspace, store};

fn four_field_config(free: &str) -> DatasetConfig {
    DatasetConfig {
        name: "scenario".to_string(),
        fields: FieldIndex::new(0, 1, 3, 2),
        metric_format: MetricFormat::Plain,
        free_values: vec![free.to_string()],
        exclude_rows: Vec::new(),
        locale_threshold: 3,
    }
}

#[test]
fn end_to_end_scenario_keeps_latest_duplicate_and_aggregates() {
    let store = store(
        &["name", "category", "metric", "price"],
        &[
            &["A", "G1", "10", "0"],
            &["A", "G1", "20", "0"],
            &["B", "G2", "5", "0"],
        ],
    );
    let pipeline = Pipeline::for_store(four_field_config("0"), &store).expect("pipeline");
    let cleaned = pipeline.run(&store).expect("run");

    let kept: Vec<&[String]> = cleaned.records.iter().map(|r| r.fields()).collect();
    assert_eq!(kept, vec![&["A", "G1", "20", "0"][..], &["B", "G2", "5", "0"][..]]);

    let frequency = frequency_table(&cleaned.records, 1);
    assert_eq!(frequency.percent("G1"), Some(50.0));
    assert_eq!(frequency.percent("G2"), Some(50.0));
    assert_eq!(frequency.len(), 2);

    let averages = category_average(&cleaned.records, 1, 2, parse_plain).expect("averages");
    assert_eq!(averages.get("G1"), Some(20.0));
    assert_eq!(averages.get("G2"), Some(5.0));
}

#[test]
fn known_paid_record_is_excluded() {
    let store = store(
        &["name", "category", "metric", "price"],
        &[&["Paid", "G1", "10", "1.99"], &["Free", "G1", "10", "0.0"]],
    );
    let pipeline = Pipeline::for_store(four_field_config("0.0"), &store).expect("pipeline");
    let cleaned = pipeline.run(&store).expect("run");
    let names: Vec<&str> = cleaned.records.iter().map(|r| r.field(0)).collect();
    assert_eq!(names, vec!["Free"]);
    assert_eq!(cleaned.report.paid, 1);
}

#[test]
fn frequency_is_relative_to_cleaned_population() {
    let store = store(
        &["name", "category", "metric", "price"],
        &[
            &["A", "G1", "1", "0"],
            &["B", "G1", "1", "3.99"],
            &["C", "G2", "1", "0"],
            &["D", "G2", "1", "4.99"],
            &["E", "G2", "1", "0"],
        ],
    );
    let pipeline = Pipeline::for_store(four_field_config("0"), &store).expect("pipeline");
    let cleaned = pipeline.run(&store).expect("run");
    let table = frequency_table(&cleaned.records, 1);
    assert_eq!(table.total(), 3);
    let g2 = table.percent("G2").expect("G2 share");
    assert!((g2 - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn configuration_errors_precede_processing() {
    let store = store(&["name", "category"], &[&["A", "G1"]]);
    let err = Pipeline::for_store(four_field_config("0"), &store).expect_err("arity 2");
    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn google_play_sample_cleans_to_free_english_unique_apps() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("googleplaystore.csv", GOOGLE_PLAY_SAMPLE);
    let store = io_utils::read_record_store(&path, b',', UTF_8).expect("read sample");
    assert_eq!(store.arity(), 13);

    let pipeline = Pipeline::for_store(DatasetConfig::google_play(), &store).expect("pipeline");
    let cleaned = pipeline.run(&store).expect("run");
    let names: Vec<&str> = cleaned.records.iter().map(|r| r.field(0)).collect();
    assert_eq!(
        names,
        vec!["Coloring book moana", "Instagram", "Docs To Go™ Free Office Suite"]
    );
    assert_eq!(cleaned.records[1].field(3), "66577446");

    let report = cleaned.report;
    assert_eq!(report.read, 7);
    assert_eq!(report.wrong_arity, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.non_target_locale, 1);
    assert_eq!(report.paid, 1);
    assert_eq!(report.retained, 3);

    let installs = pipeline.resolve_field("installs", store.header()).expect("installs");
    let averages = category_average(
        &cleaned.records,
        1,
        installs,
        MetricFormat::InstallBucket.parser(),
    )
    .expect("averages");
    assert_eq!(averages.get("SOCIAL"), Some(1_000_000_000.0));
    assert_eq!(averages.get("ART_AND_DESIGN"), Some(500_000.0));
}

#[test]
fn stages_borrow_records_without_copying() {
    let store = store(
        &["name", "category", "metric", "price"],
        &[&["A", "G1", "1", "0"]],
    );
    let pipeline = Pipeline::for_store(four_field_config("0"), &store).expect("pipeline");
    let cleaned = pipeline.run(&store).expect("run");
    let original: &Record = &store.records()[0];
    assert!(std::ptr::eq(cleaned.records[0], original));
}
