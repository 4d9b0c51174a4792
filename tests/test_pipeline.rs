//! Integration tests: record pipeline end-to-end

use std::io::Write;

use wagecast::dataset::{X_FILE, Y_FILE};
use wagecast::pipeline::{
    CategoricalField, FeatureSchema, NumericField, Pipeline, RawRecord, RecordSource, TargetSpec,
};

fn salary_target() -> TargetSpec {
    TargetSpec {
        lower_column: "salary_from".to_string(),
        upper_column: "salary_to".to_string(),
    }
}

fn minimal_schema() -> FeatureSchema {
    FeatureSchema::new(
        vec![CategoricalField::one_hot("type", &["full", "part"])],
        vec![],
        salary_target(),
    )
}

fn posting(experience: &str, employment: &str, schedule: &str, from: &str, to: &str) -> RawRecord {
    RawRecord::from_pairs([
        ("experience", experience),
        ("employment", employment),
        ("schedule", schedule),
        ("salary_from", from),
        ("salary_to", to),
    ])
}

fn sample_postings() -> Vec<RawRecord> {
    vec![
        posting("between1And3", "full", "fullDay", "90000", "120000"),
        posting("noExperience", "part", "remote", "40000", ""),
        posting("moreThan6", "full", "remote", "", ""),
        posting("between3And6", "project", "flexible", "150000", "210000"),
    ]
}

#[test]
fn test_missing_salary_row_is_dropped_and_counted() {
    // One record, no usable salary: the dataset stays empty and the drop is
    // counted exactly once.
    let pipeline = Pipeline::new(minimal_schema());
    let records = vec![RawRecord::from_pairs([
        ("salary_from", ""),
        ("salary_to", ""),
        ("type", "full"),
    ])];

    let (dataset, summary) = pipeline.process(&records).unwrap();
    assert_eq!(dataset.x().nrows(), 0);
    assert_eq!(dataset.y().len(), 0);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.accepted, 0);
}

#[test]
fn test_shape_invariant() {
    let schema = FeatureSchema::job_postings();
    let width = schema.width();
    let pipeline = Pipeline::new(schema);

    let (dataset, summary) = pipeline.process(&sample_postings()).unwrap();
    assert_eq!(dataset.x().nrows(), dataset.y().len());
    assert_eq!(dataset.feature_width(), width);
    assert_eq!(summary.accepted + summary.rejected, summary.rows_in);
}

#[test]
fn test_runs_are_byte_identical() {
    let pipeline = Pipeline::new(FeatureSchema::job_postings());
    let records = sample_postings();

    let (first, _) = pipeline.process(&records).unwrap();
    let (second, _) = pipeline.process(&records).unwrap();
    assert_eq!(first, second);

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    first.save(dir_a.path()).unwrap();
    second.save(dir_b.path()).unwrap();

    for name in [X_FILE, Y_FILE] {
        let bytes_a = std::fs::read(dir_a.path().join(name)).unwrap();
        let bytes_b = std::fs::read(dir_b.path().join(name)).unwrap();
        assert_eq!(bytes_a, bytes_b, "{} differs between identical runs", name);
    }
}

#[test]
fn test_target_reduction_rules() {
    let pipeline = Pipeline::new(FeatureSchema::job_postings());
    let (dataset, summary) = pipeline.process(&sample_postings()).unwrap();

    // Row with both bounds missing was dropped; the rest keep input order.
    assert_eq!(summary.rejected, 1);
    assert_eq!(dataset.y().len(), 3);
    assert_eq!(dataset.y()[0], 105000.0); // midpoint
    assert_eq!(dataset.y()[1], 40000.0); // single bound
    assert_eq!(dataset.y()[2], 180000.0);
}

#[test]
fn test_unknown_category_keeps_width_at_inference() {
    let schema = minimal_schema();
    let width = schema.width();
    let pipeline = Pipeline::new(schema);

    let records = vec![
        RawRecord::from_pairs([("type", "full")]),
        RawRecord::from_pairs([("type", "apprenticeship")]),
    ];
    let (features, summary) = pipeline.process_features(&records).unwrap();

    assert_eq!(summary.rejected, 0);
    assert_eq!(features.ncols(), width);
    // Known category hits its slot, unseen one lands in the unknown slot.
    assert_eq!(features.row(0).to_vec(), vec![1.0, 0.0, 0.0]);
    assert_eq!(features.row(1).to_vec(), vec![0.0, 0.0, 1.0]);
}

#[test]
fn test_numeric_defaults_and_rejections() {
    let schema = FeatureSchema::new(
        vec![],
        vec![
            NumericField::with_default("hours", 40.0),
            NumericField::required("grade"),
        ],
        salary_target(),
    );
    let pipeline = Pipeline::new(schema);

    let records = vec![
        // empty optional numeric: default substituted
        RawRecord::from_pairs([
            ("hours", ""),
            ("grade", "3"),
            ("salary_from", "100"),
            ("salary_to", "200"),
        ]),
        // empty required numeric: rejected
        RawRecord::from_pairs([
            ("hours", "20"),
            ("grade", ""),
            ("salary_from", "100"),
            ("salary_to", "200"),
        ]),
        // unparseable numeric: rejected
        RawRecord::from_pairs([
            ("hours", "20"),
            ("grade", "senior"),
            ("salary_from", "100"),
            ("salary_to", "200"),
        ]),
    ];

    let (dataset, summary) = pipeline.process(&records).unwrap();
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 2);
    assert_eq!(dataset.x().row(0).to_vec(), vec![40.0, 3.0]);
}

#[test]
fn test_csv_file_to_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("postings.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "experience,employment,schedule,salary_from,salary_to").unwrap();
    writeln!(file, "between1And3,full,fullDay,90000,120000").unwrap();
    writeln!(file, "noExperience,part,remote,,").unwrap(); // no salary
    writeln!(file, "moreThan6,full,remote,200000,").unwrap();
    writeln!(file, "between3And6,full").unwrap(); // short row
    drop(file);

    let source = RecordSource::from_csv_path(&csv_path).unwrap();
    assert_eq!(source.len(), 4);
    assert_eq!(source.skipped(), 0);

    let pipeline = Pipeline::new(FeatureSchema::job_postings());
    let (dataset, summary) = pipeline.process(source.records()).unwrap();

    // The empty-salary row and the short row both drop; valid rows survive.
    assert_eq!(summary.rejected, 2);
    assert_eq!(dataset.nrows(), 2);
    assert_eq!(dataset.y()[0], 105000.0);
    assert_eq!(dataset.y()[1], 200000.0);

    dataset.save(dir.path()).unwrap();
    let restored = wagecast::dataset::Dataset::load(dir.path()).unwrap();
    assert_eq!(restored, dataset);
}
