//! Integration tests for the mapping run behind `prs map`.

use std::fs;
use std::path::Path;

use prs_cli::pipeline::{ColumnOverride, MapOptions, run_map};
use prs_cli::settings::Settings;
use prs_map::SectionStatus;
use prs_model::{Classification, Extract, HeaderMetadata, SectionKind};
use prs_persistence::{JsonExtractDir, JsonFileSink, TemplateStore};
use tempfile::tempdir;

fn register(earnings_headers: [&str; 3]) -> Vec<Extract> {
    let earnings = Extract::new(
        SectionKind::Earnings,
        earnings_headers.iter().map(|h| (*h).to_string()).collect(),
    )
    .with_row(vec!["REG".into(), "Regular".into(), "1200.00".into()])
    .with_row(vec!["OT".into(), "Overtime".into(), "85.50".into()])
    .with_suggestion(0, Classification::new("earning_code", 0.93))
    .with_suggestion(1, Classification::new("earning_description", 0.45))
    .with_suggestion(2, Classification::new("gross_pay", 0.55));
    let taxes = Extract::new(SectionKind::Taxes, vec!["Tax".into(), "Amount".into()])
        .with_row(vec!["FIT".into(), "210.00".into()])
        .with_suggestion(0, Classification::new("tax_code", 0.88))
        .with_suggestion(1, Classification::new("employee_tax", 0.72));
    vec![earnings, taxes]
}

fn write_extracts(dir: &Path, source_id: &str, extracts: &[Extract]) {
    let json = serde_json::to_string_pretty(extracts).unwrap();
    fs::write(dir.join(format!("{source_id}.json")), json).unwrap();
}

fn set(value: &str) -> ColumnOverride {
    value.parse().unwrap()
}

#[test]
fn auto_accept_then_confirm_advances_and_saves() {
    let dir = tempdir().unwrap();
    write_extracts(dir.path(), "acme-q1", &register(["Code", "Description", "Current"]));
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path().join("out"));
    let options = MapOptions {
        auto_accept: true,
        overrides: vec![set("earnings:1=skip")],
        confirm: vec![SectionKind::Earnings],
        header: HeaderMetadata::default()
            .with_company("Acme Corp")
            .with_check_date("2024-03-29"),
        ..MapOptions::default()
    };

    let settings = Settings::default();
    let outcome = run_map(&provider, &sink, None, &settings, "acme-q1", &options).unwrap();

    assert!(outcome.succeeded());
    assert_eq!(outcome.auto_accepted, 3);
    let session = &outcome.session;
    assert_eq!(session.workflow().status(SectionKind::EmployeeInfo), SectionStatus::NoData);
    assert_eq!(session.workflow().status(SectionKind::Earnings), SectionStatus::Confirmed);
    assert_eq!(session.active_section(), Some(SectionKind::Taxes));
    // gross_pay at 0.55 was never confirmed
    let current = session.store().get(SectionKind::Earnings, 2).unwrap();
    assert!(current.mapped_field().is_none());

    insta::assert_snapshot!(serde_json::to_string_pretty(&outcome.payload).unwrap(), @r#"
    {
      "headerMetadata": {
        "company": "Acme Corp",
        "payPeriodStart": null,
        "payPeriodEnd": null,
        "checkDate": "2024-03-29"
      },
      "sectionMappings": {
        "earnings": {
          "0": "earning_code"
        },
        "taxes": {
          "0": "tax_code",
          "1": "employee_tax"
        }
      },
      "rememberForSimilarFiles": false
    }
    "#);

    let stored = sink.load("acme-q1").unwrap().unwrap();
    assert_eq!(stored.payload, outcome.payload);
}

#[test]
fn remembered_templates_seed_similar_registers() {
    let dir = tempdir().unwrap();
    let march_headers = ["Earning Code", "Description", "Current Amount"];
    let april_headers = ["Earning Code", "Descriptions", "Current Amt"];
    write_extracts(dir.path(), "march", &register(march_headers));
    write_extracts(dir.path(), "april", &register(april_headers));
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path());
    let templates = TemplateStore::new(dir.path().join("templates"));
    let settings = Settings::default();

    let first = MapOptions {
        overrides: vec![
            set("earnings:0=earning_code"),
            set("earnings:1=earning_description"),
            set("earnings:2=current_amount"),
        ],
        confirm: vec![SectionKind::Earnings],
        remember: true,
        use_templates: true,
        ..MapOptions::default()
    };
    let march = run_map(&provider, &sink, Some(&templates), &settings, "march", &first).unwrap();
    assert_eq!(march.remembered, 1);

    let second = MapOptions {
        use_templates: true,
        ..MapOptions::default()
    };
    let april = run_map(&provider, &sink, Some(&templates), &settings, "april", &second).unwrap();

    assert_eq!(april.templates.len(), 1);
    assert_eq!(april.templates[0].section, SectionKind::Earnings);
    assert!(!april.templates[0].exact);
    let seeded = april.session.store().get(SectionKind::Earnings, 2).unwrap();
    let choice = seeded.confirmed_field.as_ref().map(ToString::to_string);
    assert_eq!(choice.as_deref(), Some("current_amount"));
    assert!(!seeded.confirmed);
    assert!(april.payload.is_empty());
}

#[test]
fn failed_save_is_reported_not_raised() {
    let dir = tempdir().unwrap();
    write_extracts(dir.path(), "r1", &register(["Code", "Description", "Current"]));
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(&blocker);
    let options = MapOptions {
        confirm_all_sections: true,
        ..MapOptions::default()
    };

    let outcome = run_map(&provider, &sink, None, &Settings::default(), "r1", &options).unwrap();

    assert!(!outcome.succeeded());
    let save = outcome.save.as_ref().unwrap();
    assert!(save.error.is_some());
    assert!(outcome.session.is_complete());
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    write_extracts(dir.path(), "r1", &register(["Code", "Description", "Current"]));
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path());
    let options = MapOptions {
        auto_accept: true,
        confirm_all_sections: true,
        dry_run: true,
        ..MapOptions::default()
    };

    let outcome = run_map(&provider, &sink, None, &Settings::default(), "r1", &options).unwrap();

    assert!(outcome.save.is_none());
    assert!(outcome.succeeded());
    assert!(!sink.path_for("r1").exists());
    assert_eq!(outcome.payload.mapped_count(), 3);
}

#[test]
fn operator_errors_abort_the_run() {
    let dir = tempdir().unwrap();
    write_extracts(dir.path(), "r1", &register(["Code", "Description", "Current"]));
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path());
    let settings = Settings::default();

    let wrong_section = MapOptions {
        overrides: vec![set("earnings:0=tax_code")],
        ..MapOptions::default()
    };
    let err = run_map(&provider, &sink, None, &settings, "r1", &wrong_section).unwrap_err();
    assert!(format!("{err:#}").contains("earnings:0=tax_code"));

    let no_data = MapOptions {
        confirm: vec![SectionKind::Deductions],
        ..MapOptions::default()
    };
    assert!(run_map(&provider, &sink, None, &settings, "r1", &no_data).is_err());

    let missing = run_map(&provider, &sink, None, &settings, "absent", &MapOptions::default());
    assert!(missing.is_err());
}

#[test]
fn stricter_auto_accept_threshold_from_settings() {
    let dir = tempdir().unwrap();
    write_extracts(dir.path(), "r1", &register(["Code", "Description", "Current"]));
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path());
    let settings: Settings = toml::from_str("[confidence]\nauto_accept = 0.9\n").unwrap();
    let options = MapOptions {
        auto_accept: true,
        dry_run: true,
        ..MapOptions::default()
    };

    let outcome = run_map(&provider, &sink, None, &settings, "r1", &options).unwrap();

    assert_eq!(outcome.auto_accepted, 1);
}

#[test]
fn empty_section_does_not_block_auto_accept() {
    let dir = tempdir().unwrap();
    let mut extracts = register(["Code", "Description", "Current"]);
    extracts.push(Extract::new(SectionKind::Deductions, Vec::new()));
    write_extracts(dir.path(), "r1", &extracts);
    let provider = JsonExtractDir::new(dir.path());
    let sink = JsonFileSink::new(dir.path());
    let options = MapOptions {
        auto_accept: true,
        confirm_all_sections: true,
        ..MapOptions::default()
    };

    let outcome = run_map(&provider, &sink, None, &Settings::default(), "r1", &options).unwrap();

    assert_eq!(outcome.auto_accepted, 3);
    let status = outcome.session.workflow().status(SectionKind::Deductions);
    assert_eq!(status, SectionStatus::Confirmed);
    assert!(outcome.session.is_complete());
    let stored = sink.load("r1").unwrap().unwrap();
    assert!(stored.payload.section(SectionKind::Deductions).is_none());
    assert_eq!(stored.payload.mapped_count(), 3);
}
