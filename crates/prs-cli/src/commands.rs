use anyhow::Result;
use tracing::info;

use prs_cli::pipeline::{MapOptions, MapOutcome, load_session, run_map};
use prs_cli::settings::Settings;
use prs_map::MappingSession;
use prs_model::HeaderMetadata;
use prs_persistence::{JsonExtractDir, JsonFileSink};

use crate::cli::{MapArgs, ReviewArgs};

pub fn run_review(args: &ReviewArgs, settings: &Settings) -> Result<MappingSession> {
    let provider = JsonExtractDir::new(&args.extracts_dir);
    let (session, report) = load_session(&provider, &args.source_id, settings)?;
    info!(
        source_id = %args.source_id,
        loaded = report.loaded.len(),
        rejected = report.rejected.len(),
        "review loaded"
    );
    Ok(session)
}

pub fn run_map_command(args: &MapArgs, settings: &Settings) -> Result<MapOutcome> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.extracts_dir.clone());
    let provider = JsonExtractDir::new(&args.extracts_dir);
    let sink = JsonFileSink::new(&output_dir);
    let templates = settings
        .templates
        .enabled
        .then(|| settings.templates.store(&output_dir));

    let options = MapOptions {
        auto_accept: args.auto_accept,
        overrides: args.set.clone(),
        confirm: args.confirm.clone(),
        confirm_all_sections: args.confirm_all_sections,
        header: header_from_args(args),
        remember: args.remember,
        use_templates: !args.no_templates,
        dry_run: args.dry_run,
    };
    run_map(
        &provider,
        &sink,
        templates.as_ref(),
        settings,
        &args.source_id,
        &options,
    )
}

fn header_from_args(args: &MapArgs) -> HeaderMetadata {
    HeaderMetadata {
        company: args.company.clone(),
        pay_period_start: args.pay_period_start.clone(),
        pay_period_end: args.pay_period_end.clone(),
        check_date: args.check_date.clone(),
    }
}
