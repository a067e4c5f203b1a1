use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use prs_map::{ColumnStatus, ConfidenceLevel, MappingSession, SectionStatus};
use prs_model::{SKIP_FIELD, SectionKind};

use prs_cli::pipeline::MapOutcome;

const SAMPLE_PREVIEW: usize = 3;

pub fn print_sections() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Label"),
        header_cell("Fields"),
    ]);
    apply_table_style(&mut table);
    for kind in SectionKind::ALL {
        let mut fields = kind.vocabulary().join(", ");
        fields.push_str(", ");
        fields.push_str(SKIP_FIELD);
        table.add_row(vec![
            section_cell(kind),
            Cell::new(kind.label()),
            Cell::new(fields),
        ]);
    }
    println!("{table}");
}

pub fn print_review(source_id: &str, session: &MappingSession) {
    println!("Source: {source_id}");
    print_status_table(session);
    for kind in session.workflow().sections_with_data() {
        print_column_table(session, kind);
    }
}

pub fn print_map_summary(outcome: &MapOutcome) {
    println!("Source: {}", outcome.source_id);
    for template in &outcome.templates {
        let kind = if template.exact { "exact" } else { "similar" };
        println!(
            "Template ({kind}, {:.2}) seeded {} column(s) in {}",
            template.similarity, template.columns, template.section
        );
    }
    if outcome.auto_accepted > 0 {
        println!("Auto-accepted: {} column(s)", outcome.auto_accepted);
    }
    print_status_table(&outcome.session);
    for kind in outcome.session.workflow().sections_with_data() {
        if outcome.session.workflow().status(kind) == SectionStatus::Pending {
            print_column_table(&outcome.session, kind);
        }
    }
    println!("Mapped columns: {}", outcome.payload.mapped_count());
    match &outcome.save {
        None => println!("Dry run: mappings not saved"),
        Some(save) if save.success => {
            println!("Saved: yes");
            if outcome.remembered > 0 {
                println!("Remembered templates: {}", outcome.remembered);
            }
        }
        Some(save) => {
            eprintln!(
                "Save failed: {}",
                save.error.as_deref().unwrap_or("unknown error")
            );
            eprintln!("Nothing was lost; fix the problem and run the command again.");
        }
    }
}

fn print_status_table(session: &MappingSession) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Status"),
        header_cell("Columns"),
        header_cell("Confirmed"),
        header_cell("Skipped"),
        header_cell("Chosen"),
        header_cell("Suggested"),
        header_cell("Unmapped"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let active = session.active_section();
    for (kind, status) in session.workflow().statuses() {
        let summary = session.store().summary(kind);
        let label = if active == Some(kind) && status == SectionStatus::Pending {
            format!("{} *", kind.as_str())
        } else {
            kind.as_str().to_string()
        };
        table.add_row(vec![
            Cell::new(label)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(status),
            count_cell(summary.total, Color::Reset),
            count_cell(summary.confirmed, Color::Green),
            count_cell(summary.skipped, Color::DarkGrey),
            count_cell(summary.chosen, Color::Cyan),
            count_cell(summary.suggested, Color::Yellow),
            count_cell(summary.unmapped, Color::Red),
        ]);
    }
    println!("{table}");
}

fn print_column_table(session: &MappingSession, kind: SectionKind) {
    let Some(extract) = session.extract(kind) else {
        return;
    };
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Header"),
        header_cell("Samples"),
        header_cell("Suggested"),
        header_cell("Confidence"),
        header_cell("Choice"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for mapping in session.store().columns(kind) {
        let index = mapping.column_index;
        let samples: Vec<&str> = extract
            .column_samples(index)
            .into_iter()
            .take(SAMPLE_PREVIEW)
            .collect();
        let sample_text = samples.join(" | ");
        let sample_cell = match merged_note(session, kind, index) {
            Some(note) => Cell::new(format!("{sample_text}\n{note}")).fg(Color::Yellow),
            None => Cell::new(sample_text),
        };
        let level = session.confidence_level(kind, index);
        table.add_row(vec![
            Cell::new(index),
            header_text_cell(&mapping.source_header),
            sample_cell,
            mapping
                .suggested_field
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            confidence_cell(mapping.confidence, level),
            mapping
                .confirmed_field
                .as_ref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            column_status_cell(mapping.status()),
        ]);
    }
    println!();
    println!("{} ({})", kind.label(), kind.as_str());
    if let Some(line) = confidence_line(session, kind) {
        println!("{line}");
    }
    println!("{table}");
}

/// Split offer shown under the samples of a column flagged as merged.
fn merged_note(session: &MappingSession, kind: SectionKind, index: usize) -> Option<String> {
    let pieces = session.split_preview(kind, index)?;
    Some(format!("merged? split into: {}", pieces.join(" / ")))
}

/// Per-tier column counts, highest tier first; `None` for a section without columns.
fn confidence_line(session: &MappingSession, kind: SectionKind) -> Option<String> {
    let counts = session.confidence_counts(kind);
    if counts.is_empty() {
        return None;
    }
    let tiers: Vec<String> = counts
        .iter()
        .rev()
        .map(|(level, count)| format!("{} {count} ({})", level.as_str(), level.description()))
        .collect();
    Some(format!("Confidence: {}", tiers.join(", ")))
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn section_cell(kind: SectionKind) -> Cell {
    Cell::new(kind.as_str())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn header_text_cell(header: &str) -> Cell {
    if header.trim().is_empty() {
        dim_cell("(blank)")
    } else {
        Cell::new(header)
    }
}

fn status_cell(status: SectionStatus) -> Cell {
    match status {
        SectionStatus::Confirmed => Cell::new("confirmed")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        SectionStatus::Pending => Cell::new("pending").fg(Color::Yellow),
        SectionStatus::NoData => dim_cell("no data"),
    }
}

fn column_status_cell(status: ColumnStatus) -> Cell {
    let color = match status {
        ColumnStatus::Confirmed => Color::Green,
        ColumnStatus::Skipped => Color::DarkGrey,
        ColumnStatus::Chosen => Color::Cyan,
        ColumnStatus::Suggested => Color::Yellow,
        ColumnStatus::Unmapped => Color::Red,
    };
    Cell::new(status.as_str()).fg(color)
}

fn confidence_cell(score: f32, level: Option<ConfidenceLevel>) -> Cell {
    let text = format!("{:.0}%", score * 100.0);
    match level {
        Some(ConfidenceLevel::High) => Cell::new(text).fg(Color::Green),
        Some(ConfidenceLevel::Medium) => Cell::new(text).fg(Color::Yellow),
        Some(ConfidenceLevel::Low) => Cell::new(text).fg(Color::Red),
        None => dim_cell(text),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
