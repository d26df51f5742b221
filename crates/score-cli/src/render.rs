//! Terminal tables for scheme listings, field lists, results and
//! extraction reports.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use score_extract::ExtractionReport;
use score_model::{Field, FieldKind, Outcome, Scheme, SchemeSummary, ScoreResult};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn schemes_table(schemes: &[SchemeSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Scheme"),
        header_cell("Name"),
        header_cell("Version"),
        header_cell("Category"),
        header_cell("Strategy"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 5, CellAlignment::Right);
    for summary in schemes {
        table.add_row(vec![
            id_cell(&summary.id),
            Cell::new(&summary.name),
            Cell::new(&summary.version),
            Cell::new(&summary.category),
            Cell::new(summary.strategy),
            Cell::new(summary.required_fields),
        ]);
    }
    table
}

pub fn fields_table(scheme: &Scheme) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Type"),
        header_cell("Domain"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    for field in &scheme.fields {
        table.add_row(vec![
            id_cell(&field.id),
            Cell::new(&field.label),
            Cell::new(field.kind.as_str()),
            Cell::new(field_domain(field)),
            requirement_cell(field),
        ]);
    }
    table
}

/// Accepted values of a field in a compact, human-readable form.
pub fn field_domain(field: &Field) -> String {
    let unit = field
        .unit
        .as_deref()
        .map(|u| format!(" {u}"))
        .unwrap_or_default();
    match &field.kind {
        FieldKind::Choice { options } => options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" | "),
        FieldKind::BoundedNumber { min, max } => format!("{min}..{max}{unit}"),
        FieldKind::Number => format!("any number{unit}"),
        FieldKind::Date => "YYYY-MM-DD".to_string(),
    }
}

pub fn requirement(field: &Field) -> &'static str {
    match (field.required, field.required_when.is_empty()) {
        (false, _) => "no",
        (true, true) => "yes",
        (true, false) => "conditional",
    }
}

/// Label/value lines describing a result, in display order.
pub fn result_rows(scheme: &Scheme, result: &ScoreResult) -> Vec<(String, String)> {
    let mut rows = vec![(
        "Scheme".to_string(),
        format!("{} ({})", scheme.name, result.scheme_version),
    )];
    match &result.outcome {
        Outcome::Stage(stage) => {
            rows.push(("Stage".to_string(), stage.stage.clone()));
            for (field, value) in &stage.components {
                rows.push((format!("  {field}"), value.to_string()));
            }
        }
        Outcome::Score(score) => {
            rows.push(("Score".to_string(), score.score.to_string()));
            rows.push((
                "Category".to_string(),
                score.bucket.clone().unwrap_or_else(|| "-".to_string()),
            ));
            for contribution in &score.contributions {
                rows.push((
                    format!("  {}", contribution.source),
                    format!("{:+}", contribution.points),
                ));
            }
            for (field, value) in &score.modifiers {
                rows.push((format!("Modifier {field}"), value.to_string()));
            }
            for finding in &score.findings {
                rows.push(("Finding".to_string(), finding.clone()));
            }
        }
    }
    rows
}

pub fn result_table(scheme: &Scheme, result: &ScoreResult) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    for (index, (label, value)) in result_rows(scheme, result).into_iter().enumerate() {
        let value = if index == 1 {
            Cell::new(value)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(label), value]);
    }
    table
}

pub fn extraction_table(scheme: &Scheme, report: &ExtractionReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Value"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    for field in &scheme.fields {
        if let Some(value) = report.answers.get(&field.id) {
            table.add_row(vec![
                id_cell(&field.id),
                Cell::new(value),
                Cell::new("extracted").fg(Color::Green),
            ]);
        } else if let Some(dropped) = report.dropped.iter().find(|d| d.field == field.id) {
            table.add_row(vec![
                id_cell(&field.id),
                dim_cell("-"),
                Cell::new(dropped.reason.as_str()).fg(Color::Yellow),
            ]);
        }
    }
    table
}

fn requirement_cell(field: &Field) -> Cell {
    match requirement(field) {
        "no" => dim_cell("no"),
        other => Cell::new(other),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn id_cell(id: &str) -> Cell {
    Cell::new(id)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell(value: &str) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
