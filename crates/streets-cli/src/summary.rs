use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};
use streets_model::NormalizerOptions;

use streets_cli::pipeline::NormalizeResult;

pub fn print_summary(result: &NormalizeResult) {
    println!("Input: {} ({})", result.input.display(), result.input_encoding);
    match &result.output {
        Some(path) => println!(
            "Exported {} features to {} ({})",
            result.report.records,
            path.display(),
            result.output_encoding
        ),
        None => println!("Dry run: {} features normalized, nothing written", result.report.records),
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Step"), header_cell("Enabled"), header_cell("Changed")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for outcome in &result.report.steps {
        table.add_row(vec![
            Cell::new(outcome.step.label()),
            enabled_cell(outcome.enabled),
            count_cell(outcome.changed),
        ]);
    }
    println!("{table}");

    print_samples(&result.samples);
}

pub fn print_rules(options: &NormalizerOptions) {
    println!("Preset: {}", options.preset);
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Pattern"), header_cell("Replacement")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, rule) in options.acronyms.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(format!("{:?}", rule.pattern)),
            Cell::new(format!("{:?}", rule.replacement)),
        ]);
    }
    println!("{table}");
}

fn print_samples(samples: &DataFrame) {
    if samples.height() == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(
        samples
            .get_column_names()
            .into_iter()
            .map(|name| header_cell(name.as_str()))
            .collect::<Vec<_>>(),
    );
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for idx in 0..samples.height() {
        let row = samples
            .get_columns()
            .iter()
            .map(|column| value_cell(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect::<Vec<_>>();
        table.add_row(row);
    }
    println!();
    println!("Sample rows:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

fn enabled_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Cyan).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn value_cell(value: AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => dim_cell("null"),
        AnyValue::String(s) => Cell::new(s),
        AnyValue::StringOwned(s) => Cell::new(s.as_str()),
        other => Cell::new(other.to_string()),
    }
}
