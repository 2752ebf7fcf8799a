use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pyramid_model::PyramidSide;

use crate::commands::RunResult;

pub fn print_summary(result: &RunResult) {
    let report = &result.report;
    println!("Matcher: {}", report.matcher);
    println!(
        "Rows: {} reference, {} candidate",
        report.reference_rows, report.candidate_rows
    );
    match &result.output_dir {
        Some(dir) => println!("Output: {}", dir.display()),
        None => println!("Output: dry run, nothing written"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Groups"),
        header_cell("Matched"),
        header_cell("Unmatched ref"),
        header_cell("Unmatched cand"),
        header_cell("Repeated"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for level in &report.levels {
        table.add_row(vec![
            Cell::new(&level.level)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(level.groups, Color::White),
            count_cell(level.matched, Color::Green),
            count_cell(level.unmatched_reference, Color::Yellow),
            count_cell(level.unmatched_candidate, Color::Yellow),
            count_cell(level.repeated, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("FULL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.full_matches).add_attribute(Attribute::Bold),
        count_cell(report.unmatched(PyramidSide::Reference), Color::Yellow)
            .add_attribute(Attribute::Bold),
        count_cell(report.unmatched(PyramidSide::Candidate), Color::Yellow)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
