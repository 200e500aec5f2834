//! Plain terminal output of an analysis for the one-shot `analyze` command.

use crate::catalog::{Catalog, Palette};
use crate::composer::AssetEntry;
use crate::format::{currency_symbol, fixed2, total_line};
use crate::model::{AnalysisResult, RiskTag};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement, Table};
use piechart::{Chart, Color, Data};

/// Parses `SYMBOL=QUANTITY` command line pairs into form rows.
pub fn parse_asset_arg(arg: &str) -> Result<AssetEntry, String> {
    let (symbol, quantity) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=QUANTITY, got '{arg}'"))?;
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(format!("missing symbol in '{arg}'"));
    }
    Ok(AssetEntry::new(symbol, quantity.trim()))
}

fn slice_color(color: ratatui::style::Color) -> Color {
    match color {
        ratatui::style::Color::Rgb(r, g, b) => Color::RGB(r, g, b),
        _ => Color::White,
    }
}

pub fn chart_data(result: &AnalysisResult, palette: &Palette) -> Vec<Data> {
    result
        .breakdown
        .iter()
        .enumerate()
        .map(|(i, item)| Data {
            label: item.symbol.clone(),
            value: item.value as f32,
            color: Some(slice_color(palette.color(i)).into()),
            fill: '•',
        })
        .collect()
}

pub fn draw_pie_chart(result: &AnalysisResult, palette: &Palette) {
    let data = chart_data(result, palette);
    if data.is_empty() {
        return;
    }
    Chart::new()
        .legend(true)
        .radius(9)
        .aspect_ratio(3)
        .draw(&data);
}

fn risk_color(tag: &RiskTag) -> TColor {
    match tag {
        RiskTag::Low => TColor::Green,
        RiskTag::Normal | RiskTag::Medium => TColor::Yellow,
        RiskTag::High => TColor::Red,
        RiskTag::Other(_) => TColor::White,
    }
}

pub fn breakdown_table(result: &AnalysisResult, catalog: &Catalog) -> Table {
    let currency = currency_symbol(result.currency.as_deref());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);

    table.set_header(vec![
        Cell::new("Symbol").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Quantity").add_attribute(Attribute::Bold),
        Cell::new("Price").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
        Cell::new("%").add_attribute(Attribute::Bold),
        Cell::new("Risk").add_attribute(Attribute::Bold),
    ]);

    for item in &result.breakdown {
        let tag = item.risk_tag();
        table.add_row(vec![
            Cell::new(&item.symbol),
            Cell::new(catalog.display_name(&item.symbol).unwrap_or("-")),
            Cell::new(item.quantity.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{currency}{}", item.price)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{currency}{}", fixed2(item.value))).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}%", fixed2(item.percentage))).set_alignment(CellAlignment::Right),
            Cell::new(&item.risk).fg(risk_color(&tag)),
        ]);
    }

    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{currency}{}", fixed2(result.total_value)))
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

/// Prints chart, table, total and insight of a successful analysis.
pub fn print_result(result: &AnalysisResult, catalog: &Catalog, palette: &Palette) {
    draw_pie_chart(result, palette);
    println!("{}", breakdown_table(result, catalog));
    println!("{}", total_line(result).bold());
    if let Some(insight) = result.insight() {
        println!();
        println!("{}", "AI Insight".bold().underline());
        println!("{insight}");
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", message.red());
}
