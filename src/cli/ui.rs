use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use rust_decimal::Decimal;

use crate::core::analytics::RiskLevel;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned amount with two decimals.
pub fn money_cell(value: Decimal) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

/// Bold label cell used for total rows.
pub fn total_label_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Bold green amount used for total rows.
pub fn total_money_cell(value: Decimal) -> Cell {
    money_cell(value)
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
}

/// Amount colored by sign: green when non-negative, red otherwise.
pub fn balance_cell(value: Decimal) -> Cell {
    let color = if value >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    };
    money_cell(value).fg(color)
}

/// Percentage with two decimals, colored by sign.
pub fn change_cell(change: Decimal) -> Cell {
    let text = format!("{change:.2}%");
    let color = if change >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// Plain right-aligned percentage.
pub fn percentage_cell(value: Decimal) -> Cell {
    Cell::new(format!("{value:.2}%")).set_alignment(CellAlignment::Right)
}

/// Risk tier with a traffic-light color.
pub fn risk_cell(level: RiskLevel) -> Cell {
    let color = match level {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Red,
    };
    Cell::new(level.to_string().to_uppercase())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
