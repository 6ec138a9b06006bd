//! Console table for a flattened calendar: `date | level | count`, newest day
//! on top, total in the last row.

use prettytable::{
    color,
    format::{self, Alignment},
    Attr, Cell, Row, Table,
};

use crate::contrib::ContributionDay;

const HEADERS: [&str; 3] = ["date", "level", "count"];

fn banner_cell(text: &str, align: Alignment) -> Cell {
    Cell::new_align(text, align)
        .with_style(Attr::Bold)
        .with_style(Attr::ForegroundColor(color::BLACK))
        .with_style(Attr::BackgroundColor(color::GREEN))
}

/// `days` are rendered in the order given; `total` is printed as is.
pub fn render_table(days: &[ContributionDay], total: u32) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(HEADERS.iter().map(|h| banner_cell(h, Alignment::LEFT)).collect()));

    for day in days {
        table.add_row(Row::new(vec![
            Cell::new(&day.date.to_string()),
            Cell::new(day.level.as_str()),
            Cell::new_align(&day.count.to_string(), Alignment::RIGHT),
        ]));
    }

    table.add_row(Row::new(vec![
        banner_cell("", Alignment::LEFT),
        banner_cell("total", Alignment::LEFT),
        banner_cell(&total.to_string(), Alignment::RIGHT),
    ]));
    table
}

/// Writes the table to stdout, with the fixed color style when `colorize` is set.
pub fn print_table(table: &Table, colorize: bool) {
    if colorize {
        table.printstd();
    } else {
        print!("{table}");
    }
}
