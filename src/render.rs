use crate::pipeline::Layout;
use crate::types::Entry;
use chrono::{DateTime, Local};
use comfy_table::{Cell, Color, Table};

/// Matches the classic `Jan _2 15:04:05` stamp
const STAMP_FORMAT: &str = "%b %e %H:%M:%S";

/// Minimum gap between columns
const COLUMN_GAP: u16 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStyle {
    pub color: bool,
    pub human_sizes: bool,
}

#[must_use]
pub fn format_stamp(time: &DateTime<Local>) -> String {
    time.format(STAMP_FORMAT).to_string()
}

/// Text of every column of one row, in display order
#[must_use]
pub fn row_cells(entry: &Entry, layout: Layout, style: &RenderStyle) -> Vec<String> {
    let author = entry.owner.clone().unwrap_or_default();

    match layout {
        Layout::Plain => vec![entry.name.clone(), author],
        Layout::WithTime => vec![entry.name.clone(), author, format_stamp(&entry.modified)],
        Layout::Long => {
            let size = if style.human_sizes {
                human_bytes::human_bytes(entry.size as f64)
            } else {
                entry.size.to_string()
            };
            vec![
                entry.permissions.clone(),
                author,
                size,
                format_stamp(&entry.modified),
                entry.name.clone(),
            ]
        }
    }
}

/// Lay out all rows as one aligned block. Directory rows are drawn in blue.
#[must_use]
pub fn render(entries: &[Entry], layout: Layout, style: &RenderStyle) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    if style.color {
        table.enforce_styling();
    } else {
        table.force_no_tty();
    }

    for entry in entries {
        let row = row_cells(entry, layout, style).into_iter().map(|text| {
            if entry.is_dir {
                Cell::new(text).fg(Color::Blue)
            } else {
                Cell::new(text)
            }
        });
        table.add_row(row);
    }

    for column in table.column_iter_mut() {
        column.set_padding((0, COLUMN_GAP));
    }

    table.trim_fmt()
}
