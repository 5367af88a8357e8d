use chrono::NaiveDate;

/// One titled table of the export body.
pub struct Section<'a> {
    pub title: &'a str,
    pub header: &'a [&'a str],
    pub rows: Vec<Vec<String>>,
}

/// Quote a data value: wrapped in double quotes, embedded quotes doubled.
fn escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render one table. The header row is joined unquoted; data values are
/// quoted. A table with no rows renders as an empty string, header
/// included.
fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(","));
    for row in rows {
        lines.push(row.iter().map(|v| escape(v)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

/// Render the full export: each section as a title line plus its table,
/// with a blank line between sections.
pub fn render_export(sections: &[Section]) -> String {
    let mut parts = Vec::with_capacity(sections.len() * 3);
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            parts.push(String::new());
        }
        parts.push(section.title.to_string());
        parts.push(render_table(section.header, &section.rows));
    }
    parts.join("\n")
}

/// Attachment filename carrying the export date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("killeen-next-up-export-{}.csv", date.format("%Y-%m-%d"))
}
