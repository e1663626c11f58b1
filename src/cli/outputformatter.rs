use terminal_size::{terminal_size, Height, Width};

/// Render rows as an ASCII grid with a `rows: N` footer.
/// Numeric-looking cells are right-aligned; long cells are elided.
pub fn render_table(cols: &[&str], rows: &[Vec<String>]) -> String {
    render_table_width(cols, rows, get_terminal_width())
}

pub fn render_table_width(cols: &[&str], rows: &[Vec<String>], termw: usize) -> String {
    let max_col_width = termw.clamp(8, 80);
    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(max_col_width)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(max_col_width); }
        }
    }

    let header: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
    let sep = build_separator(&widths);
    let mut out = String::new();
    for line in [&sep, &build_row(&header, &widths, false), &sep] {
        out.push_str(&fit_line_to_width(line, termw));
        out.push('\n');
    }
    for r in rows {
        out.push_str(&fit_line_to_width(&build_row(r, &widths, true), termw));
        out.push('\n');
    }
    out.push_str(&fit_line_to_width(&sep, termw));
    out.push('\n');
    out.push_str(&format!("rows: {}", rows.len()));
    out
}

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w as usize).saturating_sub(4).max(20);
    }
    120
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize], align_numbers: bool) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(display_len(&text)));
        s.push(' ');
        if align_numbers && is_numeric_like(cell) {
            s.push_str(&pad);
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&pad);
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if display_len(s) <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn fit_line_to_width(s: &str, maxw: usize) -> String { truncate(s, maxw) }

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}
