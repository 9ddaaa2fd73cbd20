use nu_ansi_term::Color;
use std::cmp::Reverse;

use crate::github::PrState;
use crate::join::JoinedRow;

const COLUMN_GAP: &str = "  ";

/// Display color for a pull request state.
pub fn state_color(state: PrState) -> Color {
    match state {
        PrState::Open => Color::Green,
        PrState::Closed => Color::Red,
        PrState::Merged => Color::Purple,
    }
}

/// Render the selectable table: current branch removed, newest commit first.
///
/// Each line is terminated by a newline; no rows means an empty string.
pub fn render_table(rows: &[JoinedRow], color: bool) -> String {
    let fields = render_rows(rows, color);
    align_columns(&fields)
}

/// Build the per-row fields in display order, without alignment.
pub fn render_rows(rows: &[JoinedRow], color: bool) -> Vec<Vec<String>> {
    let mut visible: Vec<&JoinedRow> = rows.iter().filter(|r| !r.branch.is_current).collect();
    // sort_by_key is stable, so equal timestamps keep their listing order
    visible.sort_by_key(|r| Reverse(r.branch.last_commit_epoch));
    visible.into_iter().map(|r| format_row(r, color)).collect()
}

/// Fields for a single row: name, commit age, and the pull request if one is attached.
pub fn format_row(row: &JoinedRow, color: bool) -> Vec<String> {
    let mut fields = vec![
        row.branch.name.clone(),
        row.branch.last_commit_relative.clone(),
    ];

    if let Some(pr) = &row.pr {
        let number = format!("#{}", pr.number);
        fields.push(if color {
            state_color(pr.state).paint(number).to_string()
        } else {
            number
        });
        fields.push(format!("by {}", pr.author_login));
    }

    fields
}

/// Lay out rows with differing field counts as space-padded columns.
///
/// Widths are measured in display columns, so ANSI color codes and wide
/// glyphs do not skew alignment. The last field of a row is never padded.
pub fn align_columns(rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, field) in row.iter().enumerate() {
            let width = visible_width(field);
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(width),
                None => widths.push(width),
            }
        }
    }

    let mut out = String::new();
    for row in rows {
        for (i, field) in row.iter().enumerate() {
            out.push_str(field);
            if i + 1 < row.len() {
                let pad = widths[i] - visible_width(field);
                out.extend(std::iter::repeat(' ').take(pad));
                out.push_str(COLUMN_GAP);
            }
        }
        out.push('\n');
    }
    out
}

/// Terminal columns taken by `s`, ignoring ANSI escape sequences.
pub fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}
