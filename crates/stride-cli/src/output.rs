use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header. Widths count chars so `▓` bars line up.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| -> String {
        let padded: Vec<String> = cells
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:w$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&mut headers.iter().copied());
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&line(&mut row.iter().map(String::as_str)));
    }
    out
}

/// `▓▓▓░░░ 50%` style bar.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!(
        "{}{} {percent}%",
        "▓".repeat(filled),
        "░".repeat(width - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_rounds_to_width() {
        assert_eq!(progress_bar(0, 4), "░░░░ 0%");
        assert_eq!(progress_bar(50, 4), "▓▓░░ 50%");
        assert_eq!(progress_bar(100, 4), "▓▓▓▓ 100%");
    }

    #[test]
    fn table_pads_by_chars() {
        let rows = vec![
            vec!["1".to_string(), progress_bar(50, 2)],
            vec!["12".to_string(), "".to_string()],
        ];
        let out = render_table(&["WEEK", "BAR"], &rows);
        assert_eq!(
            out,
            "WEEK  BAR\n----  ------\n1     ▓░ 50%\n12\n"
        );
    }
}
