//! Fixed-width table rendering for history records.

use heartview_client::{Column, PredictionRecord};

/// Render records under the history table headers, id column first.
pub fn render(records: &[&PredictionRecord]) -> String {
    let mut headers = vec!["ID".to_string()];
    headers.extend(Column::ALL.iter().map(|c| c.label().to_string()));

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let mut row = vec![record.id.clone()];
        row.extend(Column::ALL.iter().map(|c| c.rendered_value(record)));
        rows.push(row);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    let rule_len = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        for _ in cell.len()..widths[i] {
            out.push(' ');
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PredictionRecord {
        serde_json::from_value(serde_json::json!({
            "id": "a1",
            "feature1": 63, "feature2": 1, "feature3": 3, "feature4": 145,
            "feature5": 233, "feature6": 1, "feature7": 0, "feature8": 150,
            "feature9": 0, "feature10": 2.3, "feature11": 0, "feature12": 0,
            "feature13": 1, "prediction": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_render_includes_headers_and_values() {
        let record = sample_record();
        let rendered = render(&[&record]);

        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("ID"));
        assert!(header.contains("Age"));
        assert!(header.contains("Prediction"));

        // Separator, then the row with display-normalized values.
        assert!(lines.next().unwrap().starts_with('-'));
        let row = lines.next().unwrap();
        assert!(row.starts_with("a1"));
        assert!(row.contains("male"));
        assert!(row.contains("detected"));
        assert!(row.contains("2.3"));
    }

    #[test]
    fn test_render_aligns_columns() {
        let record = sample_record();
        let rendered = render(&[&record]);
        let lines: Vec<&str> = rendered.lines().collect();

        // "Age" starts at the same offset in the header and the row.
        let header_pos = lines[0].find("Age").unwrap();
        let value_pos = lines[2].find("63").unwrap();
        assert_eq!(header_pos, value_pos);
    }
}
