//! CSV output format for A/B results
//!
//! One row per (experiment, metric, field) so results flatten into a plain
//! table for persistence or spreadsheet analysis.

use crate::inference::ABTestResult;

/// CSV record for one field of one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CsvResultRow {
    pub experiment: String,
    pub metric: String,
    pub field: &'static str,
    pub value: f64,
}

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<CsvResultRow>,
}

impl CsvOutput {
    /// Create a new CSV output formatter
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add every field of an analysis result
    pub fn add_result(&mut self, experiment: &str, metric: &str, result: &ABTestResult) {
        for (field, value) in result.to_rows() {
            self.rows.push(CsvResultRow {
                experiment: experiment.to_string(),
                metric: metric.to_string(),
                field,
                value,
            });
        }
    }

    pub fn rows(&self) -> &[CsvResultRow] {
        &self.rows
    }

    fn header() -> &'static str {
        "experiment,metric,field,value"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Full precision for finite values; NaN / inf / -inf otherwise
    fn format_value(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value > 0.0 { "inf" } else { "-inf" }.to_string()
        } else {
            value.to_string()
        }
    }

    fn format_row(row: &CsvResultRow) -> String {
        [
            Self::escape_field(&row.experiment),
            Self::escape_field(&row.metric),
            row.field.to_string(),
            Self::format_value(row.value),
        ]
        .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(Self::header());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }

        output
    }
}
