//! Text and CSV readers for samples, assignments, and observations
//!
//! Sample files hold one or more values per line separated by commas or
//! whitespace. `NA`, `NaN`, `null`, `None` and empty CSV fields mark missing
//! observations; `#` starts a comment.

use crate::error::InputError;
use crate::experiment::{Assignment, Observation};

const MISSING_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "none"];

fn is_missing(token: &str) -> bool {
    token.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| token.eq_ignore_ascii_case(marker))
}

/// Parse a metric value, `None` for a missing marker
fn parse_value(token: &str, line: usize) -> Result<Option<f64>, InputError> {
    let token = token.trim();
    if is_missing(token) {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .map(Some)
        .map_err(|_| InputError::InvalidValue {
            line,
            token: token.to_string(),
        })
}

/// Strip a trailing `#` comment
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parse sample values, keeping missing entries as `None`
///
/// # Example
/// ```
/// use encore::input::parse_values;
///
/// let values = parse_values("1.5, 2.0\nNA\n3.25 # last\n").unwrap();
/// assert_eq!(values, vec![Some(1.5), Some(2.0), None, Some(3.25)]);
/// ```
pub fn parse_values(text: &str) -> Result<Vec<Option<f64>>, InputError> {
    let mut values = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw);
        if line.trim().is_empty() {
            continue;
        }

        if line.contains(',') {
            // CSV: an empty field between commas is a missing value
            for field in line.split(',') {
                values.push(parse_value(field, idx + 1)?);
            }
        } else {
            for token in line.split_whitespace() {
                values.push(parse_value(token, idx + 1)?);
            }
        }
    }

    Ok(values)
}

/// Split CSV lines into trimmed fields with their line numbers, skipping
/// blanks, comments, and header rows whose first field is `header`
fn csv_records<'a>(
    text: &'a str,
    header: &'a str,
) -> impl Iterator<Item = (usize, Vec<&'a str>)> + 'a {
    text.lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, strip_comment(raw).trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| (line_no, line.split(',').map(str::trim).collect::<Vec<_>>()))
        .filter(move |(_, fields)| !fields[0].eq_ignore_ascii_case(header))
}

fn required<'a>(
    fields: &[&'a str],
    idx: usize,
    line: usize,
    field: &'static str,
) -> Result<&'a str, InputError> {
    match fields[idx] {
        "" => Err(InputError::EmptyField { line, field }),
        value => Ok(value),
    }
}

fn expect_columns(fields: &[&str], expected: usize, line: usize) -> Result<(), InputError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(InputError::ColumnCount {
            line,
            expected,
            actual: fields.len(),
        })
    }
}

/// Parse `user_id,experiment,variant` rows (header optional)
pub fn parse_assignments(text: &str) -> Result<Vec<Assignment>, InputError> {
    csv_records(text, "user_id")
        .map(|(line, fields)| {
            expect_columns(&fields, 3, line)?;
            Ok(Assignment {
                user_id: required(&fields, 0, line, "user_id")?.to_string(),
                experiment: required(&fields, 1, line, "experiment")?.to_string(),
                variant: required(&fields, 2, line, "variant")?.to_string(),
            })
        })
        .collect()
}

/// Parse `user_id,experiment,metric,value` rows (header optional)
pub fn parse_observations(text: &str) -> Result<Vec<Observation>, InputError> {
    csv_records(text, "user_id")
        .map(|(line, fields)| {
            expect_columns(&fields, 4, line)?;
            Ok(Observation {
                user_id: required(&fields, 0, line, "user_id")?.to_string(),
                experiment: required(&fields, 1, line, "experiment")?.to_string(),
                metric: required(&fields, 2, line, "metric")?.to_string(),
                value: parse_value(fields[3], line)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_value_per_line() {
        let values = parse_values("1\n2.5\n-3e2\n").unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.5), Some(-300.0)]);
    }

    #[test]
    fn test_missing_markers() {
        let values = parse_values("NA\nnan\nNULL\nNone\nn/a\n4\n").unwrap();
        assert_eq!(values, vec![None, None, None, None, None, Some(4.0)]);
    }

    #[test]
    fn test_empty_csv_field_is_missing() {
        let values = parse_values("1,,3\n").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_blank_lines_and_comments_skipped() {
        let values = parse_values("# control arm\n\n1 2\n   \n3 # trailing\n").unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_invalid_token_reports_line() {
        let err = parse_values("1\n2\nabc\n").unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidValue {
                line: 3,
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_assignments_with_header() {
        let text = "user_id,experiment,variant\nu1,recs,control\nu2,recs,treatment\n";
        let rows = parse_assignments(text).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].user_id, "u2");
        assert_eq!(rows[1].variant, "treatment");
    }

    #[test]
    fn test_assignments_without_header() {
        let rows = parse_assignments("u1, recs, control\n").unwrap();
        assert_eq!(rows[0].experiment, "recs");
    }

    #[test]
    fn test_assignment_column_count() {
        let err = parse_assignments("u1,recs\n").unwrap_err();
        assert_eq!(
            err,
            InputError::ColumnCount {
                line: 1,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_assignment_empty_user() {
        let err = parse_assignments(",recs,control\n").unwrap_err();
        assert!(matches!(err, InputError::EmptyField { field: "user_id", .. }));
    }

    #[test]
    fn test_observations() {
        let text = "user_id,experiment,metric,value\n\
                    u1,recs,skip_rate,0.25\n\
                    u2,recs,skip_rate,\n\
                    u3,recs,skip_rate,NA\n";
        let rows = parse_observations(text).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].value, Some(0.25));
        assert_eq!(rows[1].value, None);
        assert_eq!(rows[2].value, None);
    }

    #[test]
    fn test_observation_bad_value() {
        let err = parse_observations("u1,recs,skip_rate,fast\n").unwrap_err();
        assert!(matches!(err, InputError::InvalidValue { line: 1, .. }));
    }
}
