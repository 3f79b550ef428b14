//! Datetime range WHERE-clause helper, supplementing `TablePattern::build_query` with the
//! `IngestionParams.datetime_after`/`datetime_before` bounds. Grounded on `filter/sql.py`.

use graflo_core::IngestionParams;

/// Builds a half-open `[datetime_after, datetime_before)` WHERE fragment against
/// `params.datetime_column`, or `None` if no bound (or no column) is configured.
pub fn datetime_range_where_sql(params: &IngestionParams) -> Option<String> {
    let column = params.datetime_column.as_ref()?;
    let mut clauses = Vec::new();
    if let Some(after) = &params.datetime_after {
        clauses.push(format!("\"{column}\" >= '{}'", after.replace('\'', "''")));
    }
    if let Some(before) = &params.datetime_before {
        clauses.push(format!("\"{column}\" < '{}'", before.replace('\'', "''")));
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_half_open_range() {
        let params = IngestionParams {
            datetime_column: Some("created_at".to_string()),
            datetime_after: Some("2024-01-01".to_string()),
            datetime_before: Some("2024-02-01".to_string()),
            ..Default::default()
        };
        let clause = datetime_range_where_sql(&params).unwrap();
        assert_eq!(
            clause,
            "\"created_at\" >= '2024-01-01' AND \"created_at\" < '2024-02-01'"
        );
    }

    #[test]
    fn no_column_means_no_clause() {
        let params = IngestionParams::default();
        assert!(datetime_range_where_sql(&params).is_none());
    }

    #[test]
    fn one_sided_bound_is_supported() {
        let params = IngestionParams {
            datetime_column: Some("created_at".to_string()),
            datetime_after: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            datetime_range_where_sql(&params).unwrap(),
            "\"created_at\" >= '2024-01-01'"
        );
    }
}
