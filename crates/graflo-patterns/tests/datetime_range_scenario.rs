//! End-to-end scenario: a datetime-bounded resource keeps exactly the rows that fall in
//! the half-open `[datetime_after, datetime_before)` range the generated WHERE clause
//! describes.

use chrono::NaiveDate;
use graflo_core::IngestionParams;
use graflo_patterns::datetime_range_where_sql;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn half_open_range_keeps_exactly_the_two_rows_inside_the_bound() {
    let params = IngestionParams {
        datetime_column: Some("purchase_date".to_string()),
        datetime_after: Some("2020-02-01".to_string()),
        datetime_before: Some("2020-06-01".to_string()),
        ..Default::default()
    };

    let clause = datetime_range_where_sql(&params).unwrap();
    assert!(clause.contains("\"purchase_date\" >= '2020-02-01'"));
    assert!(clause.contains("\"purchase_date\" < '2020-06-01'"));

    let rows = [
        "2020-01-10",
        "2020-03-15",
        "2020-05-20",
        "2020-07-01",
        "2020-09-01",
        "2020-12-01",
    ];
    let after = date(params.datetime_after.as_ref().unwrap());
    let before = date(params.datetime_before.as_ref().unwrap());

    let kept: Vec<&str> = rows.iter().copied().filter(|row| {
        let d = date(row);
        d >= after && d < before
    }).collect();

    assert_eq!(kept, vec!["2020-03-15", "2020-05-20"]);
}
