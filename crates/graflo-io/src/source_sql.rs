//! SQL data source (C7): pages through a pre-built query (typically a `TablePattern::build_query`
//! result) via LIMIT/OFFSET, converting each row into a `Record` by introspecting column types.

use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use graflo_core::{DataSource, Record, Value};
use sqlx::{Column, PgPool, Row, TypeInfo};

pub struct SqlDataSource {
    name: String,
    pool: PgPool,
    base_query: String,
    offset: i64,
    exhausted: bool,
}

impl SqlDataSource {
    pub fn new(name: impl Into<String>, pool: PgPool, base_query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pool,
            base_query: base_query.into(),
            offset: 0,
            exhausted: false,
        }
    }
}

#[async_trait]
impl DataSource for SqlDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>> {
        if self.exhausted {
            return Ok(None);
        }

        let paged = format!("{} LIMIT {} OFFSET {}", self.base_query, batch_size, self.offset);
        let rows = sqlx::query(&paged).fetch_all(&self.pool).await?;

        if rows.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        let fetched = rows.len();
        let batch = rows.iter().map(row_to_record).collect();
        self.offset += fetched as i64;
        if fetched < batch_size {
            self.exhausted = true;
        }
        Ok(Some(batch))
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Record {
    let mut record = Record::new();
    for column in row.columns() {
        let name = column.name().to_string();
        let value = decode_column(row, column);
        record.insert(name, value);
    }
    record
}

fn decode_column(row: &sqlx::postgres::PgRow, column: &sqlx::postgres::PgColumn) -> Value {
    let ordinal = column.ordinal();
    match column.type_info().name() {
        "INT2" | "INT4" | "INT8" => row
            .try_get::<Option<i64>, _>(ordinal)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),
        "FLOAT4" | "FLOAT8" => row
            .try_get::<Option<f64>, _>(ordinal)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(ordinal)
            .ok()
            .flatten()
            .and_then(|d| d.to_f64())
            .map(Value::Float)
            .unwrap_or(Value::Null),
        "BOOL" => row
            .try_get::<Option<bool>, _>(ordinal)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<Option<String>, _>(ordinal)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
