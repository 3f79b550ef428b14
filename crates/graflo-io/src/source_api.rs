//! REST API data source (C7): paginates a JSON endpoint via offset/limit, page-number, or
//! cursor strategies and flattens each returned object into a `Record`.

use crate::json_bridge::{array_at_path, object_to_record};
use async_trait::async_trait;
use graflo_core::{DataSource, Record};

/// How successive pages are requested.
#[derive(Debug, Clone)]
pub enum Pagination {
    /// `?{offset_param}=N&{limit_param}=page_size`, stops on a short/empty page.
    OffsetLimit { offset_param: String, limit_param: String },
    /// `?{page_param}=N`, 1-indexed, stops on a short/empty page.
    PageNumber { page_param: String },
    /// `?{cursor_param}={cursor}`. The cursor for the next page is read out of the response
    /// body at `cursor_field` (a dotted path); stops once that field is absent or null.
    Cursor { cursor_param: String, cursor_field: String },
}

enum PaginationState {
    OffsetLimit(usize),
    PageNumber(usize),
    Cursor(Option<String>),
}

/// Pulls paginated JSON from a REST API. `records_path` is a dotted path into each response
/// body locating the array of records (`None` means the response body itself is the array).
pub struct ApiDataSource {
    name: String,
    client: reqwest::Client,
    base_url: String,
    records_path: Option<String>,
    pagination: Pagination,
    state: PaginationState,
    exhausted: bool,
}

impl ApiDataSource {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, pagination: Pagination) -> Self {
        let state = match &pagination {
            Pagination::OffsetLimit { .. } => PaginationState::OffsetLimit(0),
            Pagination::PageNumber { .. } => PaginationState::PageNumber(1),
            Pagination::Cursor { .. } => PaginationState::Cursor(None),
        };
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            records_path: None,
            pagination,
            state,
            exhausted: false,
        }
    }

    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    fn build_url(&self, batch_size: usize) -> String {
        let mut url = reqwest::Url::parse(&self.base_url).expect("valid base_url");
        match (&self.pagination, &self.state) {
            (Pagination::OffsetLimit { offset_param, limit_param }, PaginationState::OffsetLimit(offset)) => {
                url.query_pairs_mut()
                    .append_pair(offset_param, &offset.to_string())
                    .append_pair(limit_param, &batch_size.to_string());
            }
            (Pagination::PageNumber { page_param }, PaginationState::PageNumber(page)) => {
                url.query_pairs_mut().append_pair(page_param, &page.to_string());
            }
            (Pagination::Cursor { cursor_param, .. }, PaginationState::Cursor(Some(cursor))) => {
                url.query_pairs_mut().append_pair(cursor_param, cursor);
            }
            _ => {}
        }
        url.to_string()
    }

    fn advance(&mut self, body: &serde_json::Value, fetched: usize, batch_size: usize) {
        match (&self.pagination, &mut self.state) {
            (Pagination::OffsetLimit { .. }, PaginationState::OffsetLimit(offset)) => {
                *offset += fetched;
                if fetched < batch_size {
                    self.exhausted = true;
                }
            }
            (Pagination::PageNumber { .. }, PaginationState::PageNumber(page)) => {
                *page += 1;
                if fetched < batch_size {
                    self.exhausted = true;
                }
            }
            (Pagination::Cursor { cursor_field, .. }, PaginationState::Cursor(cursor)) => {
                let next = cursor_field
                    .split('.')
                    .try_fold(body, |v, seg| v.as_object()?.get(seg))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                if next.is_none() {
                    self.exhausted = true;
                }
                *cursor = next;
            }
            _ => {}
        }
    }
}

#[async_trait]
impl DataSource for ApiDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>> {
        if self.exhausted {
            return Ok(None);
        }

        let url = self.build_url(batch_size);
        let body: serde_json::Value = self.client.get(&url).send().await?.error_for_status()?.json().await?;

        let records = match array_at_path(&body, self.records_path.as_deref()) {
            Some(items) => items.iter().map(object_to_record).collect::<Vec<_>>(),
            None => Vec::new(),
        };

        if records.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        let fetched = records.len();
        self.advance(&body, fetched, batch_size);
        Ok(Some(records))
    }
}
