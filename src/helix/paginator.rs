use serde_json::Value;
use std::collections::VecDeque;

use super::executor::RequestExecutor;
use super::http::{HttpResponse, HttpTransport};
use super::request::RequestSpec;
use crate::error::Error;

/// One page of raw API items with the cursor for the next one
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub cursor: Option<String>,
}

impl Page {
    pub(crate) fn from_response(response: &HttpResponse) -> Result<Self, Error> {
        let envelope: Value = response.json().map_err(|e| Error::Decode {
            message: e.to_string(),
            body: response.body.clone(),
        })?;

        let items = match envelope.get("data") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(Error::Decode {
                    message: "response has no data array".to_string(),
                    body: response.body.clone(),
                })
            }
        };

        // An empty cursor string marks the end, same as no cursor at all
        let cursor = match envelope
            .pointer("/pagination/cursor")
            .and_then(Value::as_str)
        {
            Some(cursor) if !cursor.is_empty() => Some(cursor.to_string()),
            _ => None,
        };

        Ok(Self { items, cursor })
    }
}

/// Walks a cursor-paginated listing on demand
///
/// Nothing is fetched until the caller asks; dropping the paginator after a
/// page simply stops requesting. A page that comes back empty but with a
/// cursor is not the end, the walk continues until the cursor disappears.
pub struct Paginator<'a, H: HttpTransport> {
    executor: &'a RequestExecutor<H>,
    next_request: Option<RequestSpec>,
    buffered: VecDeque<Value>,
}

impl<'a, H: HttpTransport> Paginator<'a, H> {
    pub(crate) fn new(executor: &'a RequestExecutor<H>, request: RequestSpec) -> Self {
        Self {
            executor,
            next_request: Some(request),
            buffered: VecDeque::new(),
        }
    }

    /// Fetches the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Page>, Error> {
        let request = match self.next_request.take() {
            Some(request) => request,
            None => return Ok(None),
        };

        let page = match self.fetch(&request).await {
            Ok(page) => page,
            Err(e) => {
                // Keep the position so a transient failure can be retried
                self.next_request = Some(request);
                return Err(e);
            }
        };

        if let Some(cursor) = &page.cursor {
            self.next_request = Some(request.with_cursor(cursor));
        }

        Ok(Some(page))
    }

    /// Yields the next item, fetching pages as needed
    pub async fn next_item(&mut self) -> Result<Option<Value>, Error> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Ok(Some(item));
            }
            match self.next_page().await? {
                Some(page) => self.buffered.extend(page.items),
                None => return Ok(None),
            }
        }
    }

    /// Drains every remaining item into a vector
    pub async fn collect_remaining(mut self) -> Result<Vec<Value>, Error> {
        let mut items: Vec<Value> = self.buffered.drain(..).collect();
        while let Some(page) = self.next_page().await? {
            items.extend(page.items);
        }
        Ok(items)
    }

    async fn fetch(&self, request: &RequestSpec) -> Result<Page, Error> {
        let response = self.executor.execute(request).await?;
        Page::from_response(&response)
    }
}
