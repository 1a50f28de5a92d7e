//! Audit trail reader
//!
//! Read-only queries over history tables. Pages are keyset-paginated on
//! `history_id`, which follows commit order, so a cursor stays valid while
//! new rows are appended.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo;
use rusqlite::types::Value;
use rusqlite::Connection;
use snapaudit_core::errors::{ExError, ExErrorKind};
use snapaudit_core::model::{ChangeTag, HistoryRecord, ProfileFields};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Position after which the next page starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HistoryCursor(i64);

impl HistoryCursor {
    pub fn after(history_id: i64) -> Self {
        Self(history_id)
    }

    pub fn history_id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for HistoryCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HistoryCursor {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<i64>().map(HistoryCursor).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_cursor")
                .with_message(format!("invalid history cursor '{}': {}", s, e))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryQuery {
    pub subject_id: String,
    pub order: TrailOrder,
    /// Only these actions; empty means all
    pub actions: Vec<ChangeTag>,
    pub limit: u32,
    pub after: Option<HistoryCursor>,
}

impl HistoryQuery {
    pub fn for_subject(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            order: TrailOrder::OldestFirst,
            actions: Vec::new(),
            limit: DEFAULT_PAGE_SIZE,
            after: None,
        }
    }

    #[must_use]
    pub fn newest_first(mut self) -> Self {
        self.order = TrailOrder::NewestFirst;
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ChangeTag>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn starting_after(mut self, cursor: HistoryCursor) -> Self {
        self.after = Some(cursor);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage<F: ProfileFields> {
    pub items: Vec<HistoryRecord<F>>,
    /// Set when more rows match beyond this page
    pub next: Option<HistoryCursor>,
}

/// Build the WHERE tail shared by pages and counts
fn filter_clause(subject_id: &str, actions: &[ChangeTag]) -> (String, Vec<Value>) {
    let mut clause = String::from("WHERE subject_id = ?");
    let mut params = vec![Value::Text(subject_id.to_string())];

    if !actions.is_empty() {
        let placeholders = vec!["?"; actions.len()].join(", ");
        clause.push_str(&format!(" AND action IN ({})", placeholders));
        params.extend(actions.iter().map(|a| Value::Text(a.as_str().to_string())));
    }

    (clause, params)
}

/// Read one page of a subject's history
///
/// # Errors
///
/// `InvalidInput` for a zero limit; `Persistence` or `Serialization` if rows
/// cannot be read.
pub fn read_page<F: ProfileFields>(conn: &Connection, query: &HistoryQuery) -> Result<HistoryPage<F>> {
    if query.limit == 0 {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("read_page")
            .with_entity_id(query.subject_id.clone())
            .with_message("page limit must be greater than zero"));
    }

    let (mut clause, mut params) = filter_clause(&query.subject_id, &query.actions);

    let (cmp, dir) = match query.order {
        TrailOrder::OldestFirst => (">", "ASC"),
        TrailOrder::NewestFirst => ("<", "DESC"),
    };
    if let Some(cursor) = query.after {
        clause.push_str(&format!(" AND history_id {} ?", cmp));
        params.push(Value::Integer(cursor.history_id()));
    }

    // One extra row tells us whether another page exists
    clause.push_str(&format!(" ORDER BY history_id {} LIMIT ?", dir));
    params.push(Value::Integer(i64::from(query.limit) + 1));

    let mut items = repo::history::select::<F>(conn, &clause, &params)?;

    let next = if items.len() > query.limit as usize {
        items.truncate(query.limit as usize);
        items
            .last()
            .and_then(|r| r.history_id)
            .map(HistoryCursor::after)
    } else {
        None
    };

    Ok(HistoryPage { items, next })
}

/// Number of history rows for a subject, optionally restricted to `actions`
///
/// # Errors
///
/// `Persistence` if the count query fails.
pub fn count<F: ProfileFields>(conn: &Connection, subject_id: &str, actions: &[ChangeTag]) -> Result<u64> {
    let (clause, params) = filter_clause(subject_id, actions);
    repo::history::count::<F>(conn, &clause, &params)
}

/// Lazily iterate a subject's whole trail, one page at a time
pub fn trail<F: ProfileFields>(conn: &Connection, query: HistoryQuery) -> HistoryTrail<'_, F> {
    HistoryTrail {
        conn,
        query,
        buffer: VecDeque::new(),
        exhausted: false,
    }
}

/// Iterator returned by [`trail`]
///
/// Stops after the first error.
pub struct HistoryTrail<'c, F: ProfileFields> {
    conn: &'c Connection,
    query: HistoryQuery,
    buffer: VecDeque<HistoryRecord<F>>,
    exhausted: bool,
}

impl<F: ProfileFields> Iterator for HistoryTrail<'_, F> {
    type Item = Result<HistoryRecord<F>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.buffer.pop_front() {
            return Some(Ok(record));
        }
        if self.exhausted {
            return None;
        }

        match read_page::<F>(self.conn, &self.query) {
            Ok(page) => {
                self.exhausted = page.next.is_none();
                self.query.after = page.next;
                self.buffer.extend(page.items);
                self.buffer.pop_front().map(Ok)
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}
