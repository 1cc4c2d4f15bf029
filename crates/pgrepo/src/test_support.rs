//! Shared fixtures for unit tests: a hand-written record and an in-memory executor.

use crate::client::Executor;
use crate::error::{OrmError, OrmResult};
use crate::record::{FieldDescriptor, Record};
use crate::row::Row;
use crate::sql::Statement;
use crate::value::Json;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Example {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub flag: bool,
    pub metadata: Json<serde_json::Value>,
}

impl Record for Example {
    const TABLE: &'static str = "examples";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::identifier("id"),
        FieldDescriptor::timestamp("created_at"),
        FieldDescriptor::timestamp("updated_at"),
        FieldDescriptor::scalar("flag"),
        FieldDescriptor::structured("metadata"),
    ];

    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            flag: row.try_get("flag")?,
            metadata: row.try_get("metadata")?,
        })
    }
}

pub(crate) fn example_row(id: &str, flag: bool) -> Row {
    let ts = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
    Row::new()
        .with("id", id)
        .with("created_at", ts)
        .with("updated_at", ts)
        .with("flag", flag)
        .with("metadata", serde_json::json!({"note": "hi"}))
}

/// Replays canned responses and records every statement it receives.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    responses: Mutex<VecDeque<OrmResult<Vec<Row>>>>,
    seen: Mutex<Vec<Statement>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, rows: Vec<Row>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn fail(self, err: OrmError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Statement {
        self.seen
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no statement executed")
    }
}

impl Executor for RecordingExecutor {
    async fn query(&self, statement: &Statement) -> OrmResult<Vec<Row>> {
        self.seen.lock().unwrap().push(statement.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
