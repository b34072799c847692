//! In-process `RemoteClient` backed by plain collections
//!
//! Used for offline runs and by the tests of every crate above this one.
//! Every call is recorded so callers can assert what went over the "wire".

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use models::Identity;
use serde_json::{Map, Value};

use crate::client::{FunctionRequest, RemoteClient};
use crate::error::{RemoteError, Result};
use crate::query::{Operation, TableQuery};

pub type FunctionHandler = Arc<dyn Fn(&FunctionRequest) -> Result<Value> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Function { name: String, request: FunctionRequest },
    Table(TableQuery),
    Identity,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    table_failures: HashMap<String, RemoteError>,
    functions: HashMap<String, FunctionHandler>,
    identity: Option<Identity>,
    calls: Vec<RecordedCall>,
    next_id: u64,
}

#[derive(Default)]
pub struct MemoryClient {
    state: Mutex<MemoryState>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client with a signed-in user `user_id`.
    pub fn signed_in(user_id: &str) -> Self {
        let client = Self::new();
        client.set_identity(Some(Identity {
            id: user_id.to_string(),
            email: None,
        }));
        client
    }

    pub fn set_identity(&self, identity: Option<Identity>) {
        self.lock().identity = identity;
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every call to `table` fails with `error`.
    pub fn fail_table(&self, table: &str, error: RemoteError) {
        self.lock().table_failures.insert(table.to_string(), error);
    }

    pub fn on_function<F>(&self, name: &str, handler: F)
    where
        F: Fn(&FunctionRequest) -> Result<Value> + Send + Sync + 'static,
    {
        self.lock()
            .functions
            .insert(name.to_string(), Arc::new(handler));
    }

    /// Function `name` always answers `payload`.
    pub fn respond(&self, name: &str, payload: Value) {
        self.on_function(name, move |_| Ok(payload.clone()));
    }

    /// Function `name` always fails with `error`.
    pub fn fail(&self, name: &str, error: RemoteError) {
        self.on_function(name, move |_| Err(error.clone()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Function and table calls; identity lookups are not counted.
    pub fn network_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| !matches!(c, RecordedCall::Identity))
            .count()
    }

    pub fn function_calls(&self, name: &str) -> Vec<FunctionRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Function { name: n, request } if n == name => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RemoteClient for MemoryClient {
    async fn invoke(&self, function: &str, request: FunctionRequest) -> Result<Value> {
        let handler = {
            let mut state = self.lock();
            state.calls.push(RecordedCall::Function {
                name: function.to_string(),
                request: request.clone(),
            });
            state.functions.get(function).cloned()
        };

        match handler {
            Some(handler) => handler(&request),
            None => Err(RemoteError::Server {
                status: Some(404),
                code: None,
                message: format!("Requested function was not found: {function}"),
            }),
        }
    }

    async fn query(&self, query: TableQuery) -> Result<Value> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::Table(query.clone()));

        if let Some(err) = state.table_failures.get(&query.table) {
            return Err(err.clone());
        }

        match &query.operation {
            Operation::Select => {
                let mut matched: Vec<Value> = state
                    .tables
                    .get(&query.table)
                    .map(|rows| {
                        rows.iter()
                            .filter(|row| matches_filters(row, &query.filters))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();

                if let Some(order) = &query.order {
                    matched.sort_by(|a, b| {
                        let ord = compare_values(a.get(&order.column), b.get(&order.column));
                        if order.descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    });
                }
                if let Some(limit) = query.limit {
                    matched.truncate(limit);
                }

                shape(matched, query.single)
            }
            Operation::Insert(payload) => {
                let mut written = Vec::new();
                for row in into_rows(payload)? {
                    let row = stamp_new(&mut state, &query.table, row);
                    state
                        .tables
                        .entry(query.table.clone())
                        .or_default()
                        .push(Value::Object(row.clone()));
                    written.push(Value::Object(row));
                }
                shape(written, query.single)
            }
            Operation::Upsert {
                row: payload,
                on_conflict,
            } => {
                let mut written = Vec::new();
                for mut row in into_rows(payload)? {
                    row.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
                    let key = row.get(on_conflict).cloned();

                    let existing = state.tables.get_mut(&query.table).and_then(|rows| {
                        rows.iter_mut()
                            .find(|r| key.is_some() && r.get(on_conflict) == key.as_ref())
                            .and_then(Value::as_object_mut)
                    });

                    match existing {
                        Some(existing) => {
                            for (k, v) in row {
                                existing.insert(k, v);
                            }
                            written.push(Value::Object(existing.clone()));
                        }
                        None => {
                            let row = stamp_new(&mut state, &query.table, row);
                            state
                                .tables
                                .entry(query.table.clone())
                                .or_default()
                                .push(Value::Object(row.clone()));
                            written.push(Value::Object(row));
                        }
                    }
                }
                shape(written, query.single)
            }
        }
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::Identity);
        Ok(state.identity.clone())
    }
}

fn into_rows(payload: &Value) -> Result<Vec<Map<String, Value>>> {
    let rows = match payload {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    };
    rows.into_iter()
        .map(|row| match row {
            Value::Object(map) => Ok(map),
            other => Err(RemoteError::server(format!("Row must be an object, got {other}"))),
        })
        .collect()
}

fn stamp_new(state: &mut MemoryState, table: &str, mut row: Map<String, Value>) -> Map<String, Value> {
    if !row.contains_key("id") {
        state.next_id += 1;
        row.insert("id".to_string(), Value::String(format!("{table}-{}", state.next_id)));
    }
    if !row.contains_key("created_at") {
        row.insert("created_at".to_string(), Value::String(Utc::now().to_rfc3339()));
    }
    row
}

fn matches_filters(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(column, expected)| row.get(column).map(value_text).as_deref() == Some(expected.as_str()))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn shape(rows: Vec<Value>, single: bool) -> Result<Value> {
    if !single {
        return Ok(Value::Array(rows));
    }
    let mut rows = rows;
    match rows.len() {
        1 => Ok(rows.remove(0)),
        _ => Err(RemoteError::no_rows()),
    }
}
