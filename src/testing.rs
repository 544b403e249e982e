//! In-memory stand-in for a backend table, plus record fixtures.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::RemoteError;
use crate::models::{Employee, EmployeeRole, Transaction, TransactionStatus};
use crate::query::{ListQuery, SortDirection};
use crate::remote::{Draft, Entity, RemoteCollection};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(Vec<(String, String)>),
    Create(Value),
    Update(String, Value),
    Delete(String),
}

/// Records every call, assigns keys and timestamps on insert, and can be
/// told to fail the next call.
pub(crate) struct MockCollection<T> {
    rows: Mutex<Vec<Value>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<RemoteError>>,
    clock: Mutex<DateTime<Utc>>,
    _entity: PhantomData<fn() -> T>,
}

fn column_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<T: Entity> MockCollection<T> {
    pub(crate) fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            clock: Mutex::new(base_time() + Duration::days(1)),
            _entity: PhantomData,
        }
    }

    pub(crate) fn with_rows(rows: Vec<T>) -> Self {
        let mock = Self::new();
        for row in rows {
            mock.insert_row(row);
        }
        mock
    }

    pub(crate) fn insert_row(&self, row: T) {
        let value = serde_json::to_value(row).expect("serialize fixture row");
        self.rows.lock().unwrap().push(value);
    }

    pub(crate) fn fail_next(&self, err: RemoteError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_params().len()
    }

    pub(crate) fn list_params(&self) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn mutation_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .count()
    }

    fn record(&self, call: Call) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn decode(value: Value) -> Result<T, RemoteError> {
        serde_json::from_value(value).map_err(|e| RemoteError::decode(T::TABLE, &e))
    }

    fn position(rows: &[Value], key: &str) -> Option<usize> {
        rows.iter()
            .position(|r| r.get(T::KEY_COLUMN).and_then(Value::as_str) == Some(key))
    }
}

#[async_trait]
impl<T: Entity> RemoteCollection<T> for MockCollection<T> {
    async fn list(&self, query: &ListQuery) -> Result<Vec<T>, RemoteError> {
        self.record(Call::List(query.to_params()))?;
        let rows = self.rows.lock().unwrap().clone();
        let mut matching: Vec<T> = rows
            .into_iter()
            .filter(|row| {
                query.filters().iter().all(|(column, value)| {
                    row.get(column).and_then(column_text).as_deref() == Some(value.as_str())
                })
            })
            .map(Self::decode)
            .collect::<Result<_, _>>()?;
        if let Some((_, direction)) = query.order() {
            matching.sort_by_key(|r| r.created_at());
            if direction == SortDirection::Descending {
                matching.reverse();
            }
        }
        if let Some(limit) = query.row_limit() {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, RemoteError> {
        let payload = draft.insert_payload();
        self.record(Call::Create(payload.clone()))?;
        let created_at = {
            let mut clock = self.clock.lock().unwrap();
            *clock += Duration::seconds(1);
            *clock
        };
        let mut row = payload;
        if let Some(obj) = row.as_object_mut() {
            obj.insert(T::KEY_COLUMN.into(), json!(Uuid::new_v4()));
            obj.insert("created_at".into(), json!(created_at));
        }
        let record = Self::decode(row.clone())?;
        self.rows.lock().unwrap().push(row);
        Ok(record)
    }

    async fn update(&self, key: &T::Key, patch: &T::Draft) -> Result<T, RemoteError> {
        let body = patch.update_payload();
        let key = key.to_string();
        self.record(Call::Update(key.clone(), body.clone()))?;
        let mut rows = self.rows.lock().unwrap();
        let idx = Self::position(&rows, &key)
            .ok_or_else(|| RemoteError::not_found(T::TABLE, &key))?;
        if let (Some(target), Some(changes)) = (rows[idx].as_object_mut(), body.as_object()) {
            for (k, v) in changes {
                target.insert(k.clone(), v.clone());
            }
        }
        Self::decode(rows[idx].clone())
    }

    async fn delete(&self, key: &T::Key) -> Result<(), RemoteError> {
        let key = key.to_string();
        self.record(Call::Delete(key.clone()))?;
        let mut rows = self.rows.lock().unwrap();
        let idx = Self::position(&rows, &key)
            .ok_or_else(|| RemoteError::not_found(T::TABLE, &key))?;
        rows.remove(idx);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
}

/// An employee created `minutes` after the base time.
pub(crate) fn employee(name: &str, role: EmployeeRole, minutes: i64) -> Employee {
    serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "full_name": name,
        "pin": "0000",
        "rfid_code": null,
        "role": role.as_str(),
        "is_active": true,
        "created_at": base_time() + Duration::minutes(minutes),
    }))
    .expect("employee fixture")
}

/// A 30 L sale at 35.5 per liter created `minutes` after the base time.
pub(crate) fn transaction(
    receipt: &str,
    status: TransactionStatus,
    employee_name: &str,
    fuel_name: &str,
    minutes: i64,
) -> Transaction {
    serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "fuel_amount": 30.0,
        "fuel_price_per_liter": 35.5,
        "total_amount": 1065.0,
        "payment_method": "qr_code",
        "status": status.as_str(),
        "receipt_number": receipt,
        "created_at": base_time() + Duration::minutes(minutes),
        "fuel_type_id": Uuid::new_v4(),
        "employee_id": Uuid::new_v4(),
        "fuel_types": { "name": fuel_name, "type": "diesel" },
        "employees": { "full_name": employee_name },
    }))
    .expect("transaction fixture")
}
