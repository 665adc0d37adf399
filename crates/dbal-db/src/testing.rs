//! Shared fixtures for unit tests: a scripted executor and a few
//! Northwind-style models.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use dbal_core::{DbalError, DbalResult};

use crate::executor::{BufferedRowSet, DbExecutor, QueryOutcome, ResultMode, RowSet};
use crate::fields::{Column, ColumnKind};
use crate::model::{ForeignKey, Model, ModelMeta, Record};
use crate::row::Row;
use crate::value::Value;

enum Scripted {
    Rows(Vec<Row>),
    Count(u64),
    InsertId(Value),
    Affected(u64),
    Fail(String),
}

/// Records every statement and answers from a queue of scripted outcomes.
///
/// With an empty queue it answers with an empty row set, a zero count, a
/// NULL id or zero affected rows, depending on the mode.
#[derive(Default)]
pub struct RecordingExecutor {
    shard: Option<&'static str>,
    script: Mutex<VecDeque<Scripted>>,
    log: Mutex<Vec<(String, ResultMode)>>,
    released: Arc<AtomicUsize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_shard(mut self, shard: &'static str) -> Self {
        self.shard = Some(shard);
        self
    }

    fn push(self, outcome: Scripted) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.push(Scripted::Rows(rows))
    }

    pub fn with_count(self, count: u64) -> Self {
        self.push(Scripted::Count(count))
    }

    pub fn with_insert_id(self, id: Value) -> Self {
        self.push(Scripted::InsertId(id))
    }

    pub fn with_affected(self, affected: u64) -> Self {
        self.push(Scripted::Affected(affected))
    }

    pub fn failing(self, message: &str) -> Self {
        self.push(Scripted::Fail(message.to_string()))
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    pub fn modes(&self) -> Vec<ResultMode> {
        self.log.lock().unwrap().iter().map(|(_, mode)| *mode).collect()
    }

    /// How many row sets handed out have been released.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn rows(&self, rows: Vec<Row>) -> QueryOutcome {
        QueryOutcome::Rows(Box::new(TrackedRowSet {
            inner: BufferedRowSet::new(rows),
            released: Arc::clone(&self.released),
        }))
    }
}

impl DbExecutor for RecordingExecutor {
    fn shard(&self) -> &str {
        self.shard.unwrap_or("default")
    }

    fn execute(&self, sql: &str, mode: ResultMode) -> DbalResult<QueryOutcome> {
        self.log.lock().unwrap().push((sql.to_string(), mode));
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Rows(rows)) => Ok(self.rows(rows)),
            Some(Scripted::Count(n)) => Ok(QueryOutcome::Count(n)),
            Some(Scripted::InsertId(id)) => Ok(QueryOutcome::InsertId(id)),
            Some(Scripted::Affected(n)) => Ok(QueryOutcome::Affected(n)),
            Some(Scripted::Fail(message)) => Err(DbalError::DatabaseError(message)),
            None => Ok(match mode {
                ResultMode::RowSet => self.rows(Vec::new()),
                ResultMode::ScalarCount => QueryOutcome::Count(0),
                ResultMode::LastInsertId => QueryOutcome::InsertId(Value::Null),
            }),
        }
    }

    fn execute_batch(&self, sql: &str) -> DbalResult<()> {
        self.log.lock().unwrap().push((sql.to_string(), ResultMode::RowSet));
        Ok(())
    }
}

struct TrackedRowSet {
    inner: BufferedRowSet,
    released: Arc<AtomicUsize>,
}

impl RowSet for TrackedRowSet {
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn fetch_next(&mut self) -> DbalResult<Option<Row>> {
        self.inner.fetch_next()
    }

    fn seek(&mut self, offset: usize) -> bool {
        self.inner.seek(offset)
    }

    fn release(&mut self) {
        if !self.inner.is_released() {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.release();
    }
}

// ── Models ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: String,
    pub contact_name: String,
}

impl Customer {
    pub fn new(customer_id: &str, contact_name: &str) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            contact_name: contact_name.to_string(),
        }
    }
}

impl Model for Customer {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "Customers",
                vec![
                    Column::id("CustomerID").with_kind(ColumnKind::Char),
                    Column::string("ContactName"),
                ],
            )
        });
        &META
    }

    fn id(&self) -> Value {
        Value::from(&self.customer_id)
    }

    fn from_record(record: &Record<'_>) -> DbalResult<Self> {
        Ok(Self {
            customer_id: record.get("CustomerID")?,
            contact_name: record.get("ContactName")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Model for Employee {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "Employees",
                vec![
                    Column::id("EmployeeID"),
                    Column::string("FirstName"),
                    Column::string("LastName"),
                ],
            )
        });
        &META
    }

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn from_record(record: &Record<'_>) -> DbalResult<Self> {
        Ok(Self {
            id: record.get("EmployeeID")?,
            first_name: record.get("FirstName")?,
            last_name: record.get("LastName")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub ship_name: String,
    pub customer: ForeignKey<Customer>,
    pub employee: ForeignKey<Employee>,
}

impl Model for Order {
    fn meta() -> &'static ModelMeta {
        static META: LazyLock<ModelMeta> = LazyLock::new(|| {
            ModelMeta::new(
                "Orders",
                vec![
                    Column::id("OrderID"),
                    Column::string("ShipName"),
                    Column::string("ShipCity"),
                    Column::foreign_key("CustomerID", "Customers").with_kind(ColumnKind::Char),
                    Column::foreign_key("EmployeeID", "Employees"),
                ],
            )
        });
        &META
    }

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn from_record(record: &Record<'_>) -> DbalResult<Self> {
        Ok(Self {
            id: record.get("OrderID")?,
            ship_name: record.get("ShipName")?,
            customer: record.foreign_key("CustomerID")?,
            employee: record.foreign_key("EmployeeID")?,
        })
    }
}

// ── Rows ──────────────────────────────────────────────────────────────

pub fn customer_row(id: &str, contact_name: &str) -> Row {
    Row::from_pairs([
        ("CustomerID", Value::from(id)),
        ("ContactName", Value::from(contact_name)),
    ])
}

pub fn employee_row(id: i64, last_name: &str) -> Row {
    Row::from_pairs([
        ("EmployeeID", Value::Int(id)),
        ("FirstName", Value::from("Nancy")),
        ("LastName", Value::from(last_name)),
    ])
}

pub fn order_row(id: i64, customer_id: &str, employee_id: Option<i64>) -> Row {
    Row::from_pairs([
        ("OrderID", Value::Int(id)),
        ("ShipName", Value::from("Vins et alcools Chevalier")),
        ("ShipCity", Value::from("Reims")),
        ("CustomerID", Value::from(customer_id)),
        ("EmployeeID", Value::from(employee_id)),
    ])
}
