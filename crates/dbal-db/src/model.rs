//! Model trait, metadata, and the row-to-model data mapper.
//!
//! A model is a Rust type bound to one table. It declares its columns once in
//! a static [`ModelMeta`] and builds itself from a [`Record`], the view of
//! one result row handed to it by the [`DataMapper`].
//!
//! Relations are explicit: a foreign-key column is read into a
//! [`ForeignKey<M>`] field, which carries the raw key and, once loaded, the
//! related instance.
//!
//! Relations load eagerly while a row is hydrated. A key that points back at
//! a row still being hydrated on this thread is left unloaded, so cyclic and
//! self-referencing data terminates.

use std::cell::RefCell;

use dbal_core::settings::DEFAULT_SHARD;
use dbal_core::{DbalError, DbalResult};

use crate::executor::{DbExecutor, RoutedExecutor};
use crate::fields::{validate_fields, Column, ModelFields};
use crate::query::Manager;
use crate::row::{FromValue, Row};
use crate::value::Value;

/// The core trait for all models.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
///
/// use dbal_core::DbalResult;
/// use dbal_db::fields::Column;
/// use dbal_db::model::{Model, ModelMeta, Record};
/// use dbal_db::value::Value;
///
/// struct Employee {
///     id: i64,
///     last_name: String,
/// }
///
/// impl Model for Employee {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new(
///                 "Employees",
///                 vec![Column::id("EmployeeID"), Column::string("LastName")],
///             )
///         });
///         &META
///     }
///
///     fn id(&self) -> Value {
///         Value::Int(self.id)
///     }
///
///     fn from_record(record: &Record<'_>) -> DbalResult<Self> {
///         Ok(Self {
///             id: record.get("EmployeeID")?,
///             last_name: record.get("LastName")?,
///         })
///     }
/// }
///
/// assert_eq!(Employee::table_name(), "Employees");
/// assert_eq!(Employee::id_field().unwrap().name(), "EmployeeID");
/// ```
pub trait Model: Sized + Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the database table name.
    fn table_name() -> &'static str {
        Self::meta().table_name
    }

    /// Returns the declared columns.
    fn fields() -> &'static [Column] {
        &Self::meta().fields
    }

    /// Returns the shard whose connection serves this model.
    fn shard() -> &'static str {
        Self::meta().shard
    }

    /// Returns the identifier column.
    fn id_field() -> DbalResult<&'static Column> {
        Self::fields().id_field()
    }

    /// Returns this instance's identifier value.
    fn id(&self) -> Value;

    /// Builds an instance from one hydrated row.
    fn from_record(record: &Record<'_>) -> DbalResult<Self>;

    /// Returns a fresh manager for this model.
    fn objects() -> Manager<Self> {
        Manager::new()
    }
}

/// Static, per-model metadata.
#[derive(Debug, Clone)]
pub struct ModelMeta {
    /// The database table name.
    pub table_name: &'static str,
    /// The shard key used to pick a connection.
    pub shard: &'static str,
    /// The declared columns, in declaration order.
    pub fields: Vec<Column>,
}

impl ModelMeta {
    /// Metadata for a model on the default shard.
    pub fn new(table_name: &'static str, fields: Vec<Column>) -> Self {
        Self {
            table_name,
            shard: DEFAULT_SHARD,
            fields,
        }
    }

    /// Moves the model to another shard.
    #[must_use]
    pub const fn with_shard(mut self, shard: &'static str) -> Self {
        self.shard = shard;
        self
    }

    /// Checks that exactly one identifier column is declared.
    pub fn validate(&self) -> DbalResult<()> {
        validate_fields(self.table_name, &self.fields)
    }
}

/// The view of one result row given to [`Model::from_record`].
pub struct Record<'a> {
    table: &'static str,
    id: Value,
    row: &'a Row,
    db: &'a dyn DbExecutor,
}

impl<'a> Record<'a> {
    /// The table the row was read from.
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// The value of the identifier column, or NULL when the model has none.
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// The underlying row.
    pub const fn row(&self) -> &'a Row {
        self.row
    }

    /// Reads a typed field value.
    pub fn get<T: FromValue>(&self, field: &str) -> DbalResult<T> {
        self.row.get(field)
    }

    /// Reads a foreign-key column and loads the related instance.
    ///
    /// A NULL key yields an unloaded [`ForeignKey`]; a key with no matching
    /// row yields a loaded one whose [`get`](ForeignKey::get) is `None`. A
    /// key naming a row already being hydrated further up the relation
    /// chain is left unloaded.
    pub fn foreign_key<R: Model>(&self, field: &str) -> DbalResult<ForeignKey<R>> {
        let key: Value = self.row.get(field)?;
        let mut fk = ForeignKey::new(key);
        fk.load(self.db)?;
        Ok(fk)
    }
}

/// A statically typed relation to another model.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey<M> {
    key: Value,
    related: Option<Box<M>>,
    loaded: bool,
}

impl<M: Model> ForeignKey<M> {
    /// An unloaded relation holding only the raw key.
    pub fn new(key: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            related: None,
            loaded: false,
        }
    }

    /// The raw key value.
    pub const fn key(&self) -> &Value {
        &self.key
    }

    /// The related instance, if loaded and found.
    pub fn get(&self) -> Option<&M> {
        self.related.as_deref()
    }

    /// Whether [`load`](Self::load) has run.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetches the related instance by identifier.
    ///
    /// Runs `M::objects().find_one(key).get(..)` against the connection of
    /// `M`'s shard. A NULL key sends nothing, and so does a key whose row is
    /// mid-hydration on this thread.
    ///
    /// # Errors
    ///
    /// Returns [`DbalError::ImproperlyConfigured`] if `M` lives on another
    /// shard than `db` and `db` has no [`ShardResolver`](crate::executor::ShardResolver).
    pub fn load(&mut self, db: &dyn DbExecutor) -> DbalResult<Option<&M>> {
        if self.key.is_null() {
            return Ok(None);
        }
        if hydrating(M::table_name(), &self.key) {
            tracing::debug!(table = M::table_name(), key = %self.key, "cyclic relation left unloaded");
            return Ok(None);
        }

        let shard = M::shard();
        let query = M::objects().find_one(self.key.clone());
        let related = if shard == db.shard() {
            query.get(db)?
        } else {
            let resolver = db.resolver().ok_or_else(|| {
                DbalError::ImproperlyConfigured(format!(
                    "'{}' lives on shard '{shard}' but the connection serves '{}' and cannot route",
                    M::table_name(),
                    db.shard()
                ))
            })?;
            let routed = RoutedExecutor::new(resolver.resolve(shard)?, resolver);
            query.get(&routed)?
        };
        self.related = related.map(Box::new);
        self.loaded = true;
        Ok(self.related.as_deref())
    }

    /// Consumes the relation, returning the related instance.
    pub fn into_inner(self) -> Option<M> {
        self.related.map(|m| *m)
    }
}

thread_local! {
    static HYDRATING: RefCell<Vec<(&'static str, String)>> = const { RefCell::new(Vec::new()) };
}

fn hydrating(table: &'static str, key: &Value) -> bool {
    let key = key.to_string();
    HYDRATING.with(|stack| stack.borrow().iter().any(|(t, k)| *t == table && *k == key))
}

/// Marks a row as being hydrated until dropped.
struct HydrationGuard;

impl HydrationGuard {
    fn enter(table: &'static str, id: &Value) -> Option<Self> {
        if id.is_null() {
            return None;
        }
        HYDRATING.with(|stack| stack.borrow_mut().push((table, id.to_string())));
        Some(Self)
    }
}

impl Drop for HydrationGuard {
    fn drop(&mut self) {
        HYDRATING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Hydrates result rows into model instances.
pub struct DataMapper;

impl DataMapper {
    /// Builds one `M` from `row`.
    ///
    /// Every declared column must be present in the row. The identifier is
    /// captured first; foreign keys are resolved by the model through
    /// [`Record::foreign_key`], using `db` or, for related models on other
    /// shards, its resolver.
    ///
    /// # Errors
    ///
    /// Returns [`DbalError::DatabaseError`] naming the missing columns, or
    /// whatever [`Model::from_record`] reports.
    pub fn hydrate<M: Model>(row: &Row, db: &dyn DbExecutor) -> DbalResult<M> {
        let missing: Vec<&str> = M::fields()
            .iter()
            .map(Column::name)
            .filter(|name| !row.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(DbalError::DatabaseError(format!(
                "Row for '{}' is missing declared columns: {}",
                M::table_name(),
                missing.join(", ")
            )));
        }

        let id = M::id_field()
            .ok()
            .and_then(|col| row.get_value(col.name()).cloned())
            .unwrap_or(Value::Null);
        let record = Record {
            table: M::table_name(),
            id,
            row,
            db,
        };
        let _guard = HydrationGuard::enter(M::table_name(), &record.id);
        let instance = M::from_record(&record)?;
        tracing::trace!(table = M::table_name(), id = %record.id, "hydrated row");
        Ok(instance)
    }
}
