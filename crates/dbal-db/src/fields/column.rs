//! Column metadata for model fields.
//!
//! A model declares its fields once, as a static list of [`Column`]s. Each
//! column has a [`ColumnKind`]; a column carrying a relation is a foreign key
//! whatever its kind.

use dbal_core::{DbalError, DbalResult};

/// The declared kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ColumnKind {
    /// Whole number.
    Integer,
    /// Variable-length string.
    Varchar,
    /// Fixed-length string.
    Char,
    /// Date and time.
    DateTime,
    /// The model's identifier, used for default equality lookups.
    Id,
}

impl ColumnKind {
    /// The SQL type used when declaring the column.
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Integer | Self::Id => "INTEGER",
            Self::Varchar => "VARCHAR(255)",
            Self::Char => "CHAR(5)",
            Self::DateTime => "DATETIME",
        }
    }
}

/// Metadata describing one model field.
///
/// # Examples
///
/// ```
/// use dbal_db::fields::{Column, ColumnKind};
///
/// let id = Column::id("OrderID");
/// assert!(id.is_id());
///
/// let fk = Column::foreign_key("CustomerID", "Customers");
/// assert!(fk.is_foreign_key());
/// assert_eq!(fk.related_table(), Some("Customers"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: &'static str,
    kind: ColumnKind,
    relation: Option<&'static str>,
    primary_key: bool,
    identifier: bool,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            relation: None,
            primary_key: false,
            identifier: false,
        }
    }

    /// An integer column.
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    /// A variable-length string column.
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Varchar)
    }

    /// A fixed-length string column.
    pub const fn char(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Char)
    }

    /// A date-time column.
    pub const fn date_time(name: &'static str) -> Self {
        Self::new(name, ColumnKind::DateTime)
    }

    /// The identifier column. It is also the primary key.
    pub const fn id(name: &'static str) -> Self {
        Self {
            primary_key: true,
            identifier: true,
            ..Self::new(name, ColumnKind::Id)
        }
    }

    /// A column referencing the table of another model.
    pub const fn foreign_key(name: &'static str, related_table: &'static str) -> Self {
        Self {
            relation: Some(related_table),
            ..Self::new(name, ColumnKind::Integer)
        }
    }

    /// Overrides the declared kind, e.g. for a string-keyed foreign key or
    /// identifier. An identifier keeps its role.
    #[must_use]
    pub const fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// The column name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared kind.
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Whether the column is a primary key.
    pub const fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Whether the column is the model identifier.
    pub const fn is_id(&self) -> bool {
        self.identifier
    }

    /// `true` iff a relation is present.
    pub const fn is_foreign_key(&self) -> bool {
        self.relation.is_some()
    }

    /// The table of the related model, for foreign keys.
    pub const fn related_table(&self) -> Option<&'static str> {
        self.relation
    }
}

/// Lookup helpers over a model's declared column list.
pub trait ModelFields {
    /// Returns the single ID column.
    fn id_field(&self) -> DbalResult<&Column>;

    /// Iterates the foreign-key columns.
    fn foreign_keys(&self) -> impl Iterator<Item = &Column>;

    /// Finds a column by name.
    fn column(&self, name: &str) -> Option<&Column>;
}

impl ModelFields for [Column] {
    fn id_field(&self) -> DbalResult<&Column> {
        self.iter().find(|c| c.is_id()).ok_or_else(|| {
            DbalError::ImproperlyConfigured("model declares no ID column".to_string())
        })
    }

    fn foreign_keys(&self) -> impl Iterator<Item = &Column> {
        self.iter().filter(|c| c.is_foreign_key())
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.iter().find(|c| c.name == name)
    }
}

/// Checks that exactly one identifier column is declared.
pub fn validate_fields(table: &str, fields: &[Column]) -> DbalResult<()> {
    match fields.iter().filter(|c| c.is_id()).count() {
        1 => Ok(()),
        0 => Err(DbalError::ImproperlyConfigured(format!(
            "model '{table}' declares no ID column"
        ))),
        n => Err(DbalError::ImproperlyConfigured(format!(
            "model '{table}' declares {n} ID columns"
        ))),
    }
}
