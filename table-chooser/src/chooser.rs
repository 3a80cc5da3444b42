use crate::catalog::Catalog;
use anyhow::Result;
use tracing::debug;
use widget_state::{InstanceKey, Scope, ScopedFields, Session, Widget};

/// State of a table chooser, stored in its scope.
#[derive(ScopedFields, Clone, Debug, PartialEq)]
pub struct TableSelection {
    pub database: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
    /// Whether the selection boxes are displayed, as opposed to the selected table.
    pub show_selection: bool,
}

/// Nothing selected: the chooser starts with its selection boxes displayed.
impl Default for TableSelection {
    fn default() -> Self {
        TableSelection::initial(None, None, None)
    }
}

impl TableSelection {
    /// Initial state of a chooser: the selection boxes are only displayed if the initial
    /// selection is incomplete.
    pub fn initial(database: Option<&str>, schema: Option<&str>, table: Option<&str>) -> Self {
        TableSelection {
            database: database.map(str::to_owned),
            schema: schema.map(str::to_owned),
            table: table.map(str::to_owned),
            show_selection: database.is_none() || schema.is_none() || table.is_none(),
        }
    }

    pub fn full_table_name(&self) -> Option<String> {
        match (&self.database, &self.schema, &self.table) {
            (Some(database), Some(schema), Some(table)) => {
                Some(format!(r#""{}"."{}"."{}""#, database, schema, table))
            }
            _ => None,
        }
    }
}

/// Lets the user pick a table by choosing a database, then a schema, then a table.
///
/// The chooser reads its state when created and lists the catalog objects matching the current
/// selection. Handlers (`select_*`, `change_selection`) only write the state; the new selection
/// is visible to the chooser created during the next pass.
pub struct TableChooser {
    scope: Scope,
    selection: TableSelection,
    databases: Vec<String>,
    schemas: Vec<String>,
    tables: Vec<String>,
}

impl TableChooser {
    /// Creates a chooser identified by its call site.
    #[track_caller]
    pub fn new(
        session: &Session,
        catalog: &dyn Catalog,
        initial: TableSelection,
    ) -> Result<TableChooser> {
        TableChooser::with_key(session, InstanceKey::from_caller(), catalog, initial)
    }

    /// Creates a chooser identified by an explicit key.
    pub fn keyed(
        session: &Session,
        key: impl Into<InstanceKey>,
        catalog: &dyn Catalog,
        initial: TableSelection,
    ) -> Result<TableChooser> {
        TableChooser::with_key(session, key.into(), catalog, initial)
    }

    fn with_key(
        session: &Session,
        key: InstanceKey,
        catalog: &dyn Catalog,
        initial: TableSelection,
    ) -> Result<TableChooser> {
        let scope = Scope::with_key::<TableChooser>(session, key)?;
        TableChooser::from_scope(scope, catalog, initial)
    }

    /// Creates a chooser in an existing scope, e.g. one nested in another widget.
    pub fn from_scope(
        scope: Scope,
        catalog: &dyn Catalog,
        initial: TableSelection,
    ) -> Result<TableChooser> {
        initial.apply_defaults(&scope)?;
        let selection = TableSelection::load(&scope)?;
        debug!(namespace = %scope.namespace(), ?selection, "table chooser");

        let mut chooser = TableChooser {
            scope,
            selection,
            databases: catalog.databases()?,
            schemas: vec![],
            tables: vec![],
        };
        if let Some(database) = &chooser.selection.database {
            chooser.schemas = catalog.schemas(database)?;
            if let Some(schema) = &chooser.selection.schema {
                chooser.tables = catalog.tables(database, schema)?;
            }
        }
        Ok(chooser)
    }

    pub fn selection(&self) -> &TableSelection {
        &self.selection
    }

    pub fn databases(&self) -> &[String] {
        &self.databases
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Quoted name of the selected table, if the selection is complete.
    pub fn full_table_name(&self) -> Option<String> {
        self.selection.full_table_name()
    }

    pub fn select_database(&self, database: Option<&str>) -> Result<()> {
        self.scope.set("database", database.map(str::to_owned))?;
        self.scope.set("schema", None::<String>)?;
        self.scope.set("table", None::<String>)?;
        Ok(())
    }

    pub fn select_schema(&self, schema: Option<&str>) -> Result<()> {
        self.scope.set("schema", schema.map(str::to_owned))?;
        self.scope.set("table", None::<String>)?;
        Ok(())
    }

    /// Selecting a table completes the selection.
    pub fn select_table(&self, table: Option<&str>) -> Result<()> {
        self.scope.set("table", table.map(str::to_owned))?;
        if table.is_some() {
            self.complete_selection()?;
        }
        Ok(())
    }

    pub fn change_selection(&self) -> Result<()> {
        Ok(self.scope.set("show_selection", true)?)
    }

    pub fn complete_selection(&self) -> Result<()> {
        Ok(self.scope.set("show_selection", false)?)
    }

    /// Renders the chooser as text lines.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![];
        if let Some(origin) = self.scope.origin_label() {
            lines.push(format!("```{}```", origin));
        }

        if !self.selection.show_selection {
            lines.push(format!(
                "Selected Table: **{}**",
                self.full_table_name().unwrap_or_default()
            ));
            lines.push(format!(
                "[Change] ({})",
                self.scope.full_key("change_selection")
            ));
            return lines;
        }

        let select_box = |label: &str, field: &str, options: &[String], current: &Option<String>| {
            format!(
                "{} ({}): [{}] {}",
                label,
                self.scope.full_key(field),
                current.as_deref().unwrap_or(""),
                options.join(" | ")
            )
        };

        lines.push(select_box(
            "Database",
            "database",
            &self.databases,
            &self.selection.database,
        ));
        if self.selection.database.is_none() {
            lines.push("Please select a database".to_owned());
            return lines;
        }
        lines.push(select_box(
            "Schema",
            "schema",
            &self.schemas,
            &self.selection.schema,
        ));
        if self.selection.schema.is_none() {
            lines.push("Please select a schema".to_owned());
            return lines;
        }
        lines.push(select_box(
            "Table",
            "table",
            &self.tables,
            &self.selection.table,
        ));
        if self.selection.table.is_none() {
            lines.push("Please select a table".to_owned());
        }
        lines
    }
}

impl Widget for TableChooser {
    type Output = String;

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn output(&self) -> Option<String> {
        self.full_table_name()
    }

    fn debug_name(&self) -> &str {
        "TableChooser"
    }
}
