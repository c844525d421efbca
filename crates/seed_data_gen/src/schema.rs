//! Table declarations for the seeded schemas.
//!
//! The emitter takes INSERT column lists and optional `CREATE TABLE`
//! statements from these declarations, and the verifier uses the foreign
//! keys to find parent/child pairs.

use std::collections::HashMap;

/// MySQL column types used by the seed schemas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlType {
    /// Auto-incrementing integer key
    Serial,
    Integer,
    VarChar(u16),
    Boolean,
    /// Decimal with precision and scale
    Decimal(u8, u8),
    DateTime,
    Date,
}

impl SqlType {
    pub fn to_mysql(&self) -> String {
        match self {
            SqlType::Serial => "INT AUTO_INCREMENT".to_string(),
            SqlType::Integer => "INT".to_string(),
            SqlType::VarChar(n) => format!("VARCHAR({})", n),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Decimal(p, s) => format!("DECIMAL({},{})", p, s),
            SqlType::DateTime => "DATETIME".to_string(),
            SqlType::Date => "DATE".to_string(),
        }
    }
}

/// Foreign key constraint
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub to_table: String,
    pub to_column: String,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            not_null: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            to_table: table.into(),
            to_column: column.into(),
        });
        self
    }

    /// Auto-increment columns are assigned by the database, never inserted.
    pub fn is_generated(&self) -> bool {
        self.sql_type == SqlType::Serial
    }
}

/// How a table takes part in a seed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// Literal or synthesised catalog; may be referenced by detail rows
    Catalog,
    /// Generated child rows referencing a catalog table
    Detail,
    /// One row per parent id, totals of a detail table's measure
    Summary,
}

/// Table definition
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub role: TableRole,
}

impl Table {
    pub fn new(name: impl Into<String>, role: TableRole) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            role,
        }
    }

    pub fn column(mut self, col: Column) -> Self {
        self.columns.push(col);
        self
    }

    /// Get the primary key column name (assumes single-column PK)
    pub fn primary_key_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.as_str())
    }

    /// Get all foreign key relationships
    pub fn foreign_keys(&self) -> Vec<(&str, &ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| (c.name.as_str(), fk)))
            .collect()
    }

    /// Columns listed in INSERT statements (auto-increment keys excluded)
    pub fn insert_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_generated())
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn to_create_sql(&self) -> String {
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("    {} {}", c.name, c.sql_type.to_mysql());
                if c.not_null {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();

        if let Some(pk) = self.primary_key_column() {
            defs.push(format!("    PRIMARY KEY ({})", pk));
        }
        for (col, fk) in self.foreign_keys() {
            defs.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {}({})",
                col, fk.to_table, fk.to_column
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            defs.join(",\n")
        )
    }
}

/// The set of tables of one seeded schema, in emission order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
    table_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: Table) -> Self {
        let idx = self.tables.len();
        self.table_index.insert(table.name.clone(), idx);
        self.tables.push(table);
        self
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.table_index.get(name).map(|&idx| &self.tables[idx])
    }

    /// Tables with every referenced table ahead of them, otherwise in
    /// declaration order. A reference cycle is broken at its first-declared
    /// table.
    pub fn tables_in_order(&self) -> Vec<&Table> {
        let mut placed = vec![false; self.tables.len()];
        let mut ordered = Vec::with_capacity(self.tables.len());

        while ordered.len() < self.tables.len() {
            let ready = |idx: usize| {
                self.tables[idx].foreign_keys().iter().all(|(_, fk)| {
                    match self.table_index.get(&fk.to_table) {
                        Some(&dep) => dep == idx || placed[dep],
                        None => true,
                    }
                })
            };
            let mut pending = (0..self.tables.len()).filter(|&idx| !placed[idx]);
            let Some(first) = pending.clone().next() else {
                break;
            };
            let next = pending.find(|&idx| ready(idx)).unwrap_or(first);

            placed[next] = true;
            ordered.push(&self.tables[next]);
        }

        ordered
    }

    /// The aggregate link of this schema, if it has a summary table.
    pub fn summary_link(&self) -> Option<SummaryLink> {
        let summary = self.tables.iter().find(|t| t.role == TableRole::Summary)?;
        let (key_column, key_fk) = summary.foreign_keys().into_iter().next()?;
        let total_column = summary
            .columns
            .iter()
            .find(|c| c.name != key_column)?
            .name
            .clone();

        let detail = self.tables.iter().find(|t| {
            t.role == TableRole::Detail
                && t.foreign_keys()
                    .iter()
                    .any(|(_, fk)| fk.to_table == key_fk.to_table)
        })?;
        let (detail_fk_column, _) = detail
            .foreign_keys()
            .into_iter()
            .find(|(_, fk)| fk.to_table == key_fk.to_table)?;
        // the measure is the last integer column of the detail table
        let measure_column = detail
            .columns
            .iter()
            .rev()
            .find(|c| c.sql_type == SqlType::Integer && c.foreign_key.is_none())?
            .name
            .clone();

        Some(SummaryLink {
            parent_table: key_fk.to_table.clone(),
            detail_table: detail.name.clone(),
            detail_fk_column: detail_fk_column.to_string(),
            measure_column,
            summary_table: summary.name.clone(),
            key_column: key_column.to_string(),
            total_column,
        })
    }
}

/// Which columns tie a summary table to its detail and parent tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLink {
    pub parent_table: String,
    pub detail_table: String,
    pub detail_fk_column: String,
    pub measure_column: String,
    pub summary_table: String,
    pub key_column: String,
    pub total_column: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_schema() -> Schema {
        Schema::new()
            .table(
                Table::new("FoodItems", TableRole::Catalog)
                    .column(Column::new("FoodId", SqlType::Serial).primary_key())
                    .column(Column::new("Name", SqlType::VarChar(100)).not_null()),
            )
            .table(
                Table::new("Orders", TableRole::Detail)
                    .column(Column::new("OrderId", SqlType::Serial).primary_key())
                    .column(
                        Column::new("FoodId", SqlType::Integer)
                            .not_null()
                            .references("FoodItems", "FoodId"),
                    )
                    .column(Column::new("Quantity", SqlType::Integer).not_null())
                    .column(Column::new("OrderDate", SqlType::Date).not_null()),
            )
            .table(
                Table::new("SalesSummary", TableRole::Summary)
                    .column(
                        Column::new("FoodId", SqlType::Integer)
                            .primary_key()
                            .references("FoodItems", "FoodId"),
                    )
                    .column(Column::new("TotalSold", SqlType::Integer).not_null()),
            )
    }

    #[test]
    fn test_insert_columns_skip_serial() {
        let schema = orders_schema();
        let orders = schema.get_table("Orders").unwrap();
        assert_eq!(orders.insert_columns(), vec!["FoodId", "Quantity", "OrderDate"]);
        assert_eq!(orders.primary_key_column(), Some("OrderId"));
        assert_eq!(orders.foreign_keys().len(), 1);
    }

    #[test]
    fn test_create_sql() {
        let schema = orders_schema();
        let sql = schema.get_table("Orders").unwrap().to_create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS Orders ("));
        assert!(sql.contains("OrderId INT AUTO_INCREMENT NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (OrderId)"));
        assert!(sql.contains("FOREIGN KEY (FoodId) REFERENCES FoodItems(FoodId)"));
        assert!(sql.ends_with(");"));
    }

    #[test]
    fn test_schema_topological_order() {
        // declared children-first on purpose
        let schema = Schema::new()
            .table(
                Table::new("SalesSummary", TableRole::Summary).column(
                    Column::new("FoodId", SqlType::Integer).references("FoodItems", "FoodId"),
                ),
            )
            .table(
                Table::new("FoodItems", TableRole::Catalog)
                    .column(Column::new("FoodId", SqlType::Serial).primary_key()),
            );

        let names: Vec<&str> = schema
            .tables_in_order()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["FoodItems", "SalesSummary"]);
    }

    #[test]
    fn test_order_keeps_declaration_order_and_survives_cycles() {
        let schema = Schema::new()
            .table(
                Table::new("A", TableRole::Detail)
                    .column(Column::new("BId", SqlType::Integer).references("B", "BId")),
            )
            .table(
                Table::new("B", TableRole::Detail)
                    .column(Column::new("AId", SqlType::Integer).references("A", "AId")),
            )
            .table(
                Table::new("C", TableRole::Detail)
                    .column(Column::new("CId", SqlType::Integer).references("C", "CId"))
                    .column(Column::new("Ext", SqlType::Integer).references("Elsewhere", "Id")),
            )
            .table(
                Table::new("D", TableRole::Catalog)
                    .column(Column::new("DId", SqlType::Serial).primary_key()),
            );

        let names: Vec<&str> = schema
            .tables_in_order()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "D", "A", "B"]);
    }

    #[test]
    fn test_summary_link() {
        let link = orders_schema().summary_link().unwrap();
        assert_eq!(link.parent_table, "FoodItems");
        assert_eq!(link.detail_table, "Orders");
        assert_eq!(link.detail_fk_column, "FoodId");
        assert_eq!(link.measure_column, "Quantity");
        assert_eq!(link.summary_table, "SalesSummary");
        assert_eq!(link.key_column, "FoodId");
        assert_eq!(link.total_column, "TotalSold");
    }
}
