use crate::backend::{Backend, CellValue, ColumnMeta, QueryResult};
use crate::error::AskError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use std::str::FromStr;

/// Schema and rows of the sample database.
pub const SAMPLE_SCRIPT: &str = r#"
DROP TABLE IF EXISTS customers;
DROP TABLE IF EXISTS orders;

CREATE TABLE customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    city TEXT
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_id INTEGER,
    amount REAL,
    order_date TEXT,
    status TEXT,
    FOREIGN KEY(customer_id) REFERENCES customers(id)
);

INSERT INTO customers (name, email, city) VALUES
    ('Alice Johnson', 'alice@example.com', 'Lahore'),
    ('Bob Malik', 'bob@example.com', 'Karachi'),
    ('Charlie Khan', 'charlie@example.com', 'Islamabad');

INSERT INTO orders (customer_id, amount, order_date, status) VALUES
    (1, 120.50, '2023-01-15', 'completed'),
    (2, 25.00, '2023-03-22', 'completed'),
    (1, 300.99, '2023-07-01', 'completed'),
    (3, 75.20, '2022-11-05', 'refunded'),
    (2, 450.00, '2023-12-10', 'completed');
"#;

/// Schema description matching [`SAMPLE_SCRIPT`], in the form the prompt expects.
pub const SAMPLE_SCHEMA: &str = "Tables:\n\
    customers(id, name, email, city)\n\
    orders(id, customer_id, amount, order_date, status)\n";

/// SQLite backend over a shared connection pool.
///
/// The pool connects lazily, so a missing or unreachable database only shows
/// up when a query runs.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn connect(
        database_url: &str,
        max_connections: u32,
        read_only: bool,
    ) -> Result<Self, AskError> {
        if !database_url.starts_with("sqlite:") {
            return Err(AskError::Config {
                message: format!(
                    "unsupported database scheme '{}' (expected sqlite:...)",
                    database_url.split("://").next().unwrap_or(database_url)
                ),
            });
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AskError::Config {
                message: format!("invalid database URL: {}", e),
            })?
            .read_only(read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl Backend for SqliteBackend {
    async fn execute(&self, sql: &str) -> Result<QueryResult, AskError> {
        // Returned to the pool when dropped, on every path out of here.
        let mut conn = self.pool.acquire().await.map_err(|e| AskError::Connection {
            message: format!("cannot acquire database connection: {}", e),
        })?;

        let statement = (&mut *conn).prepare(sql).await.map_err(query_error)?;

        let columns = statement
            .columns()
            .iter()
            .map(|c| ColumnMeta {
                name: c.name().to_string(),
                type_name: c.type_info().name().to_string(),
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            columns = ?columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.type_name))
                .collect::<Vec<_>>(),
            "statement prepared"
        );

        let fetched = statement
            .query()
            .fetch_all(&mut *conn)
            .await
            .map_err(query_error)?;

        let rows = fetched
            .iter()
            .map(|row| decode_row(row, columns.len()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;

        Ok(QueryResult { columns, rows })
    }
}

/// Create (or recreate) the sample tables in the database at `path`.
pub async fn seed_sample_database(path: &std::path::Path) -> Result<(), AskError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| AskError::Connection {
            message: format!("cannot open {}: {}", path.display(), e),
        })?;

    let seeded = sqlx::raw_sql(SAMPLE_SCRIPT)
        .execute(&pool)
        .await
        .map_err(query_error);
    pool.close().await;
    seeded.map(|_| ())
}

fn decode_row(row: &SqliteRow, width: usize) -> Result<Vec<CellValue>, sqlx::Error> {
    (0..width).map(|idx| decode_cell(row, idx)).collect()
}

fn decode_cell(row: &SqliteRow, idx: usize) -> Result<CellValue, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }

    // Dispatch on the storage class of the value, not the declared column type.
    let storage = raw.type_info().name().to_string();
    let cell = match storage.as_str() {
        "INTEGER" => CellValue::Integer(row.try_get::<i64, _>(idx)?),
        "REAL" => CellValue::Real(row.try_get::<f64, _>(idx)?),
        "BLOB" => CellValue::Blob(row.try_get::<Vec<u8>, _>(idx)?),
        _ => CellValue::Text(row.try_get::<String, _>(idx)?),
    };
    Ok(cell)
}

fn query_error(e: sqlx::Error) -> AskError {
    match e {
        sqlx::Error::Database(db) => AskError::Query {
            message: db.message().to_string(),
        },
        other => AskError::Query {
            message: other.to_string(),
        },
    }
}
