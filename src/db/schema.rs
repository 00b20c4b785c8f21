//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `prices` table (one uploaded price record per row, append-only)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Price records
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS prices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price_cents INTEGER NOT NULL CHECK (price_cents >= 0), -- fixed-point, 2 fractional digits
    create_date TEXT NOT NULL -- YYYY-MM-DD HH:MM:SS
);

CREATE INDEX IF NOT EXISTS idx_prices_category ON prices(category);
"#;
