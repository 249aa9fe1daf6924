use anyhow::Context;
use rusqlite::Connection;

/// Applied in order; each entry runs at most once and is recorded in the
/// `_migrations` table under its name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    "CREATE TABLE users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'organizer',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE organizations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        president_id TEXT NOT NULL REFERENCES users(id),
        staff_advisor_id TEXT NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE events (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        event_date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        finish_time TEXT NOT NULL,
        time_period TEXT NOT NULL,
        president TEXT NOT NULL,
        proposal_path TEXT NOT NULL,
        form_path TEXT NOT NULL,
        mode TEXT NOT NULL,
        event_type TEXT NOT NULL,
        venue TEXT NOT NULL DEFAULT 'N/A',
        status TEXT NOT NULL DEFAULT 'Pending',
        created_by TEXT NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX idx_events_organization ON events(organization_id);

    CREATE TABLE crews (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        phone TEXT,
        email TEXT,
        work_type TEXT,
        leader TEXT,
        profile_pic TEXT,
        status TEXT NOT NULL DEFAULT 'active'
    );

    CREATE TABLE crew_members (
        id TEXT PRIMARY KEY,
        crew_id TEXT NOT NULL REFERENCES crews(id) ON DELETE CASCADE,
        name TEXT,
        email TEXT,
        phone TEXT
    );

    CREATE TABLE bookings (
        id TEXT PRIMARY KEY,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        venue TEXT,
        status TEXT NOT NULL DEFAULT 'pending',
        is_blocked INTEGER NOT NULL DEFAULT 0,
        created_by TEXT NOT NULL REFERENCES users(id),
        last_modified_by TEXT REFERENCES users(id),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX idx_bookings_range ON bookings(start_date, end_date);",
)];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = db::init_db(":memory:").unwrap();
        // Running again must be a no-op, not a "table already exists" error.
        super::run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied as usize, super::MIGRATIONS.len());
    }
}
