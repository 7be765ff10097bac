use anyhow::Context;
use sqlx::PgPool;
use tracing::info;

/// The full schema. Bootstrap is destructive: existing tables are dropped
/// first, so running it twice resets the data rather than duplicating it.
const SCHEMA: &str = r#"
    DROP TABLE IF EXISTS items;
    DROP TABLE IF EXISTS lists;
    DROP TABLE IF EXISTS users;

    CREATE TABLE users (
        id SERIAL PRIMARY KEY,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    );

    CREATE TABLE lists (
        id SERIAL PRIMARY KEY,
        title TEXT UNIQUE NOT NULL
    );

    CREATE TABLE items (
        id SERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        due_date DATE,
        list_id INTEGER NOT NULL REFERENCES lists (id),
        user_id INTEGER REFERENCES users (id)
    );
"#;

/// The shared lists every installation starts with
const SEED_LISTS: [&str; 3] = ["Work", "Home", "Study"];

/// Starter items, paired with the title of the list they land in. They carry
/// no owner, so they never show up on anyone's home view.
const SEED_ITEMS: [(&str, &str); 5] = [
    ("Work", "Finish quarterly report"),
    ("Work", "Prepare presentation slides"),
    ("Home", "Clean the garage"),
    ("Study", "Learn Rust"),
    ("Study", "Learn PostgreSQL"),
];

/// Creates the schema and seed data from scratch
pub async fn initialize(db: &PgPool) -> Result<(), anyhow::Error> {
    info!("Creating schema...");
    sqlx::raw_sql(SCHEMA)
        .execute(db)
        .await
        .context("creating the schema")?;

    info!("Seeding lists...");
    for list_title in SEED_LISTS {
        sqlx::query("INSERT INTO lists (title) VALUES ($1)")
            .bind(list_title)
            .execute(db)
            .await
            .with_context(|| format!("seeding the list {list_title}"))?;
    }

    info!("Seeding items...");
    for (list_title, content) in SEED_ITEMS {
        sqlx::query(
            "INSERT INTO items (content, list_id) SELECT $1, l.id FROM lists l WHERE l.title = $2",
        )
        .bind(content)
        .bind(list_title)
        .execute(db)
        .await
        .with_context(|| format!("seeding the item {content}"))?;
    }

    info!("Database initialized.");
    Ok(())
}
