//! Disposable PostgreSQL schemas for the Diesel repository suites.
//!
//! Suites run against the server named by `BOOKING_TEST_DATABASE_URL` and
//! skip when it is unset. Every test gets its own schema holding the tables
//! the repositories expect; pooled connections reach it through the
//! `search_path` connection option, and the schema is dropped afterwards.
//!
//! Setup and teardown use the blocking `postgres` client, so they must run
//! outside any Tokio runtime.

use postgres::{Client, NoTls};
use uuid::Uuid;

/// Environment variable naming the server the suites run against.
pub const TEST_DATABASE_URL_ENV: &str = "BOOKING_TEST_DATABASE_URL";

const TABLES: &str = "
CREATE TABLE countries (
    id BIGSERIAL PRIMARY KEY,
    code VARCHAR(255) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ
);
CREATE TABLE bookings (
    id BIGSERIAL PRIMARY KEY,
    customer_name VARCHAR(255) NOT NULL,
    country_code VARCHAR(255) NOT NULL,
    customer_email VARCHAR(255) NOT NULL,
    customer_phone VARCHAR(255) NOT NULL,
    surfing_experience SMALLINT NOT NULL,
    visit_date DATE NOT NULL,
    desired_board VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ,
    UNIQUE (customer_email, visit_date)
);
CREATE TABLE files (
    id BIGSERIAL PRIMARY KEY,
    file_name VARCHAR(255) NOT NULL,
    file_url VARCHAR(255) NOT NULL,
    file_type VARCHAR(255) NOT NULL,
    booking_id BIGINT NOT NULL REFERENCES bookings (id)
);
";

/// A schema created for one test and dropped with it.
pub struct TestSchema {
    server_url: String,
    name: String,
    url: String,
}

impl TestSchema {
    /// Create a fresh schema, or `None` when no test server is configured.
    pub fn provision() -> Result<Option<Self>, String> {
        let Some(server_url) = std::env::var(TEST_DATABASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
        else {
            return Ok(None);
        };
        let name = format!("booking_test_{}", Uuid::new_v4().simple());

        let mut client = Client::connect(&server_url, NoTls).map_err(|err| err.to_string())?;
        client
            .batch_execute(&format!(
                "CREATE SCHEMA {name}; SET search_path TO {name}; {TABLES}"
            ))
            .map_err(|err| format!("create schema {name}: {err}"))?;

        let separator = if server_url.contains('?') { '&' } else { '?' };
        let url = format!("{server_url}{separator}options=-csearch_path%3D{name}");
        Ok(Some(Self {
            server_url,
            name,
            url,
        }))
    }

    /// Connection URL whose sessions resolve tables in this schema.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        let dropped = Client::connect(&self.server_url, NoTls).and_then(|mut client| {
            client.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
        });
        if let Err(err) = dropped {
            eprintln!("failed to drop test schema {}: {err}", self.name);
        }
    }
}
