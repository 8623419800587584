//! PostgreSQL-backed `CountryRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;
use pagination::Page;

use crate::domain::ports::{CountryRepository, CountryRepositoryError};
use crate::domain::{
    Country, CountryColumn, CountryDetails, ListQuery, Sort, SortOrder, like_pattern,
};

use super::diesel_error_mapping::{DieselFailure, affected, classify, sql_bound};
use super::models::{CountryChanges, CountryRow, NewCountryRow};
use super::pool::{DbPool, PoolError};
use super::schema::countries;

/// Diesel-backed implementation of the `CountryRepository` port.
#[derive(Clone)]
pub struct DieselCountryRepository {
    pool: DbPool,
}

impl DieselCountryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CountryRepositoryError {
    CountryRepositoryError::connection(error.into_message())
}

fn map_write_error(code: &str) -> impl FnOnce(diesel::result::Error) -> CountryRepositoryError {
    move |error| match classify(error) {
        DieselFailure::Connection(message) => CountryRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => CountryRepositoryError::duplicate_code(code),
        DieselFailure::Query(message) => CountryRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CountryRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => CountryRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            CountryRepositoryError::query("unexpected unique violation")
        }
        DieselFailure::Query(message) => CountryRepositoryError::query(message),
    }
}

fn search_predicate(
    term: &str,
) -> Box<dyn BoxableExpression<countries::table, Pg, SqlType = Bool>> {
    let pattern = like_pattern(term);
    Box::new(
        countries::name
            .ilike(pattern.clone())
            .or(countries::code.ilike(pattern)),
    )
}

type CountryPageQuery = countries::BoxedQuery<
    'static,
    Pg,
    diesel::dsl::SqlTypeOf<diesel::dsl::AsSelect<CountryRow, Pg>>,
>;

fn ordered(query: CountryPageQuery, sort: Option<Sort<CountryColumn>>) -> CountryPageQuery {
    let query = match sort {
        None => query,
        Some(Sort { column, order }) => match (column, order) {
            (CountryColumn::Id, SortOrder::Asc) => query.order_by(countries::id.asc()),
            (CountryColumn::Id, SortOrder::Desc) => query.order_by(countries::id.desc()),
            (CountryColumn::Code, SortOrder::Asc) => query.order_by(countries::code.asc()),
            (CountryColumn::Code, SortOrder::Desc) => query.order_by(countries::code.desc()),
            (CountryColumn::Name, SortOrder::Asc) => query.order_by(countries::name.asc()),
            (CountryColumn::Name, SortOrder::Desc) => query.order_by(countries::name.desc()),
            (CountryColumn::CreatedAt, SortOrder::Asc) => {
                query.order_by(countries::created_at.asc())
            }
            (CountryColumn::CreatedAt, SortOrder::Desc) => {
                query.order_by(countries::created_at.desc())
            }
            (CountryColumn::UpdatedAt, SortOrder::Asc) => {
                query.order_by(countries::updated_at.asc())
            }
            (CountryColumn::UpdatedAt, SortOrder::Desc) => {
                query.order_by(countries::updated_at.desc())
            }
        },
    };
    query.then_order_by(countries::id.asc())
}

#[async_trait]
impl CountryRepository for DieselCountryRepository {
    async fn list(
        &self,
        query: &ListQuery<CountryColumn>,
    ) -> Result<Page<Country>, CountryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count = countries::table.count().into_boxed();
        let mut rows: CountryPageQuery = countries::table
            .select(CountryRow::as_select())
            .into_boxed();
        if let Some(term) = query.search() {
            count = count.filter(search_predicate(term));
            rows = rows.filter(search_predicate(term));
        }

        let total: i64 = count
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let window = query.page();
        let items: Vec<CountryRow> = ordered(rows, query.sort())
            .limit(sql_bound(window.limit()))
            .offset(sql_bound(window.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            items.into_iter().map(Country::from).collect(),
            window,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn find(&self, id: i64) -> Result<Option<Country>, CountryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CountryRow> = countries::table
            .find(id)
            .select(CountryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Country::from))
    }

    async fn insert(
        &self,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<Country, CountryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCountryRow {
            code: &details.code,
            name: &details.name,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let inserted: CountryRow = diesel::insert_into(countries::table)
            .values(&row)
            .returning(CountryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_write_error(&details.code))?;
        Ok(Country::from(inserted))
    }

    async fn update(
        &self,
        id: i64,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, CountryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = CountryChanges {
            code: &details.code,
            name: &details.name,
            updated_at: Some(now),
        };
        let rows = diesel::update(countries::table.find(id))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_write_error(&details.code))?;
        Ok(affected(rows))
    }

    async fn delete(&self, id: i64) -> Result<u64, CountryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::delete(countries::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected(rows))
    }
}
