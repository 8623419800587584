//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use pagination::Page;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{
    Booking, BookingColumn, BookingDetails, BookingFile, DeletedBooking, ListQuery,
    NewBookingFile, Sort, SortOrder, like_pattern,
};

use super::diesel_error_mapping::{DieselFailure, affected, classify, sql_bound};
use super::models::{BookingRow, BookingValues, FileRow, NewBookingRow, NewFileRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, files};

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    BookingRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => BookingRepositoryError::connection(message),
        DieselFailure::UniqueViolation { .. } => BookingRepositoryError::duplicate_visit(),
        DieselFailure::Query(message) => BookingRepositoryError::query(message),
    }
}

type SearchPredicate = Box<dyn BoxableExpression<bookings::table, Pg, SqlType = Bool>>;

/// Case-insensitive substring match across name, email, and phone.
fn search_predicate(term: &str) -> SearchPredicate {
    let pattern = like_pattern(term);
    Box::new(
        bookings::customer_name
            .ilike(pattern.clone())
            .or(bookings::customer_email.ilike(pattern.clone()))
            .or(bookings::customer_phone.ilike(pattern)),
    )
}

macro_rules! order_by {
    ($query:expr, $column:expr, $order:expr) => {
        match $order {
            SortOrder::Asc => $query.order_by($column.asc()),
            SortOrder::Desc => $query.order_by($column.desc()),
        }
    };
}

type BookingPageQuery = bookings::BoxedQuery<
    'static,
    Pg,
    diesel::dsl::SqlTypeOf<diesel::dsl::AsSelect<BookingRow, Pg>>,
>;

fn ordered(query: BookingPageQuery, sort: Option<Sort<BookingColumn>>) -> BookingPageQuery {
    let query = match sort {
        None => query,
        Some(Sort { column, order }) => match column {
            BookingColumn::Id => order_by!(query, bookings::id, order),
            BookingColumn::CustomerName => order_by!(query, bookings::customer_name, order),
            BookingColumn::CountryCode => order_by!(query, bookings::country_code, order),
            BookingColumn::CustomerEmail => order_by!(query, bookings::customer_email, order),
            BookingColumn::CustomerPhone => order_by!(query, bookings::customer_phone, order),
            BookingColumn::SurfingExperience => {
                order_by!(query, bookings::surfing_experience, order)
            }
            BookingColumn::VisitDate => order_by!(query, bookings::visit_date, order),
            BookingColumn::DesiredBoard => order_by!(query, bookings::desired_board, order),
            BookingColumn::CreatedAt => order_by!(query, bookings::created_at, order),
        },
    };
    query.then_order_by(bookings::id.asc())
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn list(
        &self,
        query: &ListQuery<BookingColumn>,
    ) -> Result<Page<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut count = bookings::table.count().into_boxed();
        let mut rows: BookingPageQuery = bookings::table
            .select(BookingRow::as_select())
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
        let items: Vec<BookingRow> = ordered(rows, query.sort())
            .limit(sql_bound(window.limit()))
            .offset(sql_bound(window.offset()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(
            items.into_iter().map(Booking::from).collect(),
            window,
            u64::try_from(total).unwrap_or_default(),
        ))
    }

    async fn files_for(
        &self,
        booking_ids: &[i64],
    ) -> Result<Vec<BookingFile>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<FileRow> = files::table
            .filter(files::booking_id.eq_any(booking_ids))
            .select(FileRow::as_select())
            .order_by(files::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(BookingFile::from).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookingRow> = bookings::table
            .find(id)
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Booking::from))
    }

    async fn visit_taken(
        &self,
        email: &str,
        visit_date: NaiveDate,
        except_id: Option<i64>,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = bookings::table
            .filter(bookings::customer_email.eq(email.to_owned()))
            .filter(bookings::visit_date.eq(visit_date))
            .count()
            .into_boxed();
        if let Some(id) = except_id {
            query = query.filter(bookings::id.ne(id));
        }
        let matches: i64 = query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(matches > 0)
    }

    async fn insert(
        &self,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBookingRow {
            values: BookingValues::new(details, now),
            created_at: Some(now),
        };
        let inserted: BookingRow = diesel::insert_into(bookings::table)
            .values(&row)
            .returning(BookingRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Booking::from(inserted))
    }

    async fn update(
        &self,
        id: i64,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = diesel::update(bookings::table.find(id))
            .set(&BookingValues::new(details, now))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected(rows))
    }

    async fn delete(&self, id: i64) -> Result<DeletedBooking, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (rows, file_rows) = conn
            .transaction(|conn| {
                async move {
                    let file_rows: Vec<FileRow> =
                        diesel::delete(files::table.filter(files::booking_id.eq(id)))
                            .returning(FileRow::as_returning())
                            .get_results(conn)
                            .await?;
                    let rows = diesel::delete(bookings::table.find(id))
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((rows, file_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(DeletedBooking {
            rows: affected(rows),
            files: file_rows.into_iter().map(BookingFile::from).collect(),
        })
    }

    async fn insert_file(
        &self,
        file: &NewBookingFile,
    ) -> Result<BookingFile, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted: FileRow = diesel::insert_into(files::table)
            .values(NewFileRow::from(file))
            .returning(FileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(BookingFile::from(inserted))
    }
}
