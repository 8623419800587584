//! Shared harness for endpoint tests.
//!
//! Integration tests compile as separate crates, so the in-memory adapters are
//! wrapped here in counting doubles: list calls that reach a repository and
//! prefix invalidations that reach the cache are tallied, which lets tests
//! tell cache hits from misses without a mocking framework.
#![allow(dead_code, reason = "each test crate uses a different subset")]

pub mod postgres_schema;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::{Clock, DefaultClock};
use pagination::Page;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

use booking_backend::domain::ports::{
    AttachmentStorage, BookingRepository, BookingRepositoryError, CountryRepository,
    CountryRepositoryError, ResponseCache, ResponseCacheError,
};
use booking_backend::domain::{
    AttachmentUrls, Booking, BookingColumn, BookingDetails, BookingFile, BookingPorts,
    BookingService, CacheAside, Country, CountryColumn, CountryDetails, CountryService,
    DeletedBooking, ListQuery, NewBookingFile,
};
use booking_backend::inbound::http::{DEFAULT_MAX_BODY_BYTES, configure};
use booking_backend::inbound::http::state::HttpState;
use booking_backend::inbound::http::uploads::get_upload;
use booking_backend::outbound::cache::InMemoryResponseCache;
use booking_backend::outbound::memory::{
    InMemoryBookingRepository, InMemoryCountryRepository, InMemoryStore,
};
use booking_backend::outbound::storage::LocalAttachmentStorage;
use booking_backend::{BearerAuth, Trace};

/// Base URL attachment links are built from.
pub const PUBLIC_BASE_URL: &str = "http://localhost:8080";

/// Booking repository counting `list` calls.
#[derive(Clone)]
pub struct CountingBookings {
    inner: InMemoryBookingRepository,
    lists: Arc<AtomicUsize>,
}

#[async_trait]
impl BookingRepository for CountingBookings {
    async fn list(
        &self,
        query: &ListQuery<BookingColumn>,
    ) -> Result<Page<Booking>, BookingRepositoryError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(query).await
    }

    async fn files_for(
        &self,
        booking_ids: &[i64],
    ) -> Result<Vec<BookingFile>, BookingRepositoryError> {
        self.inner.files_for(booking_ids).await
    }

    async fn find(&self, id: i64) -> Result<Option<Booking>, BookingRepositoryError> {
        self.inner.find(id).await
    }

    async fn visit_taken(
        &self,
        email: &str,
        visit_date: NaiveDate,
        except_id: Option<i64>,
    ) -> Result<bool, BookingRepositoryError> {
        self.inner.visit_taken(email, visit_date, except_id).await
    }

    async fn insert(
        &self,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingRepositoryError> {
        self.inner.insert(details, now).await
    }

    async fn update(
        &self,
        id: i64,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, BookingRepositoryError> {
        self.inner.update(id, details, now).await
    }

    async fn delete(&self, id: i64) -> Result<DeletedBooking, BookingRepositoryError> {
        self.inner.delete(id).await
    }

    async fn insert_file(
        &self,
        file: &NewBookingFile,
    ) -> Result<BookingFile, BookingRepositoryError> {
        self.inner.insert_file(file).await
    }
}

/// Country repository counting `list` calls.
#[derive(Clone)]
pub struct CountingCountries {
    inner: InMemoryCountryRepository,
    lists: Arc<AtomicUsize>,
}

#[async_trait]
impl CountryRepository for CountingCountries {
    async fn list(
        &self,
        query: &ListQuery<CountryColumn>,
    ) -> Result<Page<Country>, CountryRepositoryError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(query).await
    }

    async fn find(&self, id: i64) -> Result<Option<Country>, CountryRepositoryError> {
        self.inner.find(id).await
    }

    async fn insert(
        &self,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<Country, CountryRepositoryError> {
        self.inner.insert(details, now).await
    }

    async fn update(
        &self,
        id: i64,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, CountryRepositoryError> {
        self.inner.update(id, details, now).await
    }

    async fn delete(&self, id: i64) -> Result<u64, CountryRepositoryError> {
        self.inner.delete(id).await
    }
}

/// Response cache recording invalidated prefixes.
#[derive(Clone)]
pub struct RecordingCache {
    inner: InMemoryResponseCache,
    forgotten: Arc<std::sync::Mutex<Vec<String>>>,
}

#[async_trait]
impl ResponseCache for RecordingCache {
    async fn has(&self, key: &str) -> Result<bool, ResponseCacheError> {
        self.inner.has(key).await
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, ResponseCacheError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), ResponseCacheError> {
        self.inner.put(key, value, ttl).await
    }

    async fn forget_by_prefix(&self, prefix: &str) -> Result<u64, ResponseCacheError> {
        self.forgotten
            .lock()
            .expect("forgotten lock")
            .push(prefix.to_owned());
        self.inner.forget_by_prefix(prefix).await
    }
}

/// Wired services plus the counters tests inspect.
pub struct Harness {
    pub state: web::Data<HttpState>,
    pub upload_dir: TempDir,
    booking_lists: Arc<AtomicUsize>,
    country_lists: Arc<AtomicUsize>,
    forgotten: Arc<std::sync::Mutex<Vec<String>>>,
    token: Option<String>,
}

impl Harness {
    /// Harness without a bearer token.
    pub fn new() -> Self {
        Self::with_token(None)
    }

    /// Harness whose resource routes require `token` when set.
    pub fn with_token(token: Option<&str>) -> Self {
        let upload_dir = tempfile::tempdir().expect("upload dir");
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let store = InMemoryStore::new();
        let booking_lists = Arc::new(AtomicUsize::new(0));
        let country_lists = Arc::new(AtomicUsize::new(0));
        let forgotten = Arc::new(std::sync::Mutex::new(Vec::new()));

        let cache = CacheAside::new(
            Arc::new(RecordingCache {
                inner: InMemoryResponseCache::new(clock.clone()),
                forgotten: forgotten.clone(),
            }),
            Duration::from_secs(300),
        );
        let storage: Arc<dyn AttachmentStorage> =
            Arc::new(LocalAttachmentStorage::new(upload_dir.path()));
        let lookup = Arc::new(store.lookup());
        let base = Url::parse(PUBLIC_BASE_URL).expect("base url");

        let bookings = BookingService::new(
            BookingPorts {
                bookings: Arc::new(CountingBookings {
                    inner: store.bookings(),
                    lists: booking_lists.clone(),
                }),
                lookup: lookup.clone(),
                storage: storage.clone(),
            },
            cache.clone(),
            AttachmentUrls::new(&base),
            clock.clone(),
        );
        let countries = CountryService::new(
            Arc::new(CountingCountries {
                inner: store.countries(),
                lists: country_lists.clone(),
            }),
            lookup,
            cache,
            clock,
        );

        Self {
            state: web::Data::new(HttpState::new(
                Arc::new(bookings),
                Arc::new(countries),
                storage,
            )),
            upload_dir,
            booking_lists,
            country_lists,
            forgotten,
            token: token.map(str::to_owned),
        }
    }

    /// Repository `list` calls made for bookings so far.
    pub fn booking_lists(&self) -> usize {
        self.booking_lists.load(Ordering::SeqCst)
    }

    /// Repository `list` calls made for countries so far.
    pub fn country_lists(&self) -> usize {
        self.country_lists.load(Ordering::SeqCst)
    }

    /// Prefixes invalidated so far, in order.
    pub fn forgotten(&self) -> Vec<String> {
        self.forgotten.lock().expect("forgotten lock").clone()
    }

    /// Initialise the application the way the server mounts it.
    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(Trace)
                .service(get_upload)
                .service(
                    web::scope("")
                        .wrap(BearerAuth::new(self.token.clone()))
                        .configure(configure(DEFAULT_MAX_BODY_BYTES)),
                ),
        )
        .await
    }
}

/// Send `req` and decode the JSON envelope, returning the HTTP status too.
pub async fn send<S, B>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status().as_u16();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).expect("json envelope");
    (status, json)
}

/// A valid booking create body for `email` visiting on `visit_date`.
pub fn booking_body(email: &str, visit_date: &str) -> Value {
    json!({
        "customer_name": "Ana Onda",
        "country_code": "PT",
        "customer_email": email,
        "customer_phone": "+351 912 345 678",
        "surfing_experience": 3,
        "visit_date": visit_date,
        "desired_board": "longboard",
    })
}

/// `POST /country/store`.
pub fn store_country(code: &str, name: &str) -> Request {
    test::TestRequest::post()
        .uri("/country/store")
        .set_json(json!({"code": code, "name": name}))
        .to_request()
}

/// `POST /booking/store`.
pub fn store_booking(body: &Value) -> Request {
    test::TestRequest::post()
        .uri("/booking/store")
        .set_json(body)
        .to_request()
}

/// `GET` `uri`.
pub fn get(uri: &str) -> Request {
    test::TestRequest::get().uri(uri).to_request()
}
