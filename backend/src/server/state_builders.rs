//! Builders wiring adapters into the HTTP state.
//!
//! A configured database pool selects the Diesel repositories, otherwise the
//! shared in-memory store backs both resources. The cache follows the same
//! rule with Redis and the in-process cache.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use booking_backend::domain::ports::{
    AttachmentStorage, BookingRepository, CountryRepository, ReferenceLookup, ResponseCache,
};
use booking_backend::domain::{
    AttachmentUrls, BookingPorts, BookingService, CacheAside, CountryService,
};
use booking_backend::inbound::http::state::HttpState;
use booking_backend::outbound::cache::InMemoryResponseCache;
use booking_backend::outbound::memory::InMemoryStore;
use booking_backend::outbound::persistence::{
    DieselBookingRepository, DieselCountryRepository, DieselReferenceLookup,
};
use booking_backend::outbound::storage::LocalAttachmentStorage;

use super::ServerConfig;

/// Repository ports for both resources.
struct Repositories {
    bookings: Arc<dyn BookingRepository>,
    countries: Arc<dyn CountryRepository>,
    lookup: Arc<dyn ReferenceLookup>,
}

fn build_repositories(config: &ServerConfig) -> Repositories {
    match &config.db_pool {
        Some(pool) => Repositories {
            bookings: Arc::new(DieselBookingRepository::new(pool.clone())),
            countries: Arc::new(DieselCountryRepository::new(pool.clone())),
            lookup: Arc::new(DieselReferenceLookup::new(pool.clone())),
        },
        None => {
            info!("no database configured; using in-memory repositories");
            let store = InMemoryStore::new();
            Repositories {
                bookings: Arc::new(store.bookings()),
                countries: Arc::new(store.countries()),
                lookup: Arc::new(store.lookup()),
            }
        }
    }
}

fn build_cache(config: &ServerConfig, clock: &Arc<dyn Clock>) -> Arc<dyn ResponseCache> {
    match &config.redis {
        Some(redis) => Arc::new(redis.clone()),
        None => {
            info!("no redis configured; caching list pages in process");
            Arc::new(InMemoryResponseCache::new(clock.clone()))
        }
    }
}

/// Assemble the booking and country services behind [`HttpState`].
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let cache = CacheAside::new(build_cache(config, &clock), config.cache_ttl);
    let storage: Arc<dyn AttachmentStorage> =
        Arc::new(LocalAttachmentStorage::new(config.upload_dir.clone()));
    let Repositories {
        bookings,
        countries,
        lookup,
    } = build_repositories(config);

    let booking_service = BookingService::new(
        BookingPorts {
            bookings,
            lookup: lookup.clone(),
            storage: storage.clone(),
        },
        cache.clone(),
        AttachmentUrls::new(&config.public_base_url),
        clock.clone(),
    );
    let country_service = CountryService::new(countries, lookup, cache, clock);

    web::Data::new(HttpState::new(
        Arc::new(booking_service),
        Arc::new(country_service),
        storage,
    ))
}
