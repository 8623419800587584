//! Country use-cases.

use std::sync::Arc;

use mockable::Clock;
use pagination::Page;
use serde_json::Value;
use tracing::{error, info};

use super::cache_aside::CacheAside;
use super::cache_key::COUNTRIES_CACHE_PREFIX;
use super::ports::{ColumnRef, CountryRepository, CountryRepositoryError, ReferenceLookup};
use super::validation::{Rule, RuleSet, Validator};
use super::{Country, CountryColumn, CountryDetails, Error, ListParams, ListQuery};

/// Rules for country create (`except_id = None`) and update.
#[must_use]
pub fn country_rules(except_id: Option<i64>) -> RuleSet {
    RuleSet::new()
        .field(
            "code",
            [
                Rule::Required,
                Rule::String,
                Rule::Max(255),
                Rule::Unique {
                    column: ColumnRef::COUNTRY_CODE,
                    except_id,
                },
            ],
        )
        .field("name", [Rule::Required, Rule::String, Rule::Max(255)])
}

fn repository_failure(err: CountryRepositoryError, message: &'static str) -> Error {
    match err {
        CountryRepositoryError::DuplicateCode { .. } => {
            Error::validation("The code has already been taken.")
        }
        other => {
            error!(error = %other, "country repository failed");
            Error::persistence(message)
        }
    }
}

/// Country service.
#[derive(Clone)]
pub struct CountryService {
    countries: Arc<dyn CountryRepository>,
    lookup: Arc<dyn ReferenceLookup>,
    cache: CacheAside,
    clock: Arc<dyn Clock>,
}

impl CountryService {
    /// Build the service.
    pub fn new(
        countries: Arc<dyn CountryRepository>,
        lookup: Arc<dyn ReferenceLookup>,
        cache: CacheAside,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            countries,
            lookup,
            cache,
            clock,
        }
    }

    /// One page of countries, served from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a rejected sort, or a persistence error
    /// when the repository fails on a miss.
    pub async fn list(&self, params: &ListParams) -> Result<Page<Country>, Error> {
        let query = ListQuery::<CountryColumn>::from_params(params)?;
        let key = query.cache_key(COUNTRIES_CACHE_PREFIX);
        self.cache
            .fetch(key.as_str(), || async {
                self.countries
                    .list(&query)
                    .await
                    .map_err(|err| repository_failure(err, "Failed to retrieve countries."))
            })
            .await
    }

    /// Create a country.
    ///
    /// # Errors
    ///
    /// Validation errors for bad input or a taken code; a persistence error
    /// when the insert fails.
    pub async fn store(&self, body: &Value) -> Result<Country, Error> {
        Validator::new(self.lookup.as_ref())
            .validate(&country_rules(None), body)
            .await?;
        let details = CountryDetails::from_validated(body)?;
        let country = self
            .countries
            .insert(&details, self.clock.utc())
            .await
            .map_err(|err| repository_failure(err, "Failed to create country."))?;
        self.cache.invalidate(COUNTRIES_CACHE_PREFIX).await;
        info!(country_id = country.id, code = %country.code, "country created");
        Ok(country)
    }

    /// Overwrite a country, returning the affected row count.
    ///
    /// # Errors
    ///
    /// Validation errors for bad input, not found for an unknown id, a
    /// persistence error when the update fails.
    pub async fn update(&self, id: i64, body: &Value) -> Result<u64, Error> {
        const FAILED: &str = "Failed to update country.";
        Validator::new(self.lookup.as_ref())
            .validate(&country_rules(Some(id)), body)
            .await?;
        let details = CountryDetails::from_validated(body)?;
        let existing = self
            .countries
            .find(id)
            .await
            .map_err(|err| repository_failure(err, FAILED))?;
        if existing.is_none() {
            return Err(Error::not_found("Country not found."));
        }
        let rows = self
            .countries
            .update(id, &details, self.clock.utc())
            .await
            .map_err(|err| repository_failure(err, FAILED))?;
        self.cache.invalidate(COUNTRIES_CACHE_PREFIX).await;
        info!(country_id = id, rows, "country updated");
        Ok(rows)
    }

    /// Delete a country, returning the deleted row count.
    ///
    /// # Errors
    ///
    /// Not found for an unknown id, a persistence error when the delete
    /// fails.
    pub async fn delete(&self, id: i64) -> Result<u64, Error> {
        let rows = self
            .countries
            .delete(id)
            .await
            .map_err(|err| repository_failure(err, "Failed to delete country."))?;
        if rows == 0 {
            return Err(Error::not_found("Country not found."));
        }
        self.cache.invalidate(COUNTRIES_CACHE_PREFIX).await;
        info!(country_id = id, "country deleted");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{DateTime, Local, Utc};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockCountryRepository, MockReferenceLookup, MockResponseCache};

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct Mocks {
        countries: MockCountryRepository,
        lookup: MockReferenceLookup,
        cache: MockResponseCache,
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            countries: MockCountryRepository::new(),
            lookup: MockReferenceLookup::new(),
            cache: MockResponseCache::new(),
        }
    }

    fn service(mocks: Mocks) -> CountryService {
        CountryService::new(
            Arc::new(mocks.countries),
            Arc::new(mocks.lookup),
            CacheAside::new(Arc::new(mocks.cache), Duration::from_secs(300)),
            Arc::new(FrozenClock(DateTime::<Utc>::UNIX_EPOCH)),
        )
    }

    fn country(id: i64, details: &CountryDetails) -> Country {
        Country {
            id,
            code: details.code.clone(),
            name: details.name.clone(),
            created_at: Some(DateTime::<Utc>::UNIX_EPOCH),
            updated_at: Some(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn store_rejects_taken_code(mut mocks: Mocks) {
        mocks
            .lookup
            .expect_value_exists()
            .withf(|_, value, except| value == "PT" && except.is_none())
            .returning(|_, _, _| Ok(true));
        mocks.countries.expect_insert().never();

        let err = service(mocks)
            .store(&json!({"code": "PT", "name": "Portugal"}))
            .await
            .expect_err("taken code");
        assert_eq!(err.code(), ErrorCode::Validation);
        assert_eq!(err.message(), "The code has already been taken.");
    }

    #[rstest]
    #[tokio::test]
    async fn store_maps_racing_duplicate_to_validation(mut mocks: Mocks) {
        mocks
            .lookup
            .expect_value_exists()
            .returning(|_, _, _| Ok(false));
        mocks
            .countries
            .expect_insert()
            .returning(|details, _| Err(CountryRepositoryError::duplicate_code(&details.code)));
        mocks.cache.expect_forget_by_prefix().never();

        let err = service(mocks)
            .store(&json!({"code": "PT", "name": "Portugal"}))
            .await
            .expect_err("duplicate");
        assert_eq!(err.message(), "The code has already been taken.");
    }

    #[rstest]
    #[tokio::test]
    async fn store_invalidates_country_pages(mut mocks: Mocks) {
        mocks
            .lookup
            .expect_value_exists()
            .returning(|_, _, _| Ok(false));
        mocks
            .countries
            .expect_insert()
            .withf(|_, now| *now == DateTime::<Utc>::UNIX_EPOCH)
            .returning(|details, _| Ok(country(3, details)));
        mocks
            .cache
            .expect_forget_by_prefix()
            .withf(|prefix| prefix == COUNTRIES_CACHE_PREFIX)
            .times(1)
            .returning(|_| Ok(2));

        let created = service(mocks)
            .store(&json!({"code": "ES", "name": "Spain"}))
            .await
            .expect("created");
        assert_eq!(created.id, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn update_allows_keeping_own_code(mut mocks: Mocks) {
        mocks
            .lookup
            .expect_value_exists()
            .withf(|_, _, except| *except == Some(8))
            .times(1)
            .returning(|_, _, _| Ok(false));
        mocks
            .countries
            .expect_find()
            .returning(|id| Ok(Some(country(id, &CountryDetails {
                code: "PT".to_owned(),
                name: "Portugal".to_owned(),
            }))));
        mocks
            .countries
            .expect_update()
            .times(1)
            .returning(|_, _, _| Ok(1));
        mocks
            .cache
            .expect_forget_by_prefix()
            .times(1)
            .returning(|_| Ok(0));

        let rows = service(mocks)
            .update(8, &json!({"code": "PT", "name": "Portuguese Republic"}))
            .await
            .expect("updated");
        assert_eq!(rows, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_id_is_not_found(mut mocks: Mocks) {
        mocks
            .lookup
            .expect_value_exists()
            .returning(|_, _, _| Ok(false));
        mocks.countries.expect_find().returning(|_| Ok(None));
        mocks.countries.expect_update().never();

        let err = service(mocks)
            .update(8, &json!({"code": "PT", "name": "Portugal"}))
            .await
            .expect_err("unknown id");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Country not found.");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_without_rows_is_not_found(mut mocks: Mocks) {
        mocks.countries.expect_delete().returning(|_| Ok(0));
        mocks.cache.expect_forget_by_prefix().never();

        let err = service(mocks).delete(4).await.expect_err("nothing deleted");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn list_failure_is_not_cached(mut mocks: Mocks) {
        mocks.cache.expect_has().returning(|_| Ok(false));
        mocks.cache.expect_put().never();
        mocks
            .countries
            .expect_list()
            .returning(|_| Err(CountryRepositoryError::connection("refused")));

        let err = service(mocks)
            .list(&ListParams::default())
            .await
            .expect_err("repository failure");
        assert_eq!(err.code(), ErrorCode::Persistence);
        assert_eq!(err.message(), "Failed to retrieve countries.");
    }
}
