//! Tests for the booking service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use pagination::PageRequest;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    AttachmentStorageError, MockAttachmentStorage, MockBookingRepository, MockReferenceLookup,
    MockResponseCache,
};
use crate::domain::{DeletedBooking, ListParams};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

struct Mocks {
    bookings: MockBookingRepository,
    lookup: MockReferenceLookup,
    storage: MockAttachmentStorage,
    cache: MockResponseCache,
}

#[fixture]
fn mocks() -> Mocks {
    let mut lookup = MockReferenceLookup::new();
    lookup.expect_value_exists().returning(|_, _, _| Ok(true));
    Mocks {
        bookings: MockBookingRepository::new(),
        lookup,
        storage: MockAttachmentStorage::new(),
        cache: MockResponseCache::new(),
    }
}

fn service(mocks: Mocks) -> BookingService {
    let base = Url::parse("http://surf.test").expect("valid url");
    BookingService::new(
        BookingPorts {
            bookings: Arc::new(mocks.bookings),
            lookup: Arc::new(mocks.lookup),
            storage: Arc::new(mocks.storage),
        },
        CacheAside::new(Arc::new(mocks.cache), Duration::from_secs(300)),
        AttachmentUrls::new(&base),
        Arc::new(FixtureClock),
    )
}

fn store_body() -> Value {
    json!({
        "customer_name": "Ana Costa",
        "country_code": "PT",
        "customer_email": "ana@example.com",
        "customer_phone": "+351 900 000 000",
        "surfing_experience": 4,
        "visit_date": "05/07/2024",
        "desired_board": "longboard",
        "file_uploads": [
            {"base64": "data:text/plain;base64,aGVsbG8=", "name": "note.txt", "size": 5},
        ],
    })
}

fn stored_booking(id: i64, details: &BookingDetails) -> Booking {
    Booking {
        id,
        details: details.clone(),
        created_at: Some(FixtureClock.utc()),
        updated_at: Some(FixtureClock.utc()),
    }
}

fn expect_invalidation(cache: &mut MockResponseCache) {
    cache
        .expect_forget_by_prefix()
        .withf(|prefix| prefix == BOOKINGS_CACHE_PREFIX)
        .times(1)
        .returning(|_| Ok(1));
}

#[rstest]
#[tokio::test]
async fn store_writes_booking_then_files(mut mocks: Mocks) {
    mocks
        .bookings
        .expect_visit_taken()
        .times(1)
        .returning(|_, _, except| {
            assert!(except.is_none());
            Ok(false)
        });
    mocks
        .bookings
        .expect_insert()
        .withf(|_, now| *now == FixtureClock.utc())
        .times(1)
        .returning(|details, _| Ok(stored_booking(11, details)));
    mocks
        .storage
        .expect_store()
        .withf(|name, bytes| name.ends_with(".txt") && bytes == b"hello")
        .times(1)
        .returning(|_, _| Ok(()));
    mocks
        .bookings
        .expect_insert_file()
        .times(1)
        .returning(|file| {
            Ok(BookingFile {
                id: 1,
                booking_id: file.booking_id,
                file_name: file.file_name.clone(),
                file_type: file.file_type.clone(),
                file_url: file.file_url.clone(),
            })
        });
    expect_invalidation(&mut mocks.cache);

    let view = service(mocks)
        .store(&store_body())
        .await
        .expect("booking stored");
    assert_eq!(view.id, 11);
    assert_eq!(view.files.len(), 1);
    assert_eq!(view.files[0].file_name, "note.txt");
    assert!(view.files[0].src.starts_with("http://surf.test/uploads/"));
}

#[rstest]
#[tokio::test]
async fn store_rejects_duplicate_visit(mut mocks: Mocks) {
    mocks
        .bookings
        .expect_visit_taken()
        .returning(|_, _, _| Ok(true));
    mocks.bookings.expect_insert().never();
    mocks.cache.expect_forget_by_prefix().never();

    let err = service(mocks)
        .store(&store_body())
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err.code(), ErrorCode::Duplicate);
    assert_eq!(
        err.message(),
        "ana@example.com already book on 05/07/2024. please choose another visit date."
    );
}

#[rstest]
#[tokio::test]
async fn store_rejects_bad_payload_before_any_write(mut mocks: Mocks) {
    mocks.bookings.expect_visit_taken().never();
    mocks.bookings.expect_insert().never();
    let mut body = store_body();
    body["file_uploads"][0]["base64"] = json!("%%%");

    let err = service(mocks)
        .store(&body)
        .await
        .expect_err("invalid payload rejected");
    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(
        err.message(),
        "The file uploads.0.base64 must be a valid base64 payload."
    );
}

#[rstest]
#[tokio::test]
async fn failed_file_write_rolls_back_booking(mut mocks: Mocks) {
    mocks
        .bookings
        .expect_visit_taken()
        .returning(|_, _, _| Ok(false));
    mocks
        .bookings
        .expect_insert()
        .returning(|details, _| Ok(stored_booking(12, details)));
    mocks
        .storage
        .expect_store()
        .returning(|name, _| Err(AttachmentStorageError::io(name, "disk full")));
    mocks.storage.expect_remove().never();
    mocks.bookings.expect_insert_file().never();
    mocks
        .bookings
        .expect_delete()
        .withf(|id| *id == 12)
        .times(1)
        .returning(|_| {
            Ok(DeletedBooking {
                rows: 1,
                files: Vec::new(),
            })
        });
    mocks.cache.expect_forget_by_prefix().never();

    let err = service(mocks)
        .store(&store_body())
        .await
        .expect_err("write failure surfaces");
    assert_eq!(err.code(), ErrorCode::Persistence);
    assert_eq!(err.message(), "Failed to store file note.txt.");
}

#[rstest]
#[tokio::test]
async fn update_reports_missing_booking(mut mocks: Mocks) {
    mocks.bookings.expect_find().returning(|_| Ok(None));
    mocks.bookings.expect_update().never();
    let mut body = store_body();
    body["id"] = json!(99);

    let err = service(mocks)
        .update(&body)
        .await
        .expect_err("unknown id");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Booking not found.");
}

#[rstest]
#[tokio::test]
async fn update_excludes_itself_from_duplicate_check(mut mocks: Mocks) {
    mocks.bookings.expect_find().returning(|id| {
        let details = BookingDetails::from_validated(&store_body()).expect("details");
        Ok(Some(stored_booking(id, &details)))
    });
    mocks
        .bookings
        .expect_visit_taken()
        .withf(|_, date, except| {
            *date == NaiveDate::from_ymd_opt(2024, 7, 5).expect("date") && *except == Some(4)
        })
        .times(1)
        .returning(|_, _, _| Ok(false));
    mocks
        .bookings
        .expect_update()
        .withf(|id, _, _| *id == 4)
        .times(1)
        .returning(|_, _, _| Ok(1));
    expect_invalidation(&mut mocks.cache);
    let mut body = store_body();
    body["id"] = json!("4");

    let rows = service(mocks).update(&body).await.expect("updated");
    assert_eq!(rows, 1);
}

#[rstest]
#[tokio::test]
async fn update_reports_id_before_other_fields(mocks: Mocks) {
    // Every field fails; id is declared first, so desired_board wins.
    let err = service(mocks)
        .update(&json!({"id": "abc"}))
        .await
        .expect_err("invalid body");
    assert_eq!(err.message(), "The desired board field is required.");
}

#[rstest]
#[tokio::test]
async fn delete_removes_stored_files_best_effort(mut mocks: Mocks) {
    mocks.bookings.expect_delete().times(1).returning(|id| {
        Ok(DeletedBooking {
            rows: 1,
            files: vec![BookingFile {
                id: 3,
                booking_id: id,
                file_name: "note.txt".to_owned(),
                file_type: "txt".to_owned(),
                file_url: "http://surf.test/uploads/abc.txt".to_owned(),
            }],
        })
    });
    mocks
        .storage
        .expect_remove()
        .withf(|name| name == "abc.txt")
        .times(1)
        .returning(|name| Err(AttachmentStorageError::io(name, "busy")));
    expect_invalidation(&mut mocks.cache);

    let rows = service(mocks)
        .delete(&json!({"id": 5}))
        .await
        .expect("deleted despite cleanup failure");
    assert_eq!(rows, 1);
}

#[rstest]
#[tokio::test]
async fn delete_of_unknown_id_is_not_found(mut mocks: Mocks) {
    mocks
        .bookings
        .expect_delete()
        .returning(|_| Ok(DeletedBooking::default()));
    mocks.cache.expect_forget_by_prefix().never();

    let err = service(mocks)
        .delete(&json!({"id": 5}))
        .await
        .expect_err("nothing deleted");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_groups_files_by_booking(mut mocks: Mocks) {
    mocks.cache.expect_has().returning(|_| Ok(false));
    mocks.cache.expect_put().times(1).returning(|_, _, _| Ok(()));
    mocks.bookings.expect_list().times(1).returning(|query| {
        let details = BookingDetails::from_validated(&store_body()).expect("details");
        Ok(Page::new(
            vec![stored_booking(1, &details), stored_booking(2, &details)],
            query.page(),
            2,
        ))
    });
    mocks
        .bookings
        .expect_files_for()
        .withf(|ids| ids == [1, 2])
        .times(1)
        .returning(|_| {
            Ok(vec![BookingFile {
                id: 9,
                booking_id: 2,
                file_name: "a.png".to_owned(),
                file_type: "png".to_owned(),
                file_url: "http://surf.test/uploads/x.png".to_owned(),
            }])
        });

    let page = service(mocks)
        .list(&ListParams::default())
        .await
        .expect("listed");
    assert!(page.items[0].files.is_empty());
    assert_eq!(page.items[1].files[0].file_name, "a.png");
    assert_eq!(page.meta.total, 2);
}

#[rstest]
#[tokio::test]
async fn empty_list_skips_file_lookup(mut mocks: Mocks) {
    mocks.cache.expect_has().returning(|_| Ok(false));
    mocks.cache.expect_put().returning(|_, _, _| Ok(()));
    mocks
        .bookings
        .expect_list()
        .returning(|_| Ok(Page::new(Vec::new(), PageRequest::default(), 0)));
    mocks.bookings.expect_files_for().never();

    let page = service(mocks)
        .list(&ListParams::default())
        .await
        .expect("listed");
    assert!(page.is_empty());
}
