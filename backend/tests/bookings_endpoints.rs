//! Endpoint tests for the booking routes over in-memory adapters.

use actix_web::test::TestRequest;
use booking_backend::domain::BOOKINGS_CACHE_PREFIX;
use rstest::{fixture, rstest};
use serde_json::json;

mod support;

use support::{Harness, PUBLIC_BASE_URL, booking_body, get, send, store_booking, store_country};

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

async fn seed_portugal<S, B>(app: &S)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let (status, _) = send(app, store_country("PT", "Portugal")).await;
    assert_eq!(status, 201);
}

#[rstest]
#[actix_web::test]
async fn repeated_list_is_served_from_cache(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let (status, _) = send(&app, store_booking(&booking_body("ana@example.com", "05/07/2024"))).await;
    assert_eq!(status, 201);

    let (status, first) = send(&app, get("/bookings")).await;
    assert_eq!(status, 200);
    assert_eq!(harness.booking_lists(), 1);

    let (status, second) = send(&app, get("/bookings")).await;
    assert_eq!(status, 200);
    assert_eq!(harness.booking_lists(), 1, "hit must not reach the repository");
    assert_eq!(first, second);
}

#[rstest]
#[actix_web::test]
async fn writes_invalidate_cached_lists(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    send(&app, store_booking(&booking_body("ana@example.com", "05/07/2024"))).await;

    let (_, before) = send(&app, get("/bookings")).await;
    assert_eq!(before["metadata"]["total"], 1);

    let (status, _) = send(&app, store_booking(&booking_body("rui@example.com", "06/07/2024"))).await;
    assert_eq!(status, 201);

    let (_, after) = send(&app, get("/bookings")).await;
    assert_eq!(after["metadata"]["total"], 2);
    assert_eq!(harness.booking_lists(), 2);
    assert!(
        harness
            .forgotten()
            .iter()
            .any(|prefix| prefix == BOOKINGS_CACHE_PREFIX)
    );
}

#[rstest]
#[actix_web::test]
async fn paginates_twenty_five_bookings(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    for n in 0..25 {
        let body = booking_body(&format!("surfer{n}@example.com"), "05/07/2024");
        let (status, _) = send(&app, store_booking(&body)).await;
        assert_eq!(status, 201);
    }

    for (page, expected, from, to) in [(1, 10, 1, 10), (2, 10, 11, 20), (3, 5, 21, 25)] {
        let (status, body) = send(&app, get(&format!("/bookings?page={page}&per_page=10"))).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"].as_array().expect("data array").len(), expected);
        let meta = &body["metadata"];
        assert_eq!(meta["total"], 25);
        assert_eq!(meta["per_page"], 10);
        assert_eq!(meta["current_page"], page);
        assert_eq!(meta["last_page"], 3);
        assert_eq!(meta["from"], from);
        assert_eq!(meta["to"], to);
    }

    let (status, body) = send(&app, get("/bookings?page=4&per_page=10")).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No bookings found based on the provided criteria.");
    assert_eq!(body["data"], json!([]));
}

#[rstest]
#[actix_web::test]
async fn search_and_sort_apply_to_lists(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    for email in ["zoe@example.com", "bea@example.com", "mia@surf.test"] {
        send(&app, store_booking(&booking_body(email, "05/07/2024"))).await;
    }

    let (status, body) = send(
        &app,
        get("/bookings?search=EXAMPLE&sort_by=customer_email&sort_order=desc"),
    )
    .await;
    assert_eq!(status, 200);
    let emails: Vec<&str> = body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|booking| booking["customer_email"].as_str())
        .collect();
    assert_eq!(emails, ["zoe@example.com", "bea@example.com"]);
}

#[rstest]
#[case("/bookings?sort_by=password&sort_order=asc", "The selected sort by is invalid.")]
#[case("/bookings?sort_by=id&sort_order=sideways", "The selected sort order is invalid.")]
#[actix_web::test]
async fn unknown_sort_is_rejected(harness: Harness, #[case] uri: &str, #[case] message: &str) {
    let app = harness.app().await;
    let (status, body) = send(&app, get(uri)).await;
    assert_eq!(status, 422);
    assert_eq!(body["message"], message);
    assert_eq!(harness.booking_lists(), 0);
}

#[rstest]
#[actix_web::test]
async fn duplicate_visit_is_reported_in_the_body(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let body = booking_body("ana@example.com", "05/07/2024");
    let (status, _) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 201);

    let (status, envelope) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 200);
    assert_eq!(envelope["status_code"], 422);
    assert_eq!(
        envelope["message"],
        "ana@example.com already book on 05/07/2024. please choose another visit date."
    );
    assert_eq!(envelope["data"], json!(null));
}

#[rstest]
#[case(json!({}), "The desired board field is required.")]
#[case(
    {
        let mut body = booking_body("ana@example.com", "05/07/2024");
        body["country_code"] = json!("XX");
        body
    },
    "The selected country code is invalid."
)]
#[case(
    {
        let mut body = booking_body("ana@example.com", "2024-07-05");
        body["customer_email"] = json!("not-an-email");
        body
    },
    "The visit date does not match the format d/m/Y."
)]
#[actix_web::test]
async fn invalid_store_bodies_report_one_message(
    harness: Harness,
    #[case] body: serde_json::Value,
    #[case] message: &str,
) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let (status, envelope) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 200);
    assert_eq!(envelope["status_code"], 422);
    assert_eq!(envelope["message"], message);
}

#[rstest]
#[case("{not json")]
#[case("")]
#[actix_web::test]
async fn unreadable_store_bodies_keep_the_store_status_pairing(
    harness: Harness,
    #[case] payload: &'static str,
) {
    let app = harness.app().await;
    let req = TestRequest::post()
        .uri("/booking/store")
        .insert_header(actix_web::http::header::ContentType::json())
        .set_payload(payload)
        .to_request();

    let (status, envelope) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(envelope["status_code"], 422);
    let message = envelope["message"].as_str().expect("message");
    assert!(message.starts_with("The request body is invalid:"), "{message}");
    assert!(!message.ends_with(".."), "{message}");
    assert_eq!(harness.booking_lists(), 0);
}

#[rstest]
#[actix_web::test]
async fn attachments_larger_than_two_mebibytes_are_accepted(harness: Harness) {
    use base64::Engine as _;

    let app = harness.app().await;
    seed_portugal(&app).await;
    let photo = vec![0xAB_u8; 3 * 1024 * 1024];
    let mut body = booking_body("ana@example.com", "05/07/2024");
    body["file_uploads"] = json!([{
        "base64": base64::engine::general_purpose::STANDARD.encode(&photo),
        "name": "wave.jpg",
        "size": photo.len(),
    }]);

    let (status, envelope) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 201, "{envelope}");
    let src = envelope["data"]["files"][0]["src"].as_str().expect("src");
    let stored = src
        .strip_prefix(&format!("{PUBLIC_BASE_URL}/uploads/"))
        .expect("link under uploads");
    let on_disk = std::fs::read(harness.upload_dir.path().join(stored)).expect("file on disk");
    assert_eq!(on_disk.len(), photo.len());
}

#[rstest]
#[actix_web::test]
async fn odd_extensions_still_produce_a_working_link(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let mut body = booking_body("ana@example.com", "05/07/2024");
    body["file_uploads"] = json!([
        {"base64": "aGVsbG8=", "name": "note.txt#v2", "size": 5},
        {"base64": "aGk=", "name": "plan.a b?c", "size": 2}
    ]);

    let (status, envelope) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 201, "{envelope}");
    let files = envelope["data"]["files"].as_array().expect("files");
    assert_eq!(files[0]["file_name"], "note.txt#v2");
    for (file, expected) in files.iter().zip([&b"hello"[..], &b"hi"[..]]) {
        let src = file["src"].as_str().expect("src");
        let stored = src
            .strip_prefix(&format!("{PUBLIC_BASE_URL}/uploads/"))
            .expect("link under uploads");
        assert!(stored.chars().all(|c| c.is_ascii_alphanumeric() || c == '.'), "{stored}");

        let res = actix_web::test::call_service(&app, get(&format!("/uploads/{stored}"))).await;
        assert_eq!(res.status(), 200);
        assert_eq!(actix_web::test::read_body(res).await.as_ref(), expected);
    }
}

#[rstest]
#[actix_web::test]
async fn uploads_are_written_linked_and_served(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let mut body = booking_body("ana@example.com", "05/07/2024");
    body["file_uploads"] = json!([
        {"base64": "data:text/plain;base64,aGVsbG8=", "name": "note.txt", "size": 5}
    ]);

    let (status, envelope) = send(&app, store_booking(&body)).await;
    assert_eq!(status, 201);
    assert_eq!(envelope["message"], "Successfully inserted booking with files.");
    let files = envelope["data"]["files"].as_array().expect("files");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["file_name"], "note.txt");
    let src = files[0]["src"].as_str().expect("src");
    let stored = src
        .strip_prefix(&format!("{PUBLIC_BASE_URL}/uploads/"))
        .expect("link under uploads");
    assert!(stored.ends_with(".txt"));

    let on_disk = std::fs::read(harness.upload_dir.path().join(stored)).expect("file on disk");
    assert_eq!(on_disk, b"hello");

    let res = actix_web::test::call_service(&app, get(&format!("/uploads/{stored}"))).await;
    assert_eq!(res.status(), 200);
    assert_eq!(actix_web::test::read_body(res).await.as_ref(), b"hello");

    let (_, listed) = send(&app, get("/bookings")).await;
    assert_eq!(listed["data"][0]["files"][0]["src"], src);
}

#[rstest]
#[actix_web::test]
async fn update_overwrites_and_reports_row_count(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let (_, created) = send(&app, store_booking(&booking_body("ana@example.com", "05/07/2024"))).await;
    let id = created["data"]["id"].as_i64().expect("id");

    let mut body = booking_body("ana@example.com", "05/07/2024");
    body["id"] = json!(id);
    body["desired_board"] = json!("shortboard");
    let req = TestRequest::put().uri("/booking/update").set_json(&body).to_request();
    let (status, envelope) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(envelope["message"], "Successfully updated booking.");
    assert_eq!(envelope["data"], 1);

    let (_, listed) = send(&app, get("/bookings")).await;
    assert_eq!(listed["data"][0]["desired_board"], "shortboard");

    body["id"] = json!(9999);
    let req = TestRequest::put().uri("/booking/update").set_json(&body).to_request();
    let (status, envelope) = send(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(envelope["message"], "Booking not found.");
}

#[rstest]
#[actix_web::test]
async fn delete_removes_booking_and_files(harness: Harness) {
    let app = harness.app().await;
    seed_portugal(&app).await;
    let mut body = booking_body("ana@example.com", "05/07/2024");
    body["file_uploads"] = json!([{"base64": "aGk=", "name": "a.png", "size": 2}]);
    let (_, created) = send(&app, store_booking(&body)).await;
    let id = created["data"]["id"].as_i64().expect("id");
    let src = created["data"]["files"][0]["src"].as_str().expect("src").to_owned();
    let stored = src.rsplit('/').next().expect("file name").to_owned();

    let req = TestRequest::delete()
        .uri("/booking/delete")
        .set_json(json!({"id": id}))
        .to_request();
    let (status, envelope) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(envelope["message"], "Successfully deleted booking.");
    assert_eq!(envelope["data"], 1);
    assert!(!harness.upload_dir.path().join(&stored).exists());

    let (status, _) = send(&app, get("/bookings")).await;
    assert_eq!(status, 404);

    let req = TestRequest::delete()
        .uri("/booking/delete")
        .set_json(json!({"id": id}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[rstest]
#[actix_web::test]
async fn token_guard_rejects_missing_bearer() {
    let harness = Harness::with_token(Some("s3cret"));
    let app = harness.app().await;

    let (status, envelope) = send(&app, get("/bookings")).await;
    assert_eq!(status, 401);
    assert_eq!(envelope["message"], "Unauthenticated.");
    assert_eq!(envelope["status_code"], 401);

    let req = TestRequest::get()
        .uri("/bookings")
        .insert_header(("Authorization", "Bearer s3cret"))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}
