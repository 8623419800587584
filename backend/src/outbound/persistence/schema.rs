//! Diesel table definitions for the PostgreSQL schema.
//!
//! The schema is provisioned outside this service; these definitions must
//! match it. `diesel print-schema` against a live database regenerates them.
//!
//! Expected constraints: `countries.code` unique, `bookings` unique on
//! `(customer_email, visit_date)`, `files.booking_id` references
//! `bookings.id`.

diesel::table! {
    /// Reference list of countries bookings may name.
    countries (id) {
        /// Primary key (`BIGSERIAL`).
        id -> Int8,
        /// Unique country code.
        code -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Insert timestamp.
        created_at -> Nullable<Timestamptz>,
        /// Last update timestamp.
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Surf lesson bookings.
    bookings (id) {
        /// Primary key (`BIGSERIAL`).
        id -> Int8,
        customer_name -> Varchar,
        /// Code of a row in `countries`.
        country_code -> Varchar,
        customer_email -> Varchar,
        customer_phone -> Varchar,
        /// 0 to 127.
        surfing_experience -> Int2,
        visit_date -> Date,
        desired_board -> Varchar,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Attachments uploaded with a booking.
    files (id) {
        id -> Int8,
        /// Name the client uploaded the file under.
        file_name -> Varchar,
        /// Public URL of the stored bytes.
        file_url -> Varchar,
        /// Extension of the original name.
        file_type -> Varchar,
        /// Owning booking.
        booking_id -> Int8,
    }
}

diesel::joinable!(files -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(bookings, countries, files);
