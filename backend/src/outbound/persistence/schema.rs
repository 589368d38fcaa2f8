//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `migrations/` exactly; `diesel print-schema` regenerates
//! them from a live database.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public display name (max 32 characters).
        display_name -> Varchar,
        /// Normalised login email; unique.
        email -> Varchar,
        /// Encoded salted password digest.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue entries and their lending state.
    ///
    /// A CHECK constraint keeps `is_borrowed` and `borrower_id` in agreement.
    books (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Title; unique across the catalogue.
        title -> Varchar,
        /// Author name.
        author -> Varchar,
        /// Publication year.
        year -> Int4,
        /// Whether the book is lent out.
        is_borrowed -> Bool,
        /// Current borrower; `ON DELETE RESTRICT`.
        borrower_id -> Nullable<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(books -> users (borrower_id));

diesel::allow_tables_to_appear_in_same_query!(books, users);
