//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Non-blank task title.
        #[max_length = 200]
        title -> Varchar,
        /// Optional task description.
        #[max_length = 500]
        description -> Nullable<Varchar>,
        /// Completion flag.
        completed -> Bool,
        /// Creation timestamp, written once on insert.
        created_at -> Timestamptz,
    }
}
