//! The seven warehouse tables: two staging landing tables, four dimensions
//! and the `songplays` fact table.

use super::{ForeignKey, SqlType, Table, TableKind};
use crate::warehouse_column;

// =============================================================================
// Staging Tables
// =============================================================================

/// Raw event-log rows, loaded through a JSONPaths mapping.
pub const STAGING_EVENTS_TABLE: Table = Table {
    name: "staging_events",
    statement_prefix: "staging_events",
    kind: TableKind::Staging,
    columns: &[
        warehouse_column!("artist", &SqlType::Text),
        warehouse_column!("auth", &SqlType::Text),
        warehouse_column!("first_name", &SqlType::Text),
        warehouse_column!("gender", &SqlType::Char),
        warehouse_column!("item_in_session", &SqlType::Int),
        warehouse_column!("last_name", &SqlType::Text),
        warehouse_column!("length", &SqlType::Float),
        warehouse_column!("level", &SqlType::Text),
        warehouse_column!("location", &SqlType::Text),
        warehouse_column!("method", &SqlType::Varchar(Some(3))),
        warehouse_column!("page", &SqlType::Text),
        warehouse_column!("registration", &SqlType::BigInt),
        warehouse_column!("session_id", &SqlType::Int),
        warehouse_column!("song", &SqlType::Text),
        warehouse_column!("status", &SqlType::Int),
        warehouse_column!("ts", &SqlType::BigInt), // epoch seconds
        warehouse_column!("user_agent", &SqlType::Text),
        warehouse_column!("user_id", &SqlType::Int),
    ],
};

/// Raw song-catalog rows, loaded with `JSON 'auto'`.
pub const STAGING_SONGS_TABLE: Table = Table {
    name: "staging_songs",
    statement_prefix: "staging_songs",
    kind: TableKind::Staging,
    columns: &[
        warehouse_column!("num_songs", &SqlType::Int),
        warehouse_column!("artist_id", &SqlType::Varchar(None)),
        warehouse_column!("artist_latitude", &SqlType::Float),
        warehouse_column!("artist_longitude", &SqlType::Float),
        warehouse_column!("artist_location", &SqlType::Text),
        warehouse_column!("artist_name", &SqlType::Text),
        warehouse_column!("song_id", &SqlType::Varchar(None)),
        warehouse_column!("title", &SqlType::Text),
        warehouse_column!("duration", &SqlType::Float),
        warehouse_column!("year", &SqlType::Int),
    ],
};

// =============================================================================
// Dimension Tables
// =============================================================================

pub const USERS_TABLE: Table = Table {
    name: "users",
    statement_prefix: "user",
    kind: TableKind::Dimension,
    columns: &[
        warehouse_column!("user_id", &SqlType::Int, is_primary_key = true),
        warehouse_column!("first_name", &SqlType::Text, non_null = true),
        warehouse_column!("last_name", &SqlType::Varchar(Some(255))),
        warehouse_column!("gender", &SqlType::Char),
        warehouse_column!("level", &SqlType::Text),
    ],
};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    statement_prefix: "song",
    kind: TableKind::Dimension,
    columns: &[
        warehouse_column!("song_id", &SqlType::Varchar(None), is_primary_key = true),
        warehouse_column!("title", &SqlType::Text, non_null = true),
        warehouse_column!("artist_id", &SqlType::Varchar(None), non_null = true),
        warehouse_column!("year", &SqlType::Int),
        warehouse_column!("duration", &SqlType::Float),
    ],
};

pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    statement_prefix: "artist",
    kind: TableKind::Dimension,
    columns: &[
        warehouse_column!("artist_id", &SqlType::Varchar(None), is_primary_key = true),
        warehouse_column!("name", &SqlType::Text, non_null = true),
        warehouse_column!("location", &SqlType::Text),
        warehouse_column!("latitude", &SqlType::Float),
        warehouse_column!("longitude", &SqlType::Float),
    ],
};

pub const TIME_TABLE: Table = Table {
    name: "time",
    statement_prefix: "time",
    kind: TableKind::Dimension,
    columns: &[
        warehouse_column!("start_time", &SqlType::Timestamp, is_primary_key = true),
        warehouse_column!("hour", &SqlType::Int),
        warehouse_column!("day", &SqlType::Int),
        warehouse_column!("week", &SqlType::Int),
        warehouse_column!("month", &SqlType::Int),
        warehouse_column!("year", &SqlType::Int),
        warehouse_column!("weekday", &SqlType::Int),
    ],
};

// =============================================================================
// Fact Table
// =============================================================================

const TIME_FK: ForeignKey = ForeignKey {
    foreign_table: "time",
    foreign_column: "start_time",
};

const USERS_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "user_id",
};

const SONGS_FK: ForeignKey = ForeignKey {
    foreign_table: "songs",
    foreign_column: "song_id",
};

const ARTISTS_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "artist_id",
};

/// One play event. The foreign keys are declared but the warehouse does not
/// check them on insert, which is what lets `time` be filled from this table.
pub const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    statement_prefix: "songplay",
    kind: TableKind::Fact,
    columns: &[
        warehouse_column!(
            "songplay_id",
            &SqlType::Int,
            is_primary_key = true,
            is_identity = true
        ),
        warehouse_column!("start_time", &SqlType::Timestamp, foreign_key = Some(&TIME_FK)),
        warehouse_column!("user_id", &SqlType::Int, foreign_key = Some(&USERS_FK)),
        warehouse_column!("level", &SqlType::Text),
        warehouse_column!("song_id", &SqlType::Varchar(None), foreign_key = Some(&SONGS_FK)),
        warehouse_column!("artist_id", &SqlType::Varchar(None), foreign_key = Some(&ARTISTS_FK)),
        warehouse_column!("session_id", &SqlType::Int),
        warehouse_column!("location", &SqlType::Text),
        warehouse_column!("user_agent", &SqlType::Text),
    ],
};

/// Staging first by convention; drops are independent of each other.
pub const DROP_ORDER: &[&Table] = &[
    &STAGING_EVENTS_TABLE,
    &STAGING_SONGS_TABLE,
    &SONGPLAYS_TABLE,
    &USERS_TABLE,
    &SONGS_TABLE,
    &ARTISTS_TABLE,
    &TIME_TABLE,
];

/// Every referenced table is created before the tables referencing it.
pub const CREATE_ORDER: &[&Table] = &[
    &STAGING_EVENTS_TABLE,
    &STAGING_SONGS_TABLE,
    &USERS_TABLE,
    &SONGS_TABLE,
    &ARTISTS_TABLE,
    &TIME_TABLE,
    &SONGPLAYS_TABLE,
];
