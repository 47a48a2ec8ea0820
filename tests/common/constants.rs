//! Shared constants for end-to-end tests
//!
//! Every fixture file is built from these values, so assertions can refer
//! to them instead of repeating literals.

// ============================================================================
// Song Catalog
// ============================================================================

/// Song matched by the default NextSong event
pub const SONG_ID: &str = "SOID000001";
pub const SONG_TITLE: &str = "Test Song";
pub const ARTIST_ID: &str = "ARID000001";
pub const ARTIST_NAME: &str = "Test Artist";

/// Second song, never played by the default events
pub const OTHER_SONG_ID: &str = "SOID000002";
pub const OTHER_SONG_TITLE: &str = "Other Song";
pub const OTHER_ARTIST_ID: &str = "ARID000002";
pub const OTHER_ARTIST_NAME: &str = "Other Artist";

// ============================================================================
// Event Log
// ============================================================================

/// 2018-11-15 03:44:09 UTC, a Thursday in ISO week 46
pub const EVENT_TS: i64 = 1542253449;

/// 2021-01-01 00:30:00 UTC, ISO week 53 of 2020
pub const NEW_YEAR_TS: i64 = 1609461000;

/// 2018-12-31 12:00:00 UTC, ISO week 1 of 2019
pub const YEAR_END_TS: i64 = 1546257600;

/// 2018-11-18 23:59:59 UTC, a Sunday
pub const SUNDAY_TS: i64 = 1542585599;

/// Listener who plays songs
pub const USER_ID: i64 = 26;
pub const USER_FIRST_NAME: &str = "Ryan";
pub const USER_LAST_NAME: &str = "Smith";

/// Visitor who only browses pages and never plays a song
pub const BROWSING_USER_ID: i64 = 99;

pub const SESSION_ID: i64 = 583;
pub const USER_LOCATION: &str = "San Jose-Sunnyvale-Santa Clara, CA";
