//! Fixture files for end-to-end tests
//!
//! Writes a small song catalog, an event log and the jsonpaths mapping
//! into a temporary directory laid out like the object-storage buckets.

use super::constants::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Column order of the staging_events table, as event-log keys.
const EVENT_KEYS: [&str; 18] = [
    "artist",
    "auth",
    "firstName",
    "gender",
    "itemInSession",
    "lastName",
    "length",
    "level",
    "location",
    "method",
    "page",
    "registration",
    "sessionId",
    "song",
    "status",
    "ts",
    "userAgent",
    "userId",
];

pub fn song_record(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": 218.93179,
        "year": 0
    })
}

/// A NextSong event of the default listener.
pub fn next_song_event(song: &str, artist: &str, ts: i64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": USER_FIRST_NAME,
        "gender": "M",
        "itemInSession": 0,
        "lastName": USER_LAST_NAME,
        "length": 218.93179,
        "level": "free",
        "location": USER_LOCATION,
        "method": "PUT",
        "page": "NextSong",
        "registration": 1541016707796.0,
        "sessionId": SESSION_ID,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
        "userId": USER_ID.to_string()
    })
}

/// A page view that is not a song play.
pub fn page_event(page: &str, user_id: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Ghost",
        "gender": "F",
        "itemInSession": 1,
        "lastName": "Visitor",
        "length": null,
        "level": "paid",
        "location": "Nowhere, NV",
        "method": "GET",
        "page": page,
        "registration": 1540919166796.0,
        "sessionId": 12,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "curl/8.0",
        "userId": user_id
    })
}

/// One matching play, one play of an unknown song and one page view.
pub fn default_events() -> Vec<Value> {
    vec![
        next_song_event(SONG_TITLE, ARTIST_NAME, EVENT_TS),
        next_song_event("Unknown Song", "Nobody", EVENT_TS + 60),
        page_event("Home", &BROWSING_USER_ID.to_string(), EVENT_TS + 120),
    ]
}

pub fn write_song_data(root: &Path) -> PathBuf {
    let dir = root.join("song_data");
    fs::create_dir_all(dir.join("A/A/A")).unwrap();
    fs::create_dir_all(dir.join("A/B/C")).unwrap();
    fs::write(
        dir.join("A/A/A/TRAAAAK128F9318786.json"),
        song_record(SONG_ID, SONG_TITLE, ARTIST_ID, ARTIST_NAME).to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("A/B/C/TRABCEI128F424C983.json"),
        song_record(
            OTHER_SONG_ID,
            OTHER_SONG_TITLE,
            OTHER_ARTIST_ID,
            OTHER_ARTIST_NAME,
        )
        .to_string(),
    )
    .unwrap();
    dir
}

/// Writes the events as JSON lines, the way the event-log files are laid out.
pub fn write_log_data(root: &Path, events: &[Value]) -> PathBuf {
    let dir = root.join("log_data/2018/11");
    fs::create_dir_all(&dir).unwrap();
    let lines = events
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(dir.join("2018-11-15-events.json"), lines).unwrap();
    root.join("log_data")
}

pub fn write_jsonpaths(root: &Path) -> PathBuf {
    let paths: Vec<String> = EVENT_KEYS.iter().map(|k| format!("$['{}']", k)).collect();
    let path = root.join("log_json_path.json");
    fs::write(&path, json!({ "jsonpaths": paths }).to_string()).unwrap();
    path
}

/// Writes a config file selecting the sqlite engine on fixtures under `root`.
pub fn write_config(root: &Path) -> PathBuf {
    let path = root.join("dwh.toml");
    let content = format!(
        r#"
[cluster]
engine = "sqlite"
sqlite_path = '{root}/sparkify.db'

[s3]
log_data = '{root}/log_data'
log_jsonpath = '{root}/log_json_path.json'
song_data = '{root}/song_data'
"#,
        root = root.display()
    );
    fs::write(&path, content).unwrap();
    path
}
