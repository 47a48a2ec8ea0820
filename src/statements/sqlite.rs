// Transform statements for the local SQLite engine. They select the same
// rows as the Redshift statements; only the date arithmetic differs.
//
// start_time is stored as 'YYYY-MM-DD HH:MM:SS' (UTC). The ISO week is the
// day-of-year of the Thursday in the same week, divided into 7-day blocks.

pub(super) const SONGPLAY_TABLE_INSERT: &str = "
    INSERT INTO songplays (
        start_time,
        user_id,
        level,
        song_id,
        artist_id,
        session_id,
        location,
        user_agent)
    SELECT DISTINCT
        datetime(e.ts, 'unixepoch') AS start_time,
        e.user_id AS user_id,
        e.level AS level,
        s.song_id AS song_id,
        s.artist_id AS artist_id,
        e.session_id AS session_id,
        e.location AS location,
        e.user_agent AS user_agent
    FROM staging_events e
    JOIN staging_songs s
    ON s.title = e.song
    AND s.artist_name = e.artist
    WHERE e.page = 'NextSong';
";

pub(super) const USER_TABLE_INSERT: &str = "
    INSERT INTO users
    SELECT DISTINCT user_id, first_name, last_name, gender, level
    FROM staging_events
    WHERE page = 'NextSong';
";

pub(super) const SONG_TABLE_INSERT: &str = "
    INSERT INTO songs
    SELECT DISTINCT song_id, title, artist_id, year, duration
    FROM staging_songs;
";

pub(super) const ARTIST_TABLE_INSERT: &str = "
    INSERT INTO artists
    SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
    FROM staging_songs;
";

pub(super) const TIME_TABLE_INSERT: &str = "
    INSERT INTO time
    SELECT DISTINCT
        start_time,
        CAST(strftime('%H', start_time) AS INTEGER) AS hour,
        CAST(strftime('%d', start_time) AS INTEGER) AS day,
        (CAST(strftime('%j', date(start_time, '-3 days', 'weekday 4')) AS INTEGER) - 1) / 7 + 1 AS week,
        CAST(strftime('%m', start_time) AS INTEGER) AS month,
        CAST(strftime('%Y', start_time) AS INTEGER) AS year,
        CAST(strftime('%w', start_time) AS INTEGER) AS weekday
    FROM songplays;
";
