// Copy and insert statements as they run on the Redshift cluster.
// The `{...}` placeholders of the copy template are filled with quoted literals.

pub(super) const STAGING_COPY: &str = "
    COPY {table}
    FROM {source}
    CREDENTIALS {credentials}
    JSON {format}
    COMPUPDATE OFF
    REGION {region}
";

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
    (SELECT DISTINCT
        (SELECT TIMESTAMP 'epoch' + e.ts * INTERVAL '1 second') AS start_time,
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
    WHERE e.page = 'NextSong');
";

pub(super) const USER_TABLE_INSERT: &str = "
    INSERT INTO users (
    SELECT DISTINCT user_id, first_name, last_name, gender, level
    FROM staging_events
    WHERE page = 'NextSong');
";

pub(super) const SONG_TABLE_INSERT: &str = "
    INSERT INTO songs (
    SELECT DISTINCT song_id, title, artist_id, year, duration
    FROM staging_songs);
";

pub(super) const ARTIST_TABLE_INSERT: &str = "
    INSERT INTO artists (
    SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
    FROM staging_songs);
";

pub(super) const TIME_TABLE_INSERT: &str = "
    INSERT INTO time (
    SELECT DISTINCT
        start_time,
        EXTRACT(HOUR FROM start_time) AS hour,
        EXTRACT(DAY FROM start_time) AS day,
        EXTRACT(WEEK FROM start_time) AS week,
        EXTRACT(MONTH FROM start_time) AS month,
        EXTRACT(YEAR FROM start_time) AS year,
        EXTRACT(WEEKDAY FROM start_time) AS weekday
    FROM songplays);
";
