//! SQLite schema definitions
//!
//! `SCHEMA` is always the full current schema; older databases are brought
//! up to `SCHEMA_VERSION` by the incremental migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'PARTICIPANT' CHECK(role IN ('ADMIN', 'ORGANIZER', 'PARTICIPANT')),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Organizers and competitions (referenced by events and races)
-- =============================================================================
CREATE TABLE IF NOT EXISTS organizers (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    contact_email TEXT,
    contact_phone TEXT,
    website TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS competitions (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    description TEXT,
    created_at INTEGER NOT NULL
);

-- =============================================================================
-- 3. Race events
-- =============================================================================
CREATE TABLE IF NOT EXISTS race_events (
    id TEXT PRIMARY KEY,
    event_name TEXT NOT NULL CHECK(length(event_name) >= 1),
    slug TEXT NOT NULL UNIQUE,
    description TEXT,
    main_image TEXT,
    gallery TEXT NOT NULL DEFAULT '[]',
    organizer_id TEXT REFERENCES organizers(id) ON DELETE SET NULL,
    contact_phone TEXT,
    contact_email TEXT,
    organizer_site TEXT,
    registration_site TEXT,
    social_media TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_race_events_created ON race_events(created_at);
CREATE INDEX IF NOT EXISTS idx_race_events_organizer ON race_events(organizer_id);

-- =============================================================================
-- 4. Races (children of race events)
-- =============================================================================
CREATE TABLE IF NOT EXISTS races (
    id TEXT PRIMARY KEY,
    race_event_id TEXT NOT NULL REFERENCES race_events(id) ON DELETE CASCADE,
    name TEXT,
    elevation REAL,
    length REAL NOT NULL,
    start_location TEXT,
    start_date_time INTEGER NOT NULL,
    end_date_time INTEGER,
    gps_file TEXT,
    competition_id TEXT REFERENCES competitions(id) ON DELETE SET NULL,
    CHECK(end_date_time IS NULL OR end_date_time > start_date_time)
);

CREATE INDEX IF NOT EXISTS idx_races_event ON races(race_event_id);
CREATE INDEX IF NOT EXISTS idx_races_start ON races(start_date_time);
CREATE INDEX IF NOT EXISTS idx_races_competition ON races(competition_id);

-- =============================================================================
-- 5. Timing: participants, checkpoints, timing records
-- =============================================================================
CREATE TABLE IF NOT EXISTS participants (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    rfid_tag TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS checkpoints (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    location TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS timings (
    id TEXT PRIMARY KEY,
    participant_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    checkpoint_id TEXT NOT NULL REFERENCES checkpoints(id) ON DELETE CASCADE,
    race_id TEXT NOT NULL REFERENCES races(id) ON DELETE CASCADE,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_timings_race ON timings(race_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_timings_participant ON timings(participant_id);
"#;
