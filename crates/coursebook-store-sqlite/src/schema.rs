//! SQL schema for the course-booking SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS courses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS course_dates (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id   INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    date        TEXT    NOT NULL,   -- YYYY-MM-DD
    hour_start  TEXT,               -- HH:MM
    hour_end    TEXT
);

CREATE TABLE IF NOT EXISTS degrees (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL,
    degree_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS course_groups (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id      INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    course_date_id INTEGER NOT NULL REFERENCES course_dates(id) ON DELETE CASCADE,
    degree_id      INTEGER NOT NULL REFERENCES degrees(id)
);

-- No position column: a subgroup's position is its id rank within its group.
CREATE TABLE IF NOT EXISTS course_subgroups (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    course_id        INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    course_date_id   INTEGER NOT NULL REFERENCES course_dates(id) ON DELETE CASCADE,
    course_group_id  INTEGER NOT NULL REFERENCES course_groups(id) ON DELETE CASCADE,
    degree_id        INTEGER NOT NULL REFERENCES degrees(id),
    max_participants INTEGER             -- NULL = unlimited
);

CREATE TABLE IF NOT EXISTS clients (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    email      TEXT
);

-- The row rewritten by a client transfer.
CREATE TABLE IF NOT EXISTS booking_users (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id          INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
    course_id          INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
    course_date_id     INTEGER NOT NULL REFERENCES course_dates(id) ON DELETE CASCADE,
    course_group_id    INTEGER NOT NULL REFERENCES course_groups(id),
    course_subgroup_id INTEGER NOT NULL REFERENCES course_subgroups(id),
    degree_id          INTEGER NOT NULL REFERENCES degrees(id)
);

CREATE INDEX IF NOT EXISTS course_dates_course_idx     ON course_dates(course_id);
CREATE INDEX IF NOT EXISTS course_groups_date_idx      ON course_groups(course_date_id, degree_id);
CREATE INDEX IF NOT EXISTS course_subgroups_group_idx  ON course_subgroups(course_group_id);
CREATE INDEX IF NOT EXISTS booking_users_date_client_idx
    ON booking_users(course_date_id, client_id);
CREATE INDEX IF NOT EXISTS booking_users_subgroup_idx  ON booking_users(course_subgroup_id);

-- A subgroup repeats its group's course, date and degree.
CREATE TRIGGER IF NOT EXISTS course_subgroups_chain_insert
BEFORE INSERT ON course_subgroups
WHEN NOT EXISTS (
    SELECT 1 FROM course_groups g
     WHERE g.id = NEW.course_group_id
       AND g.course_id = NEW.course_id
       AND g.course_date_id = NEW.course_date_id
       AND g.degree_id = NEW.degree_id
)
BEGIN
    SELECT RAISE(ABORT, 'subgroup does not match its group');
END;

CREATE TRIGGER IF NOT EXISTS course_subgroups_chain_update
BEFORE UPDATE OF course_id, course_date_id, course_group_id, degree_id ON course_subgroups
WHEN NOT EXISTS (
    SELECT 1 FROM course_groups g
     WHERE g.id = NEW.course_group_id
       AND g.course_id = NEW.course_id
       AND g.course_date_id = NEW.course_date_id
       AND g.degree_id = NEW.degree_id
)
BEGIN
    SELECT RAISE(ABORT, 'subgroup does not match its group');
END;

CREATE TRIGGER IF NOT EXISTS course_subgroups_booked_chain
BEFORE UPDATE OF course_group_id, degree_id ON course_subgroups
WHEN (NEW.course_group_id IS NOT OLD.course_group_id OR NEW.degree_id IS NOT OLD.degree_id)
 AND EXISTS (SELECT 1 FROM booking_users b WHERE b.course_subgroup_id = OLD.id)
BEGIN
    SELECT RAISE(ABORT, 'subgroup has bookings; move them first');
END;

CREATE TRIGGER IF NOT EXISTS course_groups_chain_update
BEFORE UPDATE OF course_id, course_date_id, degree_id ON course_groups
WHEN (NEW.course_id IS NOT OLD.course_id
      OR NEW.course_date_id IS NOT OLD.course_date_id
      OR NEW.degree_id IS NOT OLD.degree_id)
 AND EXISTS (SELECT 1 FROM course_subgroups s WHERE s.course_group_id = OLD.id)
BEGIN
    SELECT RAISE(ABORT, 'group has subgroups');
END;

-- A booking's (subgroup, group, degree) triple always names one chain.
CREATE TRIGGER IF NOT EXISTS booking_users_chain_insert
BEFORE INSERT ON booking_users
WHEN NOT EXISTS (
    SELECT 1 FROM course_subgroups s
     WHERE s.id = NEW.course_subgroup_id
       AND s.course_group_id = NEW.course_group_id
       AND s.degree_id = NEW.degree_id
)
BEGIN
    SELECT RAISE(ABORT, 'booking does not match its subgroup');
END;

CREATE TRIGGER IF NOT EXISTS booking_users_chain_update
BEFORE UPDATE OF course_subgroup_id, course_group_id, degree_id ON booking_users
WHEN NOT EXISTS (
    SELECT 1 FROM course_subgroups s
     WHERE s.id = NEW.course_subgroup_id
       AND s.course_group_id = NEW.course_group_id
       AND s.degree_id = NEW.degree_id
)
BEGIN
    SELECT RAISE(ABORT, 'booking does not match its subgroup');
END;

PRAGMA user_version = 1;
";
