//! v001 -- Initial schema creation.
//!
//! Creates the five core tables: `users`, `sessions`, `boards`,
//! `feedback_items` and `votes`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users (board owners)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    email         TEXT NOT NULL UNIQUE,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,              -- argon2 PHC string
    created_at    TEXT NOT NULL               -- RFC-3339, UTC
);

-- ----------------------------------------------------------------
-- Login sessions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY NOT NULL,     -- BLAKE3 hex of the bearer token
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

-- ----------------------------------------------------------------
-- Boards
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS boards (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    owner_id     TEXT NOT NULL,
    name         TEXT NOT NULL,
    slug         TEXT NOT NULL UNIQUE,
    description  TEXT NOT NULL DEFAULT '',
    accent_color TEXT NOT NULL DEFAULT '#4F46E5',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,

    FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_boards_owner ON boards(owner_id, created_at DESC);

-- ----------------------------------------------------------------
-- Feedback items
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS feedback_items (
    id           TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    board_id     TEXT NOT NULL,
    title        TEXT NOT NULL CHECK (length(title) > 0),
    description  TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL DEFAULT 'open',
    category     TEXT NOT NULL DEFAULT 'feature',
    vote_count   INTEGER NOT NULL DEFAULT 0 CHECK (vote_count >= 0),
    author_email TEXT,
    author_name  TEXT NOT NULL DEFAULT 'Anonymous',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,

    FOREIGN KEY (board_id) REFERENCES boards(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_feedback_board ON feedback_items(board_id);

-- ----------------------------------------------------------------
-- Votes (one per item and voter)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS votes (
    id               TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    feedback_item_id TEXT NOT NULL,
    voter_id         TEXT NOT NULL,               -- voter cookie or user id
    voter_email      TEXT,
    created_at       TEXT NOT NULL,

    FOREIGN KEY (feedback_item_id) REFERENCES feedback_items(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_unique ON votes(feedback_item_id, voter_id);
CREATE INDEX IF NOT EXISTS idx_votes_voter ON votes(voter_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
