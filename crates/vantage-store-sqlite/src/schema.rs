//! SQL schema for the Vantage SQLite store.
//!
//! Executed once at connection startup. There are no migrations; every
//! statement is create-if-absent.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per physical property. Ownership-dataset rows have no UPRN and are
-- keyed 'TITLE:<title number>'.
CREATE TABLE IF NOT EXISTS properties (
    uprn          TEXT PRIMARY KEY,
    address       TEXT NOT NULL,
    postcode      TEXT,
    title_number  TEXT,            -- the linkage edge; NULL until linked
    latitude      REAL,
    longitude     REAL
);

CREATE TABLE IF NOT EXISTS energy_assessments (
    certificate_id   TEXT PRIMARY KEY,
    uprn             TEXT NOT NULL,
    rating_band      TEXT NOT NULL,  -- 'A'..'G'
    floor_area       REAL,           -- square metres
    property_type    TEXT,
    inspection_date  TEXT,           -- YYYY-MM-DD
    is_latest        INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS companies (
    company_number         TEXT PRIMARY KEY,
    name                   TEXT NOT NULL,
    status                 TEXT,
    incorporation_country  TEXT,
    category               TEXT,
    registry_number        TEXT
);

CREATE TABLE IF NOT EXISTS ownership_titles (
    title_number        TEXT PRIMARY KEY,
    company_number      TEXT,
    proprietor_name     TEXT,
    proprietor_address  TEXT,
    registered_on       TEXT,
    price_paid          INTEGER
);

-- Registry side tables; replaced wholesale on each enrichment.
CREATE TABLE IF NOT EXISTS company_officers (
    company_number  TEXT NOT NULL REFERENCES companies(company_number),
    position        INTEGER NOT NULL,
    name            TEXT NOT NULL,
    role            TEXT,
    appointed_on    TEXT,
    resigned_on     TEXT,
    PRIMARY KEY (company_number, position)
);

CREATE TABLE IF NOT EXISTS company_controllers (
    company_number      TEXT NOT NULL REFERENCES companies(company_number),
    position            INTEGER NOT NULL,
    name                TEXT NOT NULL,
    kind                TEXT,
    natures_of_control  TEXT NOT NULL DEFAULT '[]',  -- JSON array
    notified_on         TEXT,
    PRIMARY KEY (company_number, position)
);

CREATE TABLE IF NOT EXISTS company_charges (
    company_number    TEXT NOT NULL REFERENCES companies(company_number),
    charge_id         TEXT NOT NULL,
    status            TEXT,
    created_on        TEXT,
    persons_entitled  TEXT NOT NULL DEFAULT '[]',    -- JSON array
    description       TEXT,
    PRIMARY KEY (company_number, charge_id)
);

CREATE TABLE IF NOT EXISTS sale_transactions (
    transaction_id  TEXT PRIMARY KEY,
    price_paid      INTEGER NOT NULL,
    transfer_date   TEXT NOT NULL,
    postcode        TEXT NOT NULL,
    full_address    TEXT NOT NULL,
    property_type   TEXT
);

CREATE TABLE IF NOT EXISTS postcode_index (
    postcode       TEXT PRIMARY KEY,
    eastings       INTEGER NOT NULL,
    northings      INTEGER NOT NULL,
    latitude       REAL NOT NULL,
    longitude      REAL NOT NULL,
    district_code  TEXT
);

CREATE INDEX IF NOT EXISTS properties_postcode_idx  ON properties(postcode);
CREATE INDEX IF NOT EXISTS properties_title_idx     ON properties(title_number);
CREATE INDEX IF NOT EXISTS assessments_uprn_idx     ON energy_assessments(uprn);
CREATE INDEX IF NOT EXISTS assessments_band_idx     ON energy_assessments(rating_band);
CREATE INDEX IF NOT EXISTS titles_company_idx       ON ownership_titles(company_number);
CREATE INDEX IF NOT EXISTS sales_postcode_date_idx  ON sale_transactions(postcode, transfer_date);

PRAGMA user_version = 1;
";
