//! [`SqliteStore`]: the SQLite implementation of [`PropertyStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use vantage_core::{
  model::{
    AreaCandidate, Charge, CompanyStructure, CompanyUpdate, CorporateEntity, DistressedAsset,
    EnergyAssessment, EnrichmentTarget, LinkTarget, OwnershipTitle, PostcodeLocation, Property,
    RatingBand, STATUS_NOT_FOUND, SaleTransaction, TITLE_REF_PREFIX, TitleCandidate,
    UNKNOWN_COUNTRY,
  },
  store::PropertyStore,
};

use crate::{
  Result,
  encode::{
    RawCharge, RawController, RawDistressed, RawLinkTarget, RawOfficer, RawSale, RawTitle,
    company_from_row, encode_date, encode_list,
  },
  schema::SCHEMA,
};

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

/// `'F', 'G'` for use in an `IN (...)` clause.
fn distressed_bands_sql() -> String {
  RatingBand::DISTRESSED
    .iter()
    .map(|b| format!("'{b}'"))
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The property graph backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and throwaway runs.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PropertyStore impl ──────────────────────────────────────────────────────

impl PropertyStore for SqliteStore {
  type Error = crate::Error;

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn insert_properties(&self, rows: Vec<Property>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO properties
               (uprn, address, postcode, title_number, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for p in &rows {
            inserted += stmt.execute(rusqlite::params![
              p.uprn,
              p.address,
              p.postcode,
              p.title_number,
              p.latitude,
              p.longitude,
            ])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  async fn upsert_assessments(&self, rows: Vec<EnergyAssessment>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO energy_assessments
               (certificate_id, uprn, rating_band, floor_area, property_type,
                inspection_date, is_latest)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(certificate_id) DO UPDATE SET
               uprn            = excluded.uprn,
               rating_band     = excluded.rating_band,
               floor_area      = excluded.floor_area,
               property_type   = excluded.property_type,
               inspection_date = excluded.inspection_date,
               is_latest       = excluded.is_latest",
          )?;
          for a in &rows {
            written += stmt.execute(rusqlite::params![
              a.certificate_id,
              a.uprn,
              a.rating_band.as_str(),
              a.floor_area,
              a.property_type,
              a.inspection_date.map(encode_date),
              a.is_latest,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  async fn insert_companies(&self, rows: Vec<CorporateEntity>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO companies
               (company_number, name, status, incorporation_country, category, registry_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for c in &rows {
            inserted += stmt.execute(rusqlite::params![
              c.company_number,
              c.name,
              c.status,
              c.incorporation_country,
              c.category,
              c.registry_number,
            ])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;
    Ok(inserted)
  }

  async fn upsert_titles(&self, rows: Vec<OwnershipTitle>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO ownership_titles
               (title_number, company_number, proprietor_name, proprietor_address,
                registered_on, price_paid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(title_number) DO UPDATE SET
               company_number     = excluded.company_number,
               proprietor_name    = excluded.proprietor_name,
               proprietor_address = excluded.proprietor_address,
               registered_on      = excluded.registered_on,
               price_paid         = excluded.price_paid",
          )?;
          for t in &rows {
            written += stmt.execute(rusqlite::params![
              t.title_number,
              t.company_number,
              t.proprietor_name,
              t.proprietor_address,
              t.registered_on.map(encode_date),
              t.price_paid,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  async fn upsert_sales(&self, rows: Vec<SaleTransaction>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO sale_transactions
               (transaction_id, price_paid, transfer_date, postcode, full_address, property_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(transaction_id) DO UPDATE SET
               price_paid    = excluded.price_paid,
               transfer_date = excluded.transfer_date,
               postcode      = excluded.postcode,
               full_address  = excluded.full_address,
               property_type = excluded.property_type",
          )?;
          for s in &rows {
            written += stmt.execute(rusqlite::params![
              s.transaction_id,
              s.price_paid,
              encode_date(s.transfer_date),
              s.postcode,
              s.full_address,
              s.property_type,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  async fn upsert_postcodes(&self, rows: Vec<PostcodeLocation>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO postcode_index
               (postcode, eastings, northings, latitude, longitude, district_code)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(postcode) DO UPDATE SET
               eastings      = excluded.eastings,
               northings     = excluded.northings,
               latitude      = excluded.latitude,
               longitude     = excluded.longitude,
               district_code = excluded.district_code",
          )?;
          for pc in &rows {
            written += stmt.execute(rusqlite::params![
              pc.postcode,
              pc.eastings,
              pc.northings,
              pc.latitude,
              pc.longitude,
              pc.district_code,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }

  async fn geocode_properties(&self) -> Result<usize> {
    let updated = self
      .conn
      .call(|conn| {
        Ok(conn.execute(
          "UPDATE properties
           SET latitude  = (SELECT pc.latitude  FROM postcode_index pc
                            WHERE pc.postcode = properties.postcode),
               longitude = (SELECT pc.longitude FROM postcode_index pc
                            WHERE pc.postcode = properties.postcode)
           WHERE latitude IS NULL
             AND postcode IN (SELECT postcode FROM postcode_index)",
          [],
        )?)
      })
      .await?;
    Ok(updated)
  }

  // ── Linkage ───────────────────────────────────────────────────────────────

  async fn unlinked_distressed_targets(&self, limit: usize) -> Result<Vec<LinkTarget>> {
    let limit = sql_limit(limit);
    let bands = distressed_bands_sql();

    let raws: Vec<RawLinkTarget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT p.uprn, p.address, p.postcode, MAX(e.rating_band)
           FROM properties p
           JOIN energy_assessments e ON e.uprn = p.uprn
           WHERE e.rating_band IN ({bands})
             AND p.postcode IS NOT NULL AND p.postcode != ''
             AND p.address != ''
             AND (p.title_number IS NULL OR p.title_number = '')
           GROUP BY p.uprn
           ORDER BY p.uprn
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawLinkTarget {
              uprn:        row.get(0)?,
              address:     row.get(1)?,
              postcode:    row.get(2)?,
              rating_band: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLinkTarget::into_target).collect()
  }

  async fn title_candidates(&self, postcode: &str, limit: usize) -> Result<Vec<TitleCandidate>> {
    let postcode = postcode.to_owned();
    let limit = sql_limit(limit);
    let stub_pattern = format!("{TITLE_REF_PREFIX}%");

    let candidates = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT uprn, address, title_number
           FROM properties
           WHERE postcode = ?1
             AND uprn LIKE ?3
             AND title_number IS NOT NULL AND title_number != ''
           ORDER BY uprn
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![postcode, limit, stub_pattern], |row| {
            Ok(TitleCandidate {
              uprn:         row.get(0)?,
              address:      row.get(1)?,
              title_number: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(candidates)
  }

  async fn link_title(&self, uprn: &str, title_number: &str) -> Result<bool> {
    let uprn = uprn.to_owned();
    let title_number = title_number.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE properties
           SET title_number = ?1
           WHERE uprn = ?2
             AND (title_number IS NULL OR title_number = '')",
          rusqlite::params![title_number, uprn],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  // ── Valuation ─────────────────────────────────────────────────────────────

  async fn recent_sales(&self, postcode: &str, limit: usize) -> Result<Vec<SaleTransaction>> {
    let postcode = postcode.to_owned();
    let limit = sql_limit(limit);

    let raws: Vec<RawSale> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT transaction_id, price_paid, transfer_date, postcode, full_address, property_type
           FROM sale_transactions
           WHERE postcode = ?1
           ORDER BY transfer_date DESC, transaction_id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![postcode, limit], |row| {
            Ok(RawSale {
              transaction_id: row.get(0)?,
              price_paid:     row.get(1)?,
              transfer_date:  row.get(2)?,
              postcode:       row.get(3)?,
              full_address:   row.get(4)?,
              property_type:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSale::into_sale).collect()
  }

  async fn area_candidates(&self, postcode: &str) -> Result<Vec<AreaCandidate>> {
    let postcode = postcode.to_owned();

    let candidates = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT e.certificate_id, e.uprn, p.address, e.floor_area
           FROM energy_assessments e
           JOIN properties p ON p.uprn = e.uprn
           WHERE p.postcode = ?1
           ORDER BY e.certificate_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![postcode], |row| {
            Ok(AreaCandidate {
              certificate_id: row.get(0)?,
              uprn:           row.get(1)?,
              address:        row.get(2)?,
              floor_area:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(candidates)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_property(&self, uprn: &str) -> Result<Option<Property>> {
    let uprn = uprn.to_owned();

    let property = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT uprn, address, postcode, title_number, latitude, longitude
               FROM properties WHERE uprn = ?1",
              rusqlite::params![uprn],
              property_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(property)
  }

  async fn search_properties(&self, text: &str, limit: usize) -> Result<Vec<Property>> {
    let text = text.to_owned();
    let limit = sql_limit(limit);

    let properties = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT uprn, address, postcode, title_number, latitude, longitude
           FROM properties
           WHERE instr(upper(address), upper(?1)) > 0
           ORDER BY uprn
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![text, limit], property_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(properties)
  }

  async fn distressed_assets(&self, limit: usize) -> Result<Vec<DistressedAsset>> {
    let limit = sql_limit(limit);
    let bands = distressed_bands_sql();

    let raws: Vec<RawDistressed> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT p.uprn, p.address, p.postcode, e.rating_band, e.property_type,
                  o.title_number, o.proprietor_name, o.registered_on,
                  c.company_number, c.name, c.incorporation_country
           FROM properties p
           JOIN energy_assessments e      ON e.uprn = p.uprn
           LEFT JOIN ownership_titles o   ON o.title_number = p.title_number
           LEFT JOIN companies c          ON c.company_number = o.company_number
           WHERE e.rating_band IN ({bands})
           ORDER BY e.rating_band DESC, o.registered_on DESC, p.uprn
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawDistressed {
              uprn:                  row.get(0)?,
              address:               row.get(1)?,
              postcode:              row.get(2)?,
              rating_band:           row.get(3)?,
              property_type:         row.get(4)?,
              title_number:          row.get(5)?,
              proprietor_name:       row.get(6)?,
              registered_on:         row.get(7)?,
              company_number:        row.get(8)?,
              company_name:          row.get(9)?,
              incorporation_country: row.get(10)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDistressed::into_asset).collect()
  }

  async fn get_company(&self, company_number: &str) -> Result<Option<CorporateEntity>> {
    let company_number = company_number.to_owned();

    let company = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT company_number, name, status, incorporation_country, category,
                      registry_number
               FROM companies WHERE company_number = ?1",
              rusqlite::params![company_number],
              company_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(company)
  }

  async fn company_structure(&self, company_number: &str) -> Result<Option<CompanyStructure>> {
    let Some(company) = self.get_company(company_number).await? else {
      return Ok(None);
    };
    let number = company_number.to_owned();

    let (officers, controllers, titles): (Vec<RawOfficer>, Vec<RawController>, Vec<RawTitle>) =
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(
            "SELECT name, role, appointed_on, resigned_on
             FROM company_officers WHERE company_number = ?1
             ORDER BY position",
          )?;
          let officers = stmt
            .query_map(rusqlite::params![number], |row| {
              Ok(RawOfficer {
                name:         row.get(0)?,
                role:         row.get(1)?,
                appointed_on: row.get(2)?,
                resigned_on:  row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(
            "SELECT name, kind, natures_of_control, notified_on
             FROM company_controllers WHERE company_number = ?1
             ORDER BY position",
          )?;
          let controllers = stmt
            .query_map(rusqlite::params![number], |row| {
              Ok(RawController {
                name:               row.get(0)?,
                kind:               row.get(1)?,
                natures_of_control: row.get(2)?,
                notified_on:        row.get(3)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          let mut stmt = conn.prepare(
            "SELECT title_number, company_number, proprietor_name, proprietor_address,
                    registered_on, price_paid
             FROM ownership_titles WHERE company_number = ?1
             ORDER BY title_number",
          )?;
          let titles = stmt
            .query_map(rusqlite::params![number], |row| {
              Ok(RawTitle {
                title_number:       row.get(0)?,
                company_number:     row.get(1)?,
                proprietor_name:    row.get(2)?,
                proprietor_address: row.get(3)?,
                registered_on:      row.get(4)?,
                price_paid:         row.get(5)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

          Ok((officers, controllers, titles))
        })
        .await?;

    Ok(Some(CompanyStructure {
      company,
      officers: officers
        .into_iter()
        .map(RawOfficer::into_officer)
        .collect::<Result<_>>()?,
      controllers: controllers
        .into_iter()
        .map(RawController::into_controller)
        .collect::<Result<_>>()?,
      titles: titles
        .into_iter()
        .map(RawTitle::into_title)
        .collect::<Result<_>>()?,
    }))
  }

  async fn company_charges(&self, company_number: &str) -> Result<Option<Vec<Charge>>> {
    if self.get_company(company_number).await?.is_none() {
      return Ok(None);
    }
    let number = company_number.to_owned();

    let raws: Vec<RawCharge> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT charge_id, status, created_on, persons_entitled, description
           FROM company_charges WHERE company_number = ?1
           ORDER BY created_on DESC, charge_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![number], |row| {
            Ok(RawCharge {
              charge_id:        row.get(0)?,
              status:           row.get(1)?,
              created_on:       row.get(2)?,
              persons_entitled: row.get(3)?,
              description:      row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let charges = raws
      .into_iter()
      .map(RawCharge::into_charge)
      .collect::<Result<_>>()?;
    Ok(Some(charges))
  }

  // ── Owner enrichment ──────────────────────────────────────────────────────

  async fn enrichment_targets(&self, limit: usize) -> Result<Vec<EnrichmentTarget>> {
    let limit = sql_limit(limit);
    let bands = distressed_bands_sql();

    let targets = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT c.company_number, c.name
           FROM companies c
           JOIN ownership_titles o   ON o.company_number = c.company_number
           JOIN properties p         ON p.title_number = o.title_number
           JOIN energy_assessments e ON e.uprn = p.uprn
           WHERE e.rating_band IN ({bands})
             AND (c.status IS NULL OR c.incorporation_country = ?2)
             AND c.status IS NOT ?3
           ORDER BY c.company_number
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, UNKNOWN_COUNTRY, STATUS_NOT_FOUND], |row| {
            Ok(EnrichmentTarget {
              company_number: row.get(0)?,
              name:           row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(targets)
  }

  async fn record_registry_miss(&self, company_number: &str) -> Result<bool> {
    let number = company_number.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE companies SET status = ?2 WHERE company_number = ?1",
          rusqlite::params![number, STATUS_NOT_FOUND],
        )?)
      })
      .await?;
    Ok(changed == 1)
  }

  async fn apply_company_update(&self, company_number: &str, update: CompanyUpdate) -> Result<bool> {
    let number = company_number.to_owned();

    // Encode list columns before entering the connection thread.
    let controllers = update
      .controllers
      .iter()
      .map(|c| Ok((c.clone(), encode_list(&c.natures_of_control)?)))
      .collect::<Result<Vec<_>>>()?;
    let charges = update
      .charges
      .iter()
      .map(|c| Ok((c.clone(), encode_list(&c.persons_entitled)?)))
      .collect::<Result<Vec<_>>>()?;
    let CompanyUpdate {
      official_name,
      status,
      incorporation_country,
      registry_number,
      officers,
      ..
    } = update;

    let applied = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE companies
           SET name                  = COALESCE(?2, name),
               status                = COALESCE(?3, status),
               incorporation_country = COALESCE(?4, incorporation_country),
               registry_number       = COALESCE(?5, registry_number)
           WHERE company_number = ?1",
          rusqlite::params![number, official_name, status, incorporation_country, registry_number],
        )?;
        if changed == 0 {
          return Ok(false);
        }

        for table in ["company_officers", "company_controllers", "company_charges"] {
          tx.execute(
            &format!("DELETE FROM {table} WHERE company_number = ?1"),
            rusqlite::params![number],
          )?;
        }

        {
          let mut stmt = tx.prepare(
            "INSERT INTO company_officers
               (company_number, position, name, role, appointed_on, resigned_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (position, o) in officers.iter().enumerate() {
            stmt.execute(rusqlite::params![
              number,
              position as i64,
              o.name,
              o.role,
              o.appointed_on.map(encode_date),
              o.resigned_on.map(encode_date),
            ])?;
          }

          let mut stmt = tx.prepare(
            "INSERT INTO company_controllers
               (company_number, position, name, kind, natures_of_control, notified_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (position, (c, natures)) in controllers.iter().enumerate() {
            stmt.execute(rusqlite::params![
              number,
              position as i64,
              c.name,
              c.kind,
              natures,
              c.notified_on.map(encode_date),
            ])?;
          }

          let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO company_charges
               (company_number, charge_id, status, created_on, persons_entitled, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (c, entitled) in &charges {
            stmt.execute(rusqlite::params![
              number,
              c.charge_id,
              c.status,
              c.created_on.map(encode_date),
              entitled,
              c.description,
            ])?;
          }
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(applied)
  }
}

fn property_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Property> {
  Ok(Property {
    uprn:         row.get(0)?,
    address:      row.get(1)?,
    postcode:     row.get(2)?,
    title_number: row.get(3)?,
    latitude:     row.get(4)?,
    longitude:    row.get(5)?,
  })
}
