//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use vantage_core::{
  linkage::{BatchLinker, LinkerConfig},
  model::{
    Charge, CompanyUpdate, Controller, CorporateEntity, EnergyAssessment, Officer, OwnershipTitle,
    PostcodeLocation, Property, RatingBand, SaleTransaction,
  },
  store::PropertyStore,
  valuation::{ValuationConfig, comparable_sales},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn assessment(uprn: &str, band: RatingBand, area: Option<f64>) -> EnergyAssessment {
  EnergyAssessment {
    certificate_id:  format!("CERT-{uprn}"),
    uprn:            uprn.into(),
    rating_band:     band,
    floor_area:      area,
    property_type:   Some("Flat".into()),
    inspection_date: Some(date(2022, 6, 1)),
    is_latest:       true,
  }
}

async fn seed_distressed(s: &SqliteStore, uprn: &str, address: &str, postcode: &str) {
  s.insert_properties(vec![Property::stub(uprn, address, Some(postcode.into()))])
    .await
    .unwrap();
  s.upsert_assessments(vec![assessment(uprn, RatingBand::G, Some(40.0))])
    .await
    .unwrap();
}

async fn seed_title(s: &SqliteStore, title: &str, address: &str, postcode: &str) {
  s.insert_properties(vec![Property::for_title(title, address, Some(postcode.into()))])
    .await
    .unwrap();
}

fn company(number: &str, name: &str) -> CorporateEntity {
  CorporateEntity {
    company_number:        number.into(),
    name:                  name.into(),
    status:                None,
    incorporation_country: Some("Unknown".into()),
    category:              Some("Limited Company or Public Limited Company".into()),
    registry_number:       None,
  }
}

fn title(number: &str, company: &str, registered: NaiveDate) -> OwnershipTitle {
  OwnershipTitle {
    title_number:       number.into(),
    company_number:     Some(company.into()),
    proprietor_name:    Some("ACME PROPERTIES LTD".into()),
    proprietor_address: Some("1 CITY ROAD, LONDON".into()),
    registered_on:      Some(registered),
    price_paid:         Some(450_000),
  }
}

// ─── Ingestion semantics ─────────────────────────────────────────────────────

#[tokio::test]
async fn property_insert_is_insert_if_absent() {
  let s = store().await;
  let first = s
    .insert_properties(vec![Property::stub("1", "1 HIGH ST", Some("E1 1BY".into()))])
    .await
    .unwrap();
  assert_eq!(first, 1);

  assert!(s.link_title("1", "EGL1").await.unwrap());

  // A later ingest of the same UPRN must not clobber the link.
  let again = s
    .insert_properties(vec![Property::stub("1", "ONE HIGH STREET", Some("E1 1BY".into()))])
    .await
    .unwrap();
  assert_eq!(again, 0);

  let p = s.get_property("1").await.unwrap().unwrap();
  assert_eq!(p.address, "1 HIGH ST");
  assert_eq!(p.title_number.as_deref(), Some("EGL1"));
}

#[tokio::test]
async fn assessments_upsert_by_certificate() {
  let s = store().await;
  seed_distressed(&s, "1", "1 HIGH ST", "E1 1BY").await;
  s.upsert_assessments(vec![assessment("1", RatingBand::C, Some(55.0))])
    .await
    .unwrap();

  // Re-rated out of the distressed bands: no longer a target.
  let targets = s.unlinked_distressed_targets(10).await.unwrap();
  assert!(targets.is_empty());
}

#[tokio::test]
async fn companies_keep_enrichment_across_reingest() {
  let s = store().await;
  s.insert_companies(vec![company("OC1", "ACME PROPERTIES LTD")])
    .await
    .unwrap();
  s.apply_company_update("OC1", CompanyUpdate {
    status: Some("active".into()),
    ..Default::default()
  })
  .await
  .unwrap();

  let inserted = s
    .insert_companies(vec![company("OC1", "ACME PROPERTIES LTD")])
    .await
    .unwrap();
  assert_eq!(inserted, 0);
  let c = s.get_company("OC1").await.unwrap().unwrap();
  assert_eq!(c.status.as_deref(), Some("active"));
}

#[tokio::test]
async fn geocode_fills_missing_coordinates_from_postcode_index() {
  let s = store().await;
  s.insert_properties(vec![
    Property::stub("1", "1 HIGH ST", Some("E1 1BY".into())),
    Property::stub("2", "2 NOWHERE", Some("ZZ9 9ZZ".into())),
  ])
  .await
  .unwrap();
  s.upsert_postcodes(vec![PostcodeLocation {
    postcode:      "E1 1BY".into(),
    eastings:      533_500,
    northings:     181_500,
    latitude:      51.5167,
    longitude:     -0.0774,
    district_code: Some("E09000030".into()),
  }])
  .await
  .unwrap();

  assert_eq!(s.geocode_properties().await.unwrap(), 1);
  let p = s.get_property("1").await.unwrap().unwrap();
  assert_eq!(p.latitude, Some(51.5167));
  assert_eq!(s.get_property("2").await.unwrap().unwrap().latitude, None);

  // Already geocoded rows are left alone.
  assert_eq!(s.geocode_properties().await.unwrap(), 0);
}

// ─── Candidate fetching & the link write ─────────────────────────────────────

#[tokio::test]
async fn targets_exclude_linked_blank_and_postcodeless_rows() {
  let s = store().await;
  seed_distressed(&s, "1", "1 HIGH ST", "E1 1BY").await;
  seed_distressed(&s, "2", "", "E1 1BY").await;
  s.insert_properties(vec![Property::stub("3", "3 HIGH ST", None)])
    .await
    .unwrap();
  s.upsert_assessments(vec![assessment("3", RatingBand::F, None)])
    .await
    .unwrap();
  seed_distressed(&s, "4", "4 HIGH ST", "E1 1BY").await;
  s.link_title("4", "EGL4").await.unwrap();

  let targets = s.unlinked_distressed_targets(10).await.unwrap();
  let uprns: Vec<_> = targets.iter().map(|t| t.uprn.as_str()).collect();
  assert_eq!(uprns, ["1"]);
  assert_eq!(targets[0].rating_band, RatingBand::G);
}

#[tokio::test]
async fn title_candidates_block_on_exact_postcode() {
  let s = store().await;
  seed_title(&s, "EGL2", "2 HIGH ST", "E1 1BY").await;
  seed_title(&s, "EGL1", "1 HIGH ST", "E1 1BY").await;
  seed_title(&s, "NGL9", "1 HIGH ST", "E1 1BZ").await;
  seed_distressed(&s, "100", "3 HIGH ST", "E1 1BY").await;
  seed_distressed(&s, "101", "2 HIGH ST", "E1 1BY").await;
  s.link_title("101", "EGL2").await.unwrap();

  let candidates = s.title_candidates("E1 1BY", 500).await.unwrap();
  let titles: Vec<_> = candidates.iter().map(|c| c.title_number.as_str()).collect();
  assert_eq!(titles, ["EGL1", "EGL2"]);
}

#[tokio::test]
async fn link_write_only_succeeds_once() {
  let s = store().await;
  seed_distressed(&s, "1", "1 HIGH ST", "E1 1BY").await;

  assert!(s.link_title("1", "EGL1").await.unwrap());
  assert!(!s.link_title("1", "EGL2").await.unwrap());
  assert!(!s.link_title("missing", "EGL3").await.unwrap());

  let p = s.get_property("1").await.unwrap().unwrap();
  assert_eq!(p.title_number.as_deref(), Some("EGL1"));
}

// ─── End-to-end linkage ──────────────────────────────────────────────────────

#[tokio::test]
async fn punctuation_variant_is_linked() {
  let s = store().await;
  seed_distressed(&s, "100", "31 HIGH ST FLAT 2", "E1 1BY").await;
  seed_title(&s, "EGL1", "31, High St. Flat 2", "E1 1BY").await;

  let report = BatchLinker::new(&s, LinkerConfig::default())
    .run()
    .await
    .unwrap();

  assert_eq!((report.scanned, report.linked), (1, 1));
  let p = s.get_property("100").await.unwrap().unwrap();
  assert_eq!(p.title_number.as_deref(), Some("EGL1"));
}

#[tokio::test]
async fn postcode_without_titled_properties_links_nothing() {
  let s = store().await;
  seed_distressed(&s, "100", "31 HIGH ST FLAT 2", "E1 1BY").await;
  seed_distressed(&s, "101", "33 HIGH ST", "E1 1BY").await;

  let report = BatchLinker::new(&s, LinkerConfig::default())
    .run()
    .await
    .unwrap();

  assert_eq!(report.scanned, 2);
  assert_eq!(report.linked, 0);
  assert_eq!(report.no_candidates, 2);
  assert!(s.get_property("100").await.unwrap().unwrap().title_number.is_none());
}

#[tokio::test]
async fn second_linkage_run_is_a_no_op() {
  let s = store().await;
  seed_distressed(&s, "100", "31 HIGH ST FLAT 2", "E1 1BY").await;
  seed_distressed(&s, "101", "UNIT 7 DOCK YARD", "E1 1BY").await;
  seed_title(&s, "EGL1", "31 High Street, Flat 2", "E1 1BY").await;

  let linker = BatchLinker::new(&s, LinkerConfig::default());
  let first = linker.run().await.unwrap();
  let second = linker.run().await.unwrap();

  assert_eq!(first.linked, 1);
  assert_eq!(second.scanned, 1, "only the unmatched target is re-selected");
  assert_eq!(second.linked, 0);
}

#[tokio::test]
async fn second_run_does_not_link_through_a_linked_neighbour() {
  let s = store().await;
  seed_title(&s, "T1", "FLAT 2 31 HIGH STREET", "E1 1BY").await;
  seed_distressed(&s, "100", "FLAT 2A 31 HIGH STREET EAST WING", "E1 1BY").await;
  seed_distressed(&s, "200", "FLAT 2 31 HIGH STREET EAST", "E1 1BY").await;

  let linker = BatchLinker::new(&s, LinkerConfig::default());
  let first = linker.run().await.unwrap();
  let second = linker.run().await.unwrap();

  assert_eq!(first.linked, 1);
  assert_eq!(second.linked, 0);
  let p = s.get_property("100").await.unwrap().unwrap();
  assert!(p.title_number.is_none());
}

// ─── Valuation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn comparable_sales_price_per_square_foot() {
  let s = store().await;
  s.insert_properties(vec![
    Property::stub("1", "FLAT 1, 31 HIGH STREET", Some("E1 1BY".into())),
    Property::stub("2", "FLAT 2, 31 HIGH STREET", Some("E1 1BY".into())),
  ])
  .await
  .unwrap();
  s.upsert_assessments(vec![
    assessment("1", RatingBand::D, Some(27.87)),
    assessment("2", RatingBand::D, Some(55.74)),
  ])
  .await
  .unwrap();
  s.upsert_sales(vec![
    SaleTransaction {
      transaction_id: "{A}".into(),
      price_paid:     300_000,
      transfer_date:  date(2024, 5, 1),
      postcode:       "E1 1BY".into(),
      full_address:   "FLAT 1 31 HIGH STREET".into(),
      property_type:  Some("F".into()),
    },
    SaleTransaction {
      transaction_id: "{B}".into(),
      price_paid:     330_000,
      transfer_date:  date(2024, 4, 1),
      postcode:       "E1 1BY".into(),
      full_address:   "FLAT 2 31 HIGH STREET".into(),
      property_type:  Some("F".into()),
    },
    SaleTransaction {
      transaction_id: "{C}".into(),
      price_paid:     1_000_000,
      transfer_date:  date(2024, 3, 1),
      postcode:       "E1 1BY".into(),
      full_address:   "WAREHOUSE REAR OF 40".into(),
      property_type:  Some("O".into()),
    },
  ])
  .await
  .unwrap();

  let report = comparable_sales(&s, "e11by", &ValuationConfig::default())
    .await
    .unwrap();

  assert_eq!(report.sales.len(), 3);
  assert_eq!(report.sales[0].transaction_id, "{A}");
  assert_eq!(report.matched, 2);

  assert_eq!(report.sales[0].matched_certificate.as_deref(), Some("CERT-1"));
  let a = report.sales[0].price_per_sqft.unwrap();
  assert!((a - 1000.0).abs() < 0.1, "{a}");

  // Flat 1 clears the bar first, so flat 2's sale borrows flat 1's area.
  assert_eq!(report.sales[1].matched_certificate.as_deref(), Some("CERT-1"));
  assert_eq!(report.sales[1].floor_area_sqm, Some(27.87));
  let b = report.sales[1].price_per_sqft.unwrap();
  assert!((b - 1100.0).abs() < 0.1, "{b}");
  let mean = report.average_price_per_sqft.unwrap();
  assert!((mean - (a + b) / 2.0).abs() < 1e-9);
  assert_eq!(report.sales[2].price_per_sqft, None);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

async fn seed_owned_portfolio(s: &SqliteStore) {
  s.insert_companies(vec![company("OC1", "ACME PROPERTIES LTD")])
    .await
    .unwrap();
  s.upsert_titles(vec![
    title("EGL1", "OC1", date(2019, 1, 1)),
    title("EGL2", "OC1", date(2021, 1, 1)),
  ])
  .await
  .unwrap();

  seed_distressed(&s, "100", "1 HIGH ST", "E1 1BY").await;
  seed_distressed(&s, "200", "2 HIGH ST", "E1 1BY").await;
  s.link_title("100", "EGL1").await.unwrap();
  s.link_title("200", "EGL2").await.unwrap();

  s.insert_properties(vec![Property::stub("300", "3 LOW RD", Some("N1 1AA".into()))])
    .await
    .unwrap();
  s.upsert_assessments(vec![assessment("300", RatingBand::F, None)])
    .await
    .unwrap();
}

#[tokio::test]
async fn distressed_scan_orders_by_band_then_registration() {
  let s = store().await;
  seed_owned_portfolio(&s).await;

  let assets = s.distressed_assets(50).await.unwrap();
  let uprns: Vec<_> = assets.iter().map(|a| a.uprn.as_str()).collect();
  assert_eq!(uprns, ["200", "100", "300"]);

  assert_eq!(assets[0].company_name.as_deref(), Some("ACME PROPERTIES LTD"));
  assert_eq!(assets[0].registered_on, Some(date(2021, 1, 1)));
  // Unlinked assets still appear, without ownership.
  assert_eq!(assets[2].title_number, None);
  assert_eq!(assets[2].company_number, None);

  assert_eq!(s.distressed_assets(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
  let s = store().await;
  seed_owned_portfolio(&s).await;

  let hits = s.search_properties("high st", 10).await.unwrap();
  assert_eq!(hits.len(), 2);
  assert!(s.search_properties("nowhere", 10).await.unwrap().is_empty());
  assert_eq!(s.search_properties("H", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn company_update_replaces_side_tables() {
  let s = store().await;
  seed_owned_portfolio(&s).await;

  let update = CompanyUpdate {
    official_name:         Some("ACME PROPERTIES LIMITED".into()),
    status:                Some("active".into()),
    incorporation_country: Some("United Kingdom".into()),
    registry_number:       Some("01234567".into()),
    officers:              vec![Officer {
      name:         "SMITH, Jane".into(),
      role:         Some("director".into()),
      appointed_on: Some(date(2015, 3, 1)),
      resigned_on:  None,
    }],
    controllers:           vec![Controller {
      name:               "Jane Smith".into(),
      kind:               Some("individual-person-with-significant-control".into()),
      natures_of_control: vec!["ownership-of-shares-75-to-100-percent".into()],
      notified_on:        Some(date(2016, 4, 6)),
    }],
    charges:               vec![Charge {
      charge_id:        "0001".into(),
      status:           Some("outstanding".into()),
      created_on:       Some(date(2019, 1, 1)),
      persons_entitled: vec!["Big Bank PLC".into()],
      description:      Some("Legal charge over 1 High St".into()),
    }],
  };
  assert!(s.apply_company_update("OC1", update.clone()).await.unwrap());
  // Applying twice must not duplicate side-table rows.
  assert!(s.apply_company_update("OC1", update).await.unwrap());

  let structure = s.company_structure("OC1").await.unwrap().unwrap();
  assert_eq!(structure.company.name, "ACME PROPERTIES LIMITED");
  assert_eq!(structure.company.registry_number.as_deref(), Some("01234567"));
  assert_eq!(structure.officers.len(), 1);
  assert_eq!(
    structure.controllers[0].natures_of_control,
    vec!["ownership-of-shares-75-to-100-percent"]
  );
  let titles: Vec<_> = structure.titles.iter().map(|t| t.title_number.as_str()).collect();
  assert_eq!(titles, ["EGL1", "EGL2"]);

  let charges = s.company_charges("OC1").await.unwrap().unwrap();
  assert_eq!(charges.len(), 1);
  assert_eq!(charges[0].persons_entitled, vec!["Big Bank PLC"]);
}

#[tokio::test]
async fn unknown_company_reads_are_none() {
  let s = store().await;
  assert!(s.company_structure("NOPE").await.unwrap().is_none());
  assert!(s.company_charges("NOPE").await.unwrap().is_none());
  assert!(
    !s.apply_company_update("NOPE", CompanyUpdate::default())
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn enrichment_targets_are_unenriched_owners_of_distressed_stock() {
  let s = store().await;
  seed_owned_portfolio(&s).await;
  s.insert_companies(vec![company("OC2", "IDLE HOLDINGS LTD")])
    .await
    .unwrap();

  let targets = s.enrichment_targets(10).await.unwrap();
  let numbers: Vec<_> = targets.iter().map(|t| t.company_number.as_str()).collect();
  assert_eq!(numbers, ["OC1"], "one row per company, owners only");

  s.apply_company_update("OC1", CompanyUpdate {
    status: Some("active".into()),
    incorporation_country: Some("United Kingdom".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(s.enrichment_targets(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn registry_misses_are_not_targeted_again() {
  let s = store().await;
  seed_owned_portfolio(&s).await;

  assert!(s.record_registry_miss("OC1").await.unwrap());
  assert!(!s.record_registry_miss("OC9").await.unwrap());

  let c = s.get_company("OC1").await.unwrap().unwrap();
  assert_eq!(c.status.as_deref(), Some("not_found"));
  assert!(s.enrichment_targets(10).await.unwrap().is_empty());
}
