//! The `PropertyStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `vantage-store-sqlite`).
//! The linker, the valuer, the enrichment job and the query API depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use crate::model::{
  AreaCandidate, Charge, CompanyStructure, CompanyUpdate, CorporateEntity, DistressedAsset,
  EnergyAssessment, EnrichmentTarget, LinkTarget, OwnershipTitle, PostcodeLocation, Property,
  SaleTransaction, TitleCandidate,
};

/// Abstraction over the relational store holding the property graph.
///
/// Ingestion writes are idempotent: properties and companies are
/// insert-if-absent, everything keyed by an external identifier is an
/// upsert. The only in-place mutation of a property is
/// [`link_title`](Self::link_title).
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers.
pub trait PropertyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Insert property stubs, leaving any existing row with the same UPRN
  /// untouched. Returns the number of rows actually inserted.
  fn insert_properties(
    &self,
    rows: Vec<Property>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert or replace energy assessments by certificate id.
  fn upsert_assessments(
    &self,
    rows: Vec<EnergyAssessment>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert companies, leaving existing rows (and their enrichment) intact.
  fn insert_companies(
    &self,
    rows: Vec<CorporateEntity>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert or replace ownership titles by title number.
  fn upsert_titles(
    &self,
    rows: Vec<OwnershipTitle>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert or replace sale transactions by transaction id.
  fn upsert_sales(
    &self,
    rows: Vec<SaleTransaction>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Insert or replace postcode index rows.
  fn upsert_postcodes(
    &self,
    rows: Vec<PostcodeLocation>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Copy coordinates from the postcode index onto properties that have a
  /// postcode but no coordinates. Returns the number of properties updated.
  fn geocode_properties(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Linkage ───────────────────────────────────────────────────────────

  /// Properties with a postcode, a non-empty address, an F/G assessment and
  /// no title, ordered by UPRN.
  fn unlinked_distressed_targets(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LinkTarget>, Self::Error>> + Send + '_;

  /// Ownership stubs (UPRNs under [`TITLE_REF_PREFIX`]) in exactly
  /// `postcode`, ordered by UPRN. Properties the linker has titled are never
  /// candidates.
  ///
  /// [`TITLE_REF_PREFIX`]: crate::model::TITLE_REF_PREFIX
  fn title_candidates<'a>(
    &'a self,
    postcode: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitleCandidate>, Self::Error>> + Send + 'a;

  /// Set the title on `uprn` if and only if it has none. The check and the
  /// write are atomic; returns `false` when the row was already linked (or
  /// does not exist).
  fn link_title<'a>(
    &'a self,
    uprn: &'a str,
    title_number: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Valuation ─────────────────────────────────────────────────────────

  /// The `limit` most recent sales in `postcode`, newest first.
  fn recent_sales<'a>(
    &'a self,
    postcode: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SaleTransaction>, Self::Error>> + Send + 'a;

  /// Every energy assessment on a property in `postcode`, ordered by
  /// certificate id.
  fn area_candidates<'a>(
    &'a self,
    postcode: &'a str,
  ) -> impl Future<Output = Result<Vec<AreaCandidate>, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_property<'a>(
    &'a self,
    uprn: &'a str,
  ) -> impl Future<Output = Result<Option<Property>, Self::Error>> + Send + 'a;

  /// Properties whose address contains `text` (case-insensitive).
  fn search_properties<'a>(
    &'a self,
    text: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Property>, Self::Error>> + Send + 'a;

  /// F/G-rated properties joined through the linkage edge to ownership and
  /// company data. Worst band first, then most recently registered.
  fn distressed_assets(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DistressedAsset>, Self::Error>> + Send + '_;

  fn get_company<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<Option<CorporateEntity>, Self::Error>> + Send + 'a;

  /// Company, officers, controllers and titles. `None` if the company is
  /// unknown.
  fn company_structure<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<Option<CompanyStructure>, Self::Error>> + Send + 'a;

  /// Charges registered against a company. `None` if the company is unknown.
  fn company_charges<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<Charge>>, Self::Error>> + Send + 'a;

  // ── Owner enrichment ──────────────────────────────────────────────────

  /// Companies owning a title linked to a distressed property whose status
  /// is unknown or whose country is `Unknown`. Companies already recorded as
  /// missing from the registry are skipped.
  fn enrichment_targets(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<EnrichmentTarget>, Self::Error>> + Send + '_;

  /// Set a company's status to [`STATUS_NOT_FOUND`] after a registry search
  /// misses. Returns `false` if the company is unknown.
  ///
  /// [`STATUS_NOT_FOUND`]: crate::model::STATUS_NOT_FOUND
  fn record_registry_miss<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Write registry data onto a company and replace its officer,
  /// controller and charge rows. Returns `false` if the company is unknown.
  fn apply_company_update<'a>(
    &'a self,
    company_number: &'a str,
    update: CompanyUpdate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
