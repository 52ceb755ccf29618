//! An in-memory `PropertyStore` for unit tests.

use std::{
  collections::{BTreeMap, BTreeSet, HashSet},
  future::{Future, ready},
  sync::Mutex,
};

use crate::{
  model::{
    AreaCandidate, Charge, CompanyStructure, CompanyUpdate, CorporateEntity, DistressedAsset,
    EnergyAssessment, EnrichmentTarget, LinkTarget, OwnershipTitle, PostcodeLocation, Property,
    STATUS_NOT_FOUND, SaleTransaction, TitleCandidate, UNKNOWN_COUNTRY,
  },
  store::PropertyStore,
};

#[derive(Debug, thiserror::Error)]
#[error("memory store: {0}")]
pub struct MemoryError(String);

#[derive(Default)]
struct Inner {
  properties:  BTreeMap<String, Property>,
  assessments: BTreeMap<String, EnergyAssessment>,
  companies:   BTreeMap<String, CorporateEntity>,
  titles:      BTreeMap<String, OwnershipTitle>,
  sales:       BTreeMap<String, SaleTransaction>,
  updates:     BTreeMap<String, CompanyUpdate>,
  failing:     HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

impl MemoryStore {
  fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
    let mut inner = self.inner.lock().unwrap();
    f(&mut inner)
  }

  pub fn add_property(&self, p: Property) {
    self.with(|i| i.properties.insert(p.uprn.clone(), p));
  }

  pub fn add_assessment(&self, a: EnergyAssessment) {
    self.with(|i| i.assessments.insert(a.certificate_id.clone(), a));
  }

  pub fn add_sale(&self, s: SaleTransaction) {
    self.with(|i| i.sales.insert(s.transaction_id.clone(), s));
  }

  pub fn add_company(&self, c: CorporateEntity) {
    self.with(|i| i.companies.insert(c.company_number.clone(), c));
  }

  pub fn add_title(&self, t: OwnershipTitle) {
    self.with(|i| i.titles.insert(t.title_number.clone(), t));
  }

  /// Make `title_candidates` fail for one postcode.
  pub fn fail_candidates_for(&self, postcode: &str) {
    self.with(|i| i.failing.insert(postcode.to_owned()));
  }

  pub fn title_of(&self, uprn: &str) -> Option<String> {
    self.with(|i| i.properties.get(uprn).and_then(|p| p.title_number.clone()))
  }

  pub fn linked_uprns(&self) -> BTreeSet<String> {
    self.with(|i| {
      i.properties
        .values()
        .filter(|p| p.title_number.is_some())
        .map(|p| p.uprn.clone())
        .collect()
    })
  }

  pub fn company(&self, number: &str) -> Option<CorporateEntity> {
    self.with(|i| i.companies.get(number).cloned())
  }

  pub fn update_for(&self, number: &str) -> Option<CompanyUpdate> {
    self.with(|i| i.updates.get(number).cloned())
  }
}

impl Inner {
  fn is_distressed(&self, uprn: &str) -> bool {
    self
      .assessments
      .values()
      .any(|a| a.uprn == uprn && a.rating_band.is_distressed())
  }
}

impl PropertyStore for MemoryStore {
  type Error = MemoryError;

  fn insert_properties(
    &self,
    rows: Vec<Property>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    ready(Ok(self.with(|i| {
      let mut inserted = 0;
      for p in rows {
        if !i.properties.contains_key(&p.uprn) {
          i.properties.insert(p.uprn.clone(), p);
          inserted += 1;
        }
      }
      inserted
    })))
  }

  fn upsert_assessments(
    &self,
    rows: Vec<EnergyAssessment>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    let n = rows.len();
    rows.into_iter().for_each(|a| self.add_assessment(a));
    ready(Ok(n))
  }

  fn insert_companies(
    &self,
    rows: Vec<CorporateEntity>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    ready(Ok(self.with(|i| {
      let before = i.companies.len();
      for c in rows {
        i.companies.entry(c.company_number.clone()).or_insert(c);
      }
      i.companies.len() - before
    })))
  }

  fn upsert_titles(
    &self,
    rows: Vec<OwnershipTitle>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    let n = rows.len();
    rows.into_iter().for_each(|t| self.add_title(t));
    ready(Ok(n))
  }

  fn upsert_sales(
    &self,
    rows: Vec<SaleTransaction>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    let n = rows.len();
    rows.into_iter().for_each(|s| self.add_sale(s));
    ready(Ok(n))
  }

  fn upsert_postcodes(
    &self,
    rows: Vec<PostcodeLocation>,
  ) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    ready(Ok(rows.len()))
  }

  fn geocode_properties(&self) -> impl Future<Output = Result<usize, MemoryError>> + Send + '_ {
    ready(Ok(0))
  }

  fn unlinked_distressed_targets(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LinkTarget>, MemoryError>> + Send + '_ {
    ready(Ok(self.with(|i| {
      i.properties
        .values()
        .filter(|p| p.title_number.is_none() && !p.address.is_empty())
        .filter_map(|p| {
          let postcode = p.postcode.clone()?;
          let band = i
            .assessments
            .values()
            .filter(|a| a.uprn == p.uprn && a.rating_band.is_distressed())
            .map(|a| a.rating_band)
            .max()?;
          Some(LinkTarget {
            uprn: p.uprn.clone(),
            address: p.address.clone(),
            postcode,
            rating_band: band,
          })
        })
        .take(limit)
        .collect()
    })))
  }

  fn title_candidates<'a>(
    &'a self,
    postcode: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitleCandidate>, MemoryError>> + Send + 'a {
    ready(self.with(|i| {
      if i.failing.contains(postcode) {
        return Err(MemoryError(format!("candidates unavailable for {postcode}")));
      }
      Ok(
        i.properties
          .values()
          .filter(|p| p.postcode.as_deref() == Some(postcode) && p.is_ownership_stub())
          .filter_map(|p| {
            Some(TitleCandidate {
              uprn:         p.uprn.clone(),
              address:      p.address.clone(),
              title_number: p.title_number.clone()?,
            })
          })
          .take(limit)
          .collect(),
      )
    }))
  }

  fn link_title<'a>(
    &'a self,
    uprn: &'a str,
    title_number: &'a str,
  ) -> impl Future<Output = Result<bool, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| match i.properties.get_mut(uprn) {
      Some(p) if p.title_number.as_deref().is_none_or(str::is_empty) => {
        p.title_number = Some(title_number.to_owned());
        true
      }
      _ => false,
    })))
  }

  fn recent_sales<'a>(
    &'a self,
    postcode: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SaleTransaction>, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| {
      let mut sales: Vec<_> = i
        .sales
        .values()
        .filter(|s| s.postcode == postcode)
        .cloned()
        .collect();
      sales.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date));
      sales.truncate(limit);
      sales
    })))
  }

  fn area_candidates<'a>(
    &'a self,
    postcode: &'a str,
  ) -> impl Future<Output = Result<Vec<AreaCandidate>, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| {
      i.assessments
        .values()
        .filter_map(|a| {
          let p = i.properties.get(&a.uprn)?;
          (p.postcode.as_deref() == Some(postcode)).then(|| AreaCandidate {
            certificate_id: a.certificate_id.clone(),
            uprn:           a.uprn.clone(),
            address:        p.address.clone(),
            floor_area:     a.floor_area,
          })
        })
        .collect()
    })))
  }

  fn get_property<'a>(
    &'a self,
    uprn: &'a str,
  ) -> impl Future<Output = Result<Option<Property>, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| i.properties.get(uprn).cloned())))
  }

  fn search_properties<'a>(
    &'a self,
    text: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Property>, MemoryError>> + Send + 'a {
    let needle = text.to_uppercase();
    ready(Ok(self.with(|i| {
      i.properties
        .values()
        .filter(|p| p.address.to_uppercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
    })))
  }

  fn distressed_assets(
    &self,
    _limit: usize,
  ) -> impl Future<Output = Result<Vec<DistressedAsset>, MemoryError>> + Send + '_ {
    ready(Ok(Vec::new()))
  }

  fn get_company<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<Option<CorporateEntity>, MemoryError>> + Send + 'a {
    ready(Ok(self.company(company_number)))
  }

  fn company_structure<'a>(
    &'a self,
    _company_number: &'a str,
  ) -> impl Future<Output = Result<Option<CompanyStructure>, MemoryError>> + Send + 'a {
    ready(Ok(None))
  }

  fn company_charges<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<Charge>>, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| {
      i.companies.contains_key(company_number).then(|| {
        i.updates
          .get(company_number)
          .map(|u| u.charges.clone())
          .unwrap_or_default()
      })
    })))
  }

  fn enrichment_targets(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<EnrichmentTarget>, MemoryError>> + Send + '_ {
    ready(Ok(self.with(|i| {
      let owning: BTreeSet<&str> = i
        .properties
        .values()
        .filter(|p| i.is_distressed(&p.uprn))
        .filter_map(|p| p.title_number.as_deref())
        .filter_map(|t| i.titles.get(t)?.company_number.as_deref())
        .collect();
      i.companies
        .values()
        .filter(|c| owning.contains(c.company_number.as_str()))
        .filter(|c| {
          c.status.is_none() || c.incorporation_country.as_deref() == Some(UNKNOWN_COUNTRY)
        })
        .filter(|c| c.status.as_deref() != Some(STATUS_NOT_FOUND))
        .take(limit)
        .map(|c| EnrichmentTarget {
          company_number: c.company_number.clone(),
          name:           c.name.clone(),
        })
        .collect()
    })))
  }

  fn record_registry_miss<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Result<bool, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| match i.companies.get_mut(company_number) {
      Some(company) => {
        company.status = Some(STATUS_NOT_FOUND.to_owned());
        true
      }
      None => false,
    })))
  }

  fn apply_company_update<'a>(
    &'a self,
    company_number: &'a str,
    update: CompanyUpdate,
  ) -> impl Future<Output = Result<bool, MemoryError>> + Send + 'a {
    ready(Ok(self.with(|i| {
      let Some(company) = i.companies.get_mut(company_number) else {
        return false;
      };
      if let Some(name) = &update.official_name {
        company.name = name.clone();
      }
      company.status = update.status.clone().or(company.status.take());
      company.incorporation_country = update
        .incorporation_country
        .clone()
        .or(company.incorporation_country.take());
      company.registry_number = update
        .registry_number
        .clone()
        .or(company.registry_number.take());
      i.updates.insert(company_number.to_owned(), update);
      true
    })))
  }
}
