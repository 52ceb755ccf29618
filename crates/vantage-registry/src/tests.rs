//! Client tests against a fake registry.

use serde_json::json;
use vantage_core::registry::CompanyRegistry;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{header, method, path, query_param},
};

use crate::{CompaniesHouseClient, RegistryConfig};

// "test-key:" in Basic auth.
const AUTH: &str = "Basic dGVzdC1rZXk6";

fn client(server: &MockServer, key: Option<&str>) -> CompaniesHouseClient {
  CompaniesHouseClient::new(RegistryConfig {
    base_url: server.uri(),
    api_key: key.map(str::to_owned),
    ..Default::default()
  })
  .unwrap()
}

#[tokio::test]
async fn search_returns_top_hit_with_key_as_basic_auth_user() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/search/companies"))
    .and(query_param("q", "ACME PROPERTIES LTD"))
    .and(query_param("items_per_page", "1"))
    .and(header("authorization", AUTH))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "items": [{
        "company_number": "01234567",
        "title": "ACME PROPERTIES LIMITED",
        "company_status": "active",
        "address_snippet": "1 City Road, London, EC1Y 1AA"
      }]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let hit = client(&server, Some("test-key"))
    .search_by_name("ACME PROPERTIES LTD")
    .await
    .unwrap();
  assert_eq!(hit.company_number, "01234567");
  assert_eq!(hit.title, "ACME PROPERTIES LIMITED");
}

#[tokio::test]
async fn empty_search_is_none() {
  let server = MockServer::start().await;
  Mock::given(path("/search/companies"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
    .mount(&server)
    .await;

  assert!(
    client(&server, Some("test-key"))
      .search_by_name("NOBODY")
      .await
      .is_none()
  );
}

#[tokio::test]
async fn profile_and_lists_decode() {
  let server = MockServer::start().await;
  Mock::given(path("/company/01234567"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "company_number": "01234567",
      "company_name": "ACME PROPERTIES LIMITED",
      "company_status": "liquidation",
      "jurisdiction": "england-wales",
      "date_of_creation": "2001-05-01"
    })))
    .mount(&server)
    .await;
  Mock::given(path("/company/01234567/officers"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "items": [
        { "name": "SMITH, Jane", "officer_role": "director", "appointed_on": "2010-01-01" },
        { "name": "JONES, Bob", "officer_role": "director", "resigned_on": "2009-01-01" }
      ]
    })))
    .mount(&server)
    .await;
  Mock::given(path("/company/01234567/persons-with-significant-control"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "items": [{
        "name": "Mrs Jane Smith",
        "kind": "individual-person-with-significant-control",
        "natures_of_control": ["ownership-of-shares-75-to-100-percent"],
        "notified_on": "2016-04-06"
      }]
    })))
    .mount(&server)
    .await;
  Mock::given(path("/company/01234567/charges"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "items": [{
        "charge_code": "012345670001",
        "status": "outstanding",
        "created_on": "2019-02-01",
        "persons_entitled": [{ "name": "Big Bank PLC" }],
        "particulars": { "description": "Legal charge over 1 High Street" }
      }]
    })))
    .mount(&server)
    .await;

  let ch = client(&server, Some("test-key"));

  let profile = ch.get_profile("01234567").await.unwrap();
  assert_eq!(profile.company_status.as_deref(), Some("liquidation"));
  assert_eq!(profile.jurisdiction.as_deref(), Some("england-wales"));

  let officers = ch.get_officers("01234567").await;
  assert_eq!(officers.len(), 2);
  assert!(officers[0].is_active());
  assert!(!officers[1].is_active());

  let controllers = ch.get_controllers("01234567").await;
  assert_eq!(controllers[0].natures_of_control.len(), 1);

  let charges = ch.get_charges("01234567").await;
  assert_eq!(charges[0].charge_id, "012345670001");
  assert_eq!(charges[0].persons_entitled, vec!["Big Bank PLC"]);
  assert_eq!(
    charges[0].description.as_deref(),
    Some("Legal charge over 1 High Street")
  );
}

#[tokio::test]
async fn http_failures_are_soft() {
  let server = MockServer::start().await;
  Mock::given(path("/company/404"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;
  Mock::given(path("/company/500/officers"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;
  Mock::given(path("/search/companies"))
    .respond_with(ResponseTemplate::new(429))
    .mount(&server)
    .await;

  let ch = client(&server, Some("test-key"));
  assert!(ch.get_profile("404").await.is_none());
  assert!(ch.get_officers("500").await.is_empty());
  assert!(ch.search_by_name("ANY").await.is_none());
}

#[tokio::test]
async fn malformed_body_is_soft() {
  let server = MockServer::start().await;
  Mock::given(path("/company/01234567"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
    .mount(&server)
    .await;

  assert!(
    client(&server, Some("test-key"))
      .get_profile("01234567")
      .await
      .is_none()
  );
}

#[tokio::test]
async fn no_key_means_no_requests() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let ch = client(&server, None);
  assert!(!ch.has_key());
  assert!(ch.search_by_name("ACME").await.is_none());
  assert!(ch.get_charges("01234567").await.is_empty());
}
