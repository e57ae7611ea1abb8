//! MDM client
//!
//! Every method acquires its own bearer token before the call.

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::auth::{ClientCredentials, GrantEncoding, fetch_access_token};
use crate::constants::{
    BUILDING_SORT, DEFAULT_ERASE_PIN, DEFAULT_PAGE_SIZE, PRESTAGE_SORT, mdm_api_path,
};
use crate::error::Result;
use crate::http::{HttpClientConfig, UpstreamHttpClient};
use crate::model::{
    Building, ComputerInventory, ComputerMatch, ComputerMatchResponse, EnrollmentDevice,
    EnrollmentInstance, ErasePayload, InventoryUpdate, Page, PreloadPayload, PreloadRecord,
    PrestageDefinition, ScopeAssignments, ScopeMutation,
};

/// Configuration for the MDM client
#[derive(Clone, Debug)]
pub struct MdmClientConfig {
    pub http: HttpClientConfig,
    pub credentials: ClientCredentials,
    /// PIN sent with remote erase commands
    pub erase_pin: String,
    /// Page size for listing calls
    pub page_size: u32,
}

impl MdmClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: HttpClientConfig::new(base_url),
            credentials: ClientCredentials::default(),
            erase_pin: DEFAULT_ERASE_PIN.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set OAuth client credentials
    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.credentials = ClientCredentials::new(client_id, client_secret);
        self
    }

    /// Set the remote erase PIN
    pub fn with_erase_pin(mut self, pin: &str) -> Self {
        self.erase_pin = pin.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.http = self.http.with_timeouts(connect_ms, read_ms);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MdmClient {
    http: UpstreamHttpClient,
    config: MdmClientConfig,
}

impl MdmClient {
    pub fn new(config: MdmClientConfig) -> Result<Self> {
        let http = UpstreamHttpClient::new(config.http.clone())?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MdmClientConfig {
        &self.config
    }

    /// Acquire a fresh bearer token
    pub async fn access_token(&self) -> Result<String> {
        fetch_access_token(
            &self.http,
            mdm_api_path::TOKEN,
            &self.config.credentials,
            GrantEncoding::Form,
        )
        .await
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.access_token().await?;
        Ok(self
            .http
            .request(method, path)
            .bearer_auth(token)
            .header(ACCEPT, "application/json"))
    }

    async fn authorized_segments(
        &self,
        method: Method,
        path: &str,
        segments: &[&str],
    ) -> Result<RequestBuilder> {
        let url = self.http.build_url_with_segments(path, segments)?;
        let token = self.access_token().await?;
        Ok(self
            .http
            .request_url(method, url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json"))
    }

    fn paging(&self) -> [(&'static str, String); 2] {
        [
            ("page", "0".to_string()),
            ("page-size", self.config.page_size.to_string()),
        ]
    }

    /// Partial match of a serial (or name) against inventory
    #[instrument(skip(self))]
    pub async fn match_computers(&self, term: &str) -> Result<Vec<ComputerMatch>> {
        let builder = self
            .authorized_segments(Method::GET, mdm_api_path::COMPUTER_MATCH, &[term])
            .await?;
        let response: ComputerMatchResponse = self.http.send_json(builder).await?;
        debug!("Matched {} computers", response.computers.len());
        Ok(response.computers)
    }

    pub async fn enrollment_instances(&self) -> Result<Vec<EnrollmentInstance>> {
        let builder = self
            .authorized(Method::GET, mdm_api_path::DEVICE_ENROLLMENTS)
            .await?
            .query(&self.paging());
        let page: Page<EnrollmentInstance> = self.http.send_json(builder).await?;
        Ok(page.results)
    }

    pub async fn enrollment_devices(&self, instance_id: i64) -> Result<Vec<EnrollmentDevice>> {
        let id = instance_id.to_string();
        let builder = self
            .authorized_segments(
                Method::GET,
                mdm_api_path::DEVICE_ENROLLMENTS,
                &[&id, mdm_api_path::DEVICES],
            )
            .await?;
        let page: Page<EnrollmentDevice> = self.http.send_json(builder).await?;
        Ok(page.results)
    }

    /// Inventory detail with the GENERAL and HARDWARE sections
    #[instrument(skip(self))]
    pub async fn computer_inventory(&self, computer_id: i64) -> Result<ComputerInventory> {
        let id = computer_id.to_string();
        let builder = self
            .authorized_segments(Method::GET, mdm_api_path::COMPUTERS_INVENTORY, &[&id])
            .await?
            .query(&[("section", "GENERAL"), ("section", "HARDWARE")]);
        self.http.send_json(builder).await
    }

    #[instrument(skip(self, update))]
    pub async fn update_inventory_detail(
        &self,
        computer_id: i64,
        update: &InventoryUpdate,
    ) -> Result<Value> {
        let id = computer_id.to_string();
        let builder = self
            .authorized_segments(
                Method::PATCH,
                mdm_api_path::COMPUTERS_INVENTORY_DETAIL,
                &[&id],
            )
            .await?
            .json(update);
        self.http.send_value(builder).await
    }

    /// Delete a computer from inventory; only 204 counts as deleted
    #[instrument(skip(self))]
    pub async fn delete_computer(&self, computer_id: i64) -> Result<()> {
        let id = computer_id.to_string();
        let builder = self
            .authorized_segments(Method::DELETE, mdm_api_path::COMPUTERS_INVENTORY, &[&id])
            .await?;
        self.http
            .send_expecting(builder, StatusCode::NO_CONTENT)
            .await?;
        info!("Deleted computer {} from inventory", computer_id);
        Ok(())
    }

    /// Send a remote erase command; only 200 counts as accepted
    #[instrument(skip(self))]
    pub async fn erase_computer(&self, computer_id: i64) -> Result<Value> {
        let id = computer_id.to_string();
        let payload = ErasePayload {
            pin: self.config.erase_pin.clone(),
        };
        let builder = self
            .authorized_segments(
                Method::POST,
                mdm_api_path::COMPUTER_INVENTORY,
                &[&id, mdm_api_path::ERASE],
            )
            .await?
            .json(&payload);
        let response = self.http.send_expecting(builder, StatusCode::OK).await?;
        info!("Erase command accepted for computer {}", computer_id);
        UpstreamHttpClient::read_value(response).await
    }

    pub async fn prestages(&self) -> Result<Vec<PrestageDefinition>> {
        let builder = self
            .authorized(Method::GET, mdm_api_path::PRESTAGES)
            .await?
            .query(&self.paging())
            .query(&[("sort", PRESTAGE_SORT)]);
        let page: Page<PrestageDefinition> = self.http.send_json(builder).await?;
        Ok(page.results)
    }

    pub async fn prestage_scopes(&self) -> Result<ScopeAssignments> {
        let builder = self
            .authorized(Method::GET, mdm_api_path::PRESTAGE_SCOPES)
            .await?;
        self.http.send_json(builder).await
    }

    /// Add serials to a prestage scope; additive on the upstream side
    #[instrument(skip(self, mutation))]
    pub async fn add_to_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        let id = prestage_id.to_string();
        let builder = self
            .authorized_segments(
                Method::POST,
                mdm_api_path::PRESTAGES_V2,
                &[&id, mdm_api_path::SCOPE],
            )
            .await?
            .json(mutation);
        self.http.send_value(builder).await
    }

    #[instrument(skip(self, mutation))]
    pub async fn remove_from_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        let id = prestage_id.to_string();
        let builder = self
            .authorized_segments(
                Method::POST,
                mdm_api_path::PRESTAGES_V2,
                &[&id, mdm_api_path::SCOPE, mdm_api_path::DELETE_MULTIPLE],
            )
            .await?
            .json(mutation);
        self.http.send_value(builder).await
    }

    /// First preload record for an exact serial, if any
    pub async fn preload_record(&self, serial_number: &str) -> Result<Option<PreloadRecord>> {
        let filter = format!("serialNumber==\"{}\"", serial_number.replace('"', "\\\""));
        let builder = self
            .authorized(Method::GET, mdm_api_path::PRELOAD_RECORDS)
            .await?
            .query(&[("page", "0"), ("page-size", "1")])
            .query(&[("filter", filter.as_str())]);
        let page: Page<PreloadRecord> = self.http.send_json(builder).await?;
        Ok(page.results.into_iter().next())
    }

    pub async fn create_preload(&self, payload: &PreloadPayload) -> Result<Value> {
        let builder = self
            .authorized(Method::POST, mdm_api_path::PRELOAD_RECORDS)
            .await?
            .json(payload);
        self.http.send_value(builder).await
    }

    pub async fn replace_preload(
        &self,
        preload_id: i64,
        payload: &PreloadPayload,
    ) -> Result<Value> {
        let id = preload_id.to_string();
        let builder = self
            .authorized_segments(Method::PUT, mdm_api_path::PRELOAD_RECORDS, &[&id])
            .await?
            .json(payload);
        self.http.send_value(builder).await
    }

    pub async fn buildings(&self) -> Result<Vec<Building>> {
        let builder = self
            .authorized(Method::GET, mdm_api_path::BUILDINGS)
            .await?
            .query(&self.paging())
            .query(&[("sort", BUILDING_SORT)]);
        let page: Page<Building> = self.http.send_json(builder).await?;
        Ok(page.results)
    }
}
