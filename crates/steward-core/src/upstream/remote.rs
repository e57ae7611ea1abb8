//! Gateway implementations backed by the HTTP clients

use async_trait::async_trait;
use serde_json::Value;

use steward_client::{
    AssetClient, AssetRecord, AssetSession, Building, ComputerInventory, ComputerMatch,
    EnrollmentDevice, EnrollmentInstance, InventoryUpdate, MdmClient, NacClient, PreloadPayload,
    PreloadRecord, PrestageDefinition, Result, ScopeAssignments, ScopeMutation,
};

use super::{AssetGateway, MdmGateway, NacGateway};

#[async_trait]
impl MdmGateway for MdmClient {
    async fn match_computers(&self, term: &str) -> Result<Vec<ComputerMatch>> {
        MdmClient::match_computers(self, term).await
    }

    async fn enrollment_instances(&self) -> Result<Vec<EnrollmentInstance>> {
        MdmClient::enrollment_instances(self).await
    }

    async fn enrollment_devices(&self, instance_id: i64) -> Result<Vec<EnrollmentDevice>> {
        MdmClient::enrollment_devices(self, instance_id).await
    }

    async fn computer_inventory(&self, computer_id: i64) -> Result<ComputerInventory> {
        MdmClient::computer_inventory(self, computer_id).await
    }

    async fn prestages(&self) -> Result<Vec<PrestageDefinition>> {
        MdmClient::prestages(self).await
    }

    async fn prestage_scopes(&self) -> Result<ScopeAssignments> {
        MdmClient::prestage_scopes(self).await
    }

    async fn preload_record(&self, serial_number: &str) -> Result<Option<PreloadRecord>> {
        MdmClient::preload_record(self, serial_number).await
    }

    async fn buildings(&self) -> Result<Vec<Building>> {
        MdmClient::buildings(self).await
    }

    async fn add_to_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        MdmClient::add_to_prestage_scope(self, prestage_id, mutation).await
    }

    async fn remove_from_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        MdmClient::remove_from_prestage_scope(self, prestage_id, mutation).await
    }

    async fn update_inventory_detail(
        &self,
        computer_id: i64,
        update: &InventoryUpdate,
    ) -> Result<Value> {
        MdmClient::update_inventory_detail(self, computer_id, update).await
    }

    async fn create_preload(&self, payload: &PreloadPayload) -> Result<Value> {
        MdmClient::create_preload(self, payload).await
    }

    async fn replace_preload(&self, preload_id: i64, payload: &PreloadPayload) -> Result<Value> {
        MdmClient::replace_preload(self, preload_id, payload).await
    }

    async fn erase_computer(&self, computer_id: i64) -> Result<Value> {
        MdmClient::erase_computer(self, computer_id).await
    }

    async fn delete_computer(&self, computer_id: i64) -> Result<()> {
        MdmClient::delete_computer(self, computer_id).await
    }
}

#[async_trait]
impl AssetGateway for AssetClient {
    async fn open_session(&self) -> Result<AssetSession> {
        AssetClient::open_session(self).await
    }

    async fn search_by_serial(
        &self,
        session: &AssetSession,
        serial_number: &str,
    ) -> Result<Vec<AssetRecord>> {
        AssetClient::search_by_serial(self, session, serial_number).await
    }

    async fn update_state(
        &self,
        session: &AssetSession,
        asset_id: i64,
        states_id: i64,
    ) -> Result<Value> {
        AssetClient::update_state(self, session, asset_id, states_id).await
    }

    async fn kill_session(&self, session: AssetSession) -> Result<()> {
        AssetClient::kill_session(self, session).await
    }
}

#[async_trait]
impl NacGateway for NacClient {
    async fn delete_endpoint(&self, mac_address: &str) -> Result<()> {
        NacClient::delete_endpoint(self, mac_address).await
    }
}
