//! Upstream gateway abstraction
//!
//! Orchestrators talk to the three upstream systems only through these
//! traits. The HTTP clients implement them in [`remote`]; tests use the
//! recording doubles in `crate::testing`.

pub mod remote;

use async_trait::async_trait;
use serde_json::Value;

use steward_client::{
    AssetRecord, AssetSession, Building, ComputerInventory, ComputerMatch, EnrollmentDevice,
    EnrollmentInstance, InventoryUpdate, PreloadPayload, PreloadRecord, PrestageDefinition,
    Result, ScopeAssignments, ScopeMutation,
};

/// MDM operations used by the orchestration layer
#[async_trait]
pub trait MdmGateway: Send + Sync {
    // ============== Lookup Operations ==============

    /// Partial serial match against inventory
    async fn match_computers(&self, term: &str) -> Result<Vec<ComputerMatch>>;

    async fn enrollment_instances(&self) -> Result<Vec<EnrollmentInstance>>;

    async fn enrollment_devices(&self, instance_id: i64) -> Result<Vec<EnrollmentDevice>>;

    async fn computer_inventory(&self, computer_id: i64) -> Result<ComputerInventory>;

    async fn prestages(&self) -> Result<Vec<PrestageDefinition>>;

    async fn prestage_scopes(&self) -> Result<ScopeAssignments>;

    async fn preload_record(&self, serial_number: &str) -> Result<Option<PreloadRecord>>;

    async fn buildings(&self) -> Result<Vec<Building>>;

    // ============== Mutating Operations ==============

    async fn add_to_prestage_scope(&self, prestage_id: i64, mutation: &ScopeMutation)
    -> Result<Value>;

    async fn remove_from_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value>;

    async fn update_inventory_detail(
        &self,
        computer_id: i64,
        update: &InventoryUpdate,
    ) -> Result<Value>;

    async fn create_preload(&self, payload: &PreloadPayload) -> Result<Value>;

    async fn replace_preload(&self, preload_id: i64, payload: &PreloadPayload) -> Result<Value>;

    /// Remote erase; succeeds only on HTTP 200
    async fn erase_computer(&self, computer_id: i64) -> Result<Value>;

    /// Inventory deletion; succeeds only on HTTP 204
    async fn delete_computer(&self, computer_id: i64) -> Result<()>;
}

/// Asset-management operations used by the retirement saga
#[async_trait]
pub trait AssetGateway: Send + Sync {
    async fn open_session(&self) -> Result<AssetSession>;

    async fn search_by_serial(
        &self,
        session: &AssetSession,
        serial_number: &str,
    ) -> Result<Vec<AssetRecord>>;

    async fn update_state(
        &self,
        session: &AssetSession,
        asset_id: i64,
        states_id: i64,
    ) -> Result<Value>;

    async fn kill_session(&self, session: AssetSession) -> Result<()>;
}

/// NAC operations used by the retirement saga
#[async_trait]
pub trait NacGateway: Send + Sync {
    async fn delete_endpoint(&self, mac_address: &str) -> Result<()>;
}
