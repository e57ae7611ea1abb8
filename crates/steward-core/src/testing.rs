//! Test utilities and in-memory gateway implementations.
//!
//! The mocks keep just enough upstream state to answer reads consistently
//! with earlier writes, record every call in order, and let a test inject an
//! HTTP failure or a delay per operation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use steward_client::{
    AssetRecord, AssetSession, Building, ClientError, ComputerInventory, ComputerMatch,
    EnrollmentDevice, EnrollmentInstance, InventoryGeneral, InventoryHardware, InventoryUpdate,
    PreloadPayload, PreloadRecord, PrestageDefinition, Result, ScopeAssignments, ScopeMutation,
    VersionLock,
};

use crate::upstream::{AssetGateway, MdmGateway, NacGateway};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MdmOp {
    MatchComputers,
    EnrollmentInstances,
    EnrollmentDevices,
    ComputerInventory,
    Prestages,
    PrestageScopes,
    PreloadRecord,
    Buildings,
    AddToScope,
    RemoveFromScope,
    UpdateInventoryDetail,
    CreatePreload,
    ReplacePreload,
    EraseComputer,
    DeleteComputer,
}

impl MdmOp {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            MdmOp::AddToScope
                | MdmOp::RemoveFromScope
                | MdmOp::UpdateInventoryDetail
                | MdmOp::CreatePreload
                | MdmOp::ReplacePreload
                | MdmOp::EraseComputer
                | MdmOp::DeleteComputer
        )
    }
}

/// One recorded MDM call
#[derive(Clone, Debug, PartialEq)]
pub enum MdmCall {
    MatchComputers(String),
    EnrollmentInstances,
    EnrollmentDevices(i64),
    ComputerInventory(i64),
    Prestages,
    PrestageScopes,
    PreloadRecord(String),
    Buildings,
    AddToScope {
        prestage_id: i64,
        mutation: ScopeMutation,
    },
    RemoveFromScope {
        prestage_id: i64,
        mutation: ScopeMutation,
    },
    UpdateInventoryDetail {
        computer_id: i64,
        update: InventoryUpdate,
    },
    CreatePreload(PreloadPayload),
    ReplacePreload {
        preload_id: i64,
        payload: PreloadPayload,
    },
    EraseComputer(i64),
    DeleteComputer(i64),
}

impl MdmCall {
    pub fn op(&self) -> MdmOp {
        match self {
            MdmCall::MatchComputers(_) => MdmOp::MatchComputers,
            MdmCall::EnrollmentInstances => MdmOp::EnrollmentInstances,
            MdmCall::EnrollmentDevices(_) => MdmOp::EnrollmentDevices,
            MdmCall::ComputerInventory(_) => MdmOp::ComputerInventory,
            MdmCall::Prestages => MdmOp::Prestages,
            MdmCall::PrestageScopes => MdmOp::PrestageScopes,
            MdmCall::PreloadRecord(_) => MdmOp::PreloadRecord,
            MdmCall::Buildings => MdmOp::Buildings,
            MdmCall::AddToScope { .. } => MdmOp::AddToScope,
            MdmCall::RemoveFromScope { .. } => MdmOp::RemoveFromScope,
            MdmCall::UpdateInventoryDetail { .. } => MdmOp::UpdateInventoryDetail,
            MdmCall::CreatePreload(_) => MdmOp::CreatePreload,
            MdmCall::ReplacePreload { .. } => MdmOp::ReplacePreload,
            MdmCall::EraseComputer(_) => MdmOp::EraseComputer,
            MdmCall::DeleteComputer(_) => MdmOp::DeleteComputer,
        }
    }
}

/// Injected HTTP failure
#[derive(Clone, Debug)]
struct Failure {
    status: u16,
    body: String,
}

impl Failure {
    fn to_error(&self) -> ClientError {
        ClientError::Status {
            status: self.status,
            body: self.body.clone(),
        }
    }
}

#[derive(Default)]
struct MdmState {
    computers: Vec<ComputerMatch>,
    inventories: HashMap<i64, ComputerInventory>,
    enrollment: Vec<(i64, EnrollmentDevice)>,
    prestages: Vec<PrestageDefinition>,
    scopes: HashMap<String, i64>,
    preloads: Vec<PreloadRecord>,
    buildings: Vec<Building>,
    failures: HashMap<MdmOp, Failure>,
    delays: HashMap<MdmOp, Duration>,
    calls: Vec<MdmCall>,
}

/// In-memory MDM
#[derive(Default)]
pub struct MockMdm {
    state: RwLock<MdmState>,
}

impl MockMdm {
    pub fn new() -> Self {
        Self::default()
    }

    // ============== Setup ==============

    pub async fn add_prestage(&self, id: i64, display_name: &str, lock: Option<VersionLock>) {
        self.state
            .write()
            .await
            .prestages
            .push(PrestageDefinition::new(id, display_name, lock));
    }

    pub async fn set_scope(&self, serial_number: &str, prestage_id: i64) {
        self.state
            .write()
            .await
            .scopes
            .insert(serial_number.to_string(), prestage_id);
    }

    /// Register an enrolled computer with a default inventory record
    pub async fn add_computer(&self, id: i64, serial_number: &str, name: &str) {
        let mut state = self.state.write().await;
        state.computers.push(ComputerMatch {
            id,
            serial_number: serial_number.to_string(),
            name: Some(name.to_string()),
        });
        state.inventories.insert(
            id,
            ComputerInventory {
                id,
                general: Some(InventoryGeneral {
                    name: Some(name.to_string()),
                    asset_tag: None,
                    enrollment_method: None,
                }),
                hardware: Some(InventoryHardware {
                    serial_number: Some(serial_number.to_string()),
                    mac_address: None,
                    alt_mac_address: None,
                }),
            },
        );
    }

    pub async fn set_inventory(&self, inventory: ComputerInventory) {
        self.state
            .write()
            .await
            .inventories
            .insert(inventory.id, inventory);
    }

    pub async fn add_preload(&self, record: PreloadRecord) {
        self.state.write().await.preloads.push(record);
    }

    pub async fn add_enrollment_device(&self, instance_id: i64, serial_number: &str) {
        self.state.write().await.enrollment.push((
            instance_id,
            EnrollmentDevice {
                serial_number: serial_number.to_string(),
                ..Default::default()
            },
        ));
    }

    pub async fn add_building(&self, id: i64, name: &str) {
        self.state.write().await.buildings.push(Building {
            id,
            name: name.to_string(),
            ..Default::default()
        });
    }

    /// Make every call of `op` fail with an HTTP status
    pub async fn fail(&self, op: MdmOp, status: u16, body: &str) {
        self.state.write().await.failures.insert(
            op,
            Failure {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Delay every call of `op`
    pub async fn delay(&self, op: MdmOp, delay: Duration) {
        self.state.write().await.delays.insert(op, delay);
    }

    // ============== Inspection ==============

    pub async fn calls(&self) -> Vec<MdmCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn mutations(&self) -> Vec<MdmCall> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.op().is_mutation())
            .cloned()
            .collect()
    }

    pub async fn count(&self, op: MdmOp) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub async fn scope_of(&self, serial_number: &str) -> Option<i64> {
        self.state.read().await.scopes.get(serial_number).copied()
    }

    /// Record a call, then apply any injected delay and failure
    async fn enter(&self, call: MdmCall) -> Result<()> {
        let op = call.op();
        let (delay, failure) = {
            let mut state = self.state.write().await;
            state.calls.push(call);
            (
                state.delays.get(&op).copied(),
                state.failures.get(&op).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MdmGateway for MockMdm {
    async fn match_computers(&self, term: &str) -> Result<Vec<ComputerMatch>> {
        self.enter(MdmCall::MatchComputers(term.to_string()))
            .await?;
        let state = self.state.read().await;
        Ok(state
            .computers
            .iter()
            .filter(|c| c.serial_number.contains(term))
            .cloned()
            .collect())
    }

    async fn enrollment_instances(&self) -> Result<Vec<EnrollmentInstance>> {
        self.enter(MdmCall::EnrollmentInstances).await?;
        let state = self.state.read().await;
        let mut ids: Vec<i64> = state.enrollment.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids
            .into_iter()
            .map(|id| EnrollmentInstance { id, name: None })
            .collect())
    }

    async fn enrollment_devices(&self, instance_id: i64) -> Result<Vec<EnrollmentDevice>> {
        self.enter(MdmCall::EnrollmentDevices(instance_id)).await?;
        let state = self.state.read().await;
        Ok(state
            .enrollment
            .iter()
            .filter(|(id, _)| *id == instance_id)
            .map(|(_, device)| device.clone())
            .collect())
    }

    async fn computer_inventory(&self, computer_id: i64) -> Result<ComputerInventory> {
        self.enter(MdmCall::ComputerInventory(computer_id)).await?;
        self.state
            .read()
            .await
            .inventories
            .get(&computer_id)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                body: "Computer not found".to_string(),
            })
    }

    async fn prestages(&self) -> Result<Vec<PrestageDefinition>> {
        self.enter(MdmCall::Prestages).await?;
        Ok(self.state.read().await.prestages.clone())
    }

    async fn prestage_scopes(&self) -> Result<ScopeAssignments> {
        self.enter(MdmCall::PrestageScopes).await?;
        Ok(ScopeAssignments {
            serials_by_prestage_id: self.state.read().await.scopes.clone(),
        })
    }

    async fn preload_record(&self, serial_number: &str) -> Result<Option<PreloadRecord>> {
        self.enter(MdmCall::PreloadRecord(serial_number.to_string()))
            .await?;
        Ok(self
            .state
            .read()
            .await
            .preloads
            .iter()
            .find(|p| p.serial_number.as_deref() == Some(serial_number))
            .cloned())
    }

    async fn buildings(&self) -> Result<Vec<Building>> {
        self.enter(MdmCall::Buildings).await?;
        Ok(self.state.read().await.buildings.clone())
    }

    async fn add_to_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        self.enter(MdmCall::AddToScope {
            prestage_id,
            mutation: mutation.clone(),
        })
        .await?;
        let mut state = self.state.write().await;
        for serial in &mutation.serial_numbers {
            state.scopes.insert(serial.clone(), prestage_id);
        }
        Ok(json!({
            "prestageId": prestage_id.to_string(),
            "assignments": mutation.serial_numbers,
        }))
    }

    async fn remove_from_prestage_scope(
        &self,
        prestage_id: i64,
        mutation: &ScopeMutation,
    ) -> Result<Value> {
        self.enter(MdmCall::RemoveFromScope {
            prestage_id,
            mutation: mutation.clone(),
        })
        .await?;
        let mut state = self.state.write().await;
        for serial in &mutation.serial_numbers {
            if state.scopes.get(serial) == Some(&prestage_id) {
                state.scopes.remove(serial);
            }
        }
        Ok(json!({"prestageId": prestage_id.to_string(), "assignments": []}))
    }

    async fn update_inventory_detail(
        &self,
        computer_id: i64,
        update: &InventoryUpdate,
    ) -> Result<Value> {
        self.enter(MdmCall::UpdateInventoryDetail {
            computer_id,
            update: update.clone(),
        })
        .await?;
        Ok(json!({"id": computer_id.to_string()}))
    }

    async fn create_preload(&self, payload: &PreloadPayload) -> Result<Value> {
        self.enter(MdmCall::CreatePreload(payload.clone())).await?;
        let mut state = self.state.write().await;
        let id = state.preloads.len() as i64 + 1;
        state.preloads.push(PreloadRecord {
            id,
            serial_number: Some(payload.serial_number.clone()),
            ..Default::default()
        });
        let href = format!("/api/v2/inventory-preload/records/{}", id);
        Ok(json!({"id": id.to_string(), "href": href}))
    }

    async fn replace_preload(&self, preload_id: i64, payload: &PreloadPayload) -> Result<Value> {
        self.enter(MdmCall::ReplacePreload {
            preload_id,
            payload: payload.clone(),
        })
        .await?;
        Ok(json!({"id": preload_id.to_string(), "serialNumber": payload.serial_number}))
    }

    async fn erase_computer(&self, computer_id: i64) -> Result<Value> {
        self.enter(MdmCall::EraseComputer(computer_id)).await?;
        Ok(json!({"deviceId": computer_id.to_string(), "commandState": "PENDING"}))
    }

    async fn delete_computer(&self, computer_id: i64) -> Result<()> {
        self.enter(MdmCall::DeleteComputer(computer_id)).await?;
        let mut state = self.state.write().await;
        state.inventories.remove(&computer_id);
        state.computers.retain(|c| c.id != computer_id);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetCall {
    OpenSession,
    Search(String),
    UpdateState { asset_id: i64, states_id: i64 },
    KillSession,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetOp {
    OpenSession,
    Search,
    UpdateState,
    KillSession,
}

impl AssetCall {
    pub fn op(&self) -> AssetOp {
        match self {
            AssetCall::OpenSession => AssetOp::OpenSession,
            AssetCall::Search(_) => AssetOp::Search,
            AssetCall::UpdateState { .. } => AssetOp::UpdateState,
            AssetCall::KillSession => AssetOp::KillSession,
        }
    }
}

#[derive(Default)]
struct AssetState {
    records: Vec<AssetRecord>,
    states: HashMap<i64, i64>,
    failures: HashMap<AssetOp, Failure>,
    delays: HashMap<AssetOp, Duration>,
    calls: Vec<AssetCall>,
}

/// In-memory asset-management system
#[derive(Default)]
pub struct MockAsset {
    state: RwLock<AssetState>,
}

impl MockAsset {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_record(&self, id: i64, serial_number: &str) {
        self.state.write().await.records.push(AssetRecord {
            id,
            serial_number: Some(serial_number.to_string()),
        });
    }

    pub async fn fail(&self, op: AssetOp, status: u16, body: &str) {
        self.state.write().await.failures.insert(
            op,
            Failure {
                status,
                body: body.to_string(),
            },
        );
    }

    pub async fn delay(&self, op: AssetOp, delay: Duration) {
        self.state.write().await.delays.insert(op, delay);
    }

    pub async fn calls(&self) -> Vec<AssetCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn state_of(&self, asset_id: i64) -> Option<i64> {
        self.state.read().await.states.get(&asset_id).copied()
    }

    async fn enter(&self, call: AssetCall) -> Result<()> {
        let op = call.op();
        let (delay, failure) = {
            let mut state = self.state.write().await;
            state.calls.push(call);
            (
                state.delays.get(&op).copied(),
                state.failures.get(&op).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AssetGateway for MockAsset {
    async fn open_session(&self) -> Result<AssetSession> {
        self.enter(AssetCall::OpenSession).await?;
        Ok(AssetSession::new("mock-session"))
    }

    async fn search_by_serial(
        &self,
        _session: &AssetSession,
        serial_number: &str,
    ) -> Result<Vec<AssetRecord>> {
        self.enter(AssetCall::Search(serial_number.to_string()))
            .await?;
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.serial_number.as_deref() == Some(serial_number))
            .cloned()
            .collect())
    }

    async fn update_state(
        &self,
        _session: &AssetSession,
        asset_id: i64,
        states_id: i64,
    ) -> Result<Value> {
        self.enter(AssetCall::UpdateState {
            asset_id,
            states_id,
        })
        .await?;
        self.state.write().await.states.insert(asset_id, states_id);
        Ok(json!([{"id": asset_id, "message": ""}]))
    }

    async fn kill_session(&self, _session: AssetSession) -> Result<()> {
        self.enter(AssetCall::KillSession).await
    }
}

#[derive(Default)]
struct NacState {
    failures: HashMap<String, Failure>,
    delay: Option<Duration>,
    calls: Vec<String>,
}

/// In-memory NAC system
#[derive(Default)]
pub struct MockNac {
    state: RwLock<NacState>,
}

impl MockNac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the delete of one MAC address fail
    pub async fn fail_mac(&self, mac_address: &str, status: u16, body: &str) {
        self.state.write().await.failures.insert(
            mac_address.to_string(),
            Failure {
                status,
                body: body.to_string(),
            },
        );
    }

    pub async fn delay(&self, delay: Duration) {
        self.state.write().await.delay = Some(delay);
    }

    /// MAC addresses a delete was attempted for, in call order
    pub async fn calls(&self) -> Vec<String> {
        self.state.read().await.calls.clone()
    }
}

#[async_trait]
impl NacGateway for MockNac {
    async fn delete_endpoint(&self, mac_address: &str) -> Result<()> {
        let (delay, failure) = {
            let mut state = self.state.write().await;
            state.calls.push(mac_address.to_string());
            (state.delay, state.failures.get(mac_address).cloned())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}
