//! Display sentinels shared by the query and orchestration layers.

/// Prestage display name reported for devices without a scope assignment.
pub const UNASSIGNED: &str = "Unassigned";

/// Placeholder for descriptive fields the upstream did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Asset tag shown for devices known only to device enrollment.
pub const NO_ASSET_TAG_YET: &str = "No asset tag yet";

/// Enrollment method shown when inventory carries none.
pub const NO_ENROLLMENT_METHOD: &str = "No enrollment method found";

/// Default conflict message when the MDM rejects a scope add without a body.
pub const REMOVE_BEFORE_ADD: &str = "Please remove from current prestage before adding";

/// Advisory message when the inventory patch after a preload upsert fails.
pub const COMPUTER_UPDATE_FAILED: &str = "Failed to update computer information";

/// Message returned when a device search yields nothing.
pub const NO_COMPUTERS_FOUND: &str = "No computers found";
