//! # System Constants
//!
//! Well-known parameter-store keys, provider literals and the reserved OU names that
//! define the operational boundaries of the account request lifecycle engine.

/// Parameter-store keys resolved once per invocation into
/// [`RuntimeParameters`](crate::config::RuntimeParameters).
pub mod parameters {
    pub const ACCOUNT_REQUEST_QUEUE: &str = "/aft/resources/sqs/aft-request-queue-name";
    pub const ACCOUNT_FACTORY_PRODUCT_NAME: &str = "/aft/resources/sc/account-factory-product-name";
    pub const ACCOUNT_REQUEST_TABLE: &str = "/aft/resources/ddb/aft-request-table-name";
    pub const CLEANUP_RESOURCES_FUNCTION: &str = "/aft/resources/lambda/aft-cleanup-resources";
    pub const PROVISIONING_FRAMEWORK_FUNCTION: &str =
        "/aft/resources/lambda/aft-invoke-aft-account-provisioning-framework";
    pub const PROVISIONING_THRESHOLD: &str =
        "/aft/config/account-provisioning/maximum-concurrent-provisioning";

    // Shared (protected) infrastructure accounts
    pub const CT_MANAGEMENT_ACCOUNT_ID: &str = "/aft/account/ct-management/account-id";
    pub const AUDIT_ACCOUNT_ID: &str = "/aft/account/audit/account-id";
    pub const LOG_ARCHIVE_ACCOUNT_ID: &str = "/aft/account/log-archive/account-id";
}

/// Keys inside `control_tower_parameters`
pub mod ct_parameters {
    pub const ACCOUNT_EMAIL: &str = "AccountEmail";
    pub const ACCOUNT_NAME: &str = "AccountName";
    pub const MANAGED_ORGANIZATIONAL_UNIT: &str = "ManagedOrganizationalUnit";
}

/// Literals exchanged with the account-vending provider
pub mod provider {
    /// Product type of vended accounts in the product catalog
    pub const CONTROL_TOWER_ACCOUNT_PRODUCT_TYPE: &str = "CONTROL_TOWER_ACCOUNT";

    /// Output key carrying the vended account's email
    pub const ACCOUNT_EMAIL_OUTPUT_KEY: &str = "AccountEmail";

    /// Only event source accepted on the account request change log
    pub const CHANGE_LOG_EVENT_SOURCE: &str = "aws:dynamodb";
}

/// Reserved name of the organization root
pub const ROOT_OU: &str = "Root";

/// Operation name used when a work item creates a new account
pub const OPERATION_ADD: &str = "ADD";

/// Operation name used when a work item updates an existing account
pub const OPERATION_UPDATE: &str = "UPDATE";
