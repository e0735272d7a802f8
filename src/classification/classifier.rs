//! # Event Classifier
//!
//! Maps one account request record to exactly one [`LifecycleAction`].
//!
//! ## Decision order
//!
//! The raw conditions overlap, so the first matching rule wins:
//!
//! 1. `REMOVE` event: [`LifecycleAction::Remove`]
//! 2. parameters unchanged and the account is a shared account: customization only
//! 3. create with no healthy provisioned product: [`LifecycleAction::EnqueueCreate`]
//! 4. create with a healthy provisioned product: customization only (import path)
//! 5. update with changed parameters: [`LifecycleAction::EnqueueUpdate`]
//! 6. update with unchanged parameters: customization only
//! 7. anything else is unsupported and surfaces as [`ClassificationError::Unsupported`]
//!
//! "Changed" ignores `ManagedOrganizationalUnit`: an OU move alone does not
//! re-provision the account.
//!
//! Provider reads happen only when a rule needs them. A `REMOVE` record costs no
//! provider call at all, and the existence oracle is consulted for creates only.

use super::action::LifecycleAction;
use super::shared_accounts::ProtectedAccounts;
use crate::error::ClassificationError;
use crate::models::{AccountRequestRecord, EventKind};
use crate::providers::ProviderResult;
use crate::provisioning::ProvisioningStatusOracle;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Whether a healthy vended account exists for an email
#[async_trait]
pub trait AccountExistence: Send + Sync + fmt::Debug {
    async fn healthy_product_exists(&self, account_email: &str) -> ProviderResult<bool>;
}

#[async_trait]
impl AccountExistence for ProvisioningStatusOracle {
    async fn healthy_product_exists(&self, account_email: &str) -> ProviderResult<bool> {
        self.exists(account_email).await
    }
}

/// Everything the decision table looks at, already evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFacts {
    pub event_kind: EventKind,
    pub is_create: bool,
    pub is_update: bool,
    pub control_tower_parameters_changed: bool,
    pub protected: bool,
    pub product_exists: bool,
}

/// The decision table itself, free of I/O
pub fn decide(facts: RecordFacts) -> LifecycleAction {
    let changed = facts.control_tower_parameters_changed;

    if facts.event_kind == EventKind::Remove {
        LifecycleAction::Remove
    } else if !changed && facts.protected {
        LifecycleAction::InvokeCustomizationOnly
    } else if facts.is_create && !facts.product_exists {
        LifecycleAction::EnqueueCreate
    } else if facts.is_create && !changed {
        LifecycleAction::InvokeCustomizationOnly
    } else if facts.is_update && changed {
        LifecycleAction::EnqueueUpdate
    } else if facts.is_update {
        LifecycleAction::InvokeCustomizationOnly
    } else {
        LifecycleAction::Unsupported
    }
}

#[derive(Debug, Clone)]
pub struct EventClassifier {
    existence: Arc<dyn AccountExistence>,
    protected_accounts: Arc<dyn ProtectedAccounts>,
}

impl EventClassifier {
    pub fn new(
        existence: Arc<dyn AccountExistence>,
        protected_accounts: Arc<dyn ProtectedAccounts>,
    ) -> Self {
        Self {
            existence,
            protected_accounts,
        }
    }

    #[instrument(skip_all, fields(event_kind = %record.event_kind))]
    pub async fn classify(&self, record: &AccountRequestRecord) -> Result<LifecycleAction, ClassificationError> {
        let facts = self.gather_facts(record).await?;
        let action = decide(facts);

        if action == LifecycleAction::Unsupported {
            return Err(ClassificationError::unsupported(
                record.event_kind,
                format!(
                    "create={} update={} control_tower_parameters_changed={}",
                    facts.is_create, facts.is_update, facts.control_tower_parameters_changed
                ),
            ));
        }

        info!(
            action = %action,
            account_email = record.account_email().unwrap_or_default(),
            "🧭 Account request classified"
        );
        Ok(action)
    }

    async fn gather_facts(&self, record: &AccountRequestRecord) -> Result<RecordFacts, ClassificationError> {
        let mut facts = RecordFacts {
            event_kind: record.event_kind,
            is_create: record.is_create(),
            is_update: record.is_update(),
            control_tower_parameters_changed: record.control_tower_parameters_changed(),
            protected: false,
            product_exists: false,
        };
        if facts.event_kind == EventKind::Remove {
            return Ok(facts);
        }

        let Some(new_image) = &record.new_image else {
            return Ok(facts);
        };
        let parameters = &new_image.control_tower_parameters;

        if !facts.control_tower_parameters_changed {
            facts.protected = self.protected_accounts.is_protected(parameters).await?;
            if facts.protected {
                return Ok(facts);
            }
        }

        if facts.is_create {
            facts.product_exists = self
                .existence
                .healthy_product_exists(&parameters.account_email)
                .await?;
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountRequestImage, ControlTowerParameters};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct FixedExistence {
        exists: bool,
        asked: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AccountExistence for FixedExistence {
        async fn healthy_product_exists(&self, account_email: &str) -> ProviderResult<bool> {
            self.asked.lock().push(account_email.to_string());
            Ok(self.exists)
        }
    }

    #[derive(Debug, Default)]
    struct FixedProtection {
        protected: bool,
    }

    #[async_trait]
    impl ProtectedAccounts for FixedProtection {
        async fn is_protected(&self, _parameters: &ControlTowerParameters) -> Result<bool, ClassificationError> {
            Ok(self.protected)
        }
    }

    fn image(email: &str, name: &str, ou: &str) -> AccountRequestImage {
        AccountRequestImage::new(email, ControlTowerParameters::new(email, name, ou))
    }

    fn classifier(exists: bool, protected: bool) -> (EventClassifier, Arc<FixedExistence>) {
        let existence = Arc::new(FixedExistence {
            exists,
            ..FixedExistence::default()
        });
        let classifier = EventClassifier::new(existence.clone(), Arc::new(FixedProtection { protected }));
        (classifier, existence)
    }

    #[tokio::test]
    async fn test_remove_needs_no_provider_reads() {
        let (classifier, existence) = classifier(true, true);
        let record = AccountRequestRecord::remove(image("a@x.com", "Team-A", "Sandbox"));

        assert_eq!(classifier.classify(&record).await.unwrap(), LifecycleAction::Remove);
        assert!(existence.asked.lock().is_empty());
    }

    #[tokio::test]
    async fn test_create_depends_on_existing_product() {
        let record = AccountRequestRecord::insert(image("a@x.com", "Team-A", "Sandbox"));

        let (fresh, existence) = classifier(false, false);
        assert_eq!(fresh.classify(&record).await.unwrap(), LifecycleAction::EnqueueCreate);
        assert_eq!(*existence.asked.lock(), vec!["a@x.com".to_string()]);

        let (imported, _) = classifier(true, false);
        assert_eq!(
            imported.classify(&record).await.unwrap(),
            LifecycleAction::InvokeCustomizationOnly
        );
    }

    #[tokio::test]
    async fn test_update_ignores_ou_moves() {
        let (classifier, existence) = classifier(true, false);

        let moved = AccountRequestRecord::modify(
            image("a@x.com", "Team-A", "Sandbox"),
            image("a@x.com", "Team-A", "Prod"),
        );
        assert_eq!(
            classifier.classify(&moved).await.unwrap(),
            LifecycleAction::InvokeCustomizationOnly
        );

        let renamed = AccountRequestRecord::modify(
            image("a@x.com", "Team-A", "Sandbox"),
            image("a@x.com", "Team-B", "Sandbox"),
        );
        assert_eq!(
            classifier.classify(&renamed).await.unwrap(),
            LifecycleAction::EnqueueUpdate
        );
        assert!(existence.asked.lock().is_empty());
    }

    #[tokio::test]
    async fn test_protected_account_short_circuits_create() {
        let (classifier, existence) = classifier(false, true);
        let record = AccountRequestRecord::insert(image("audit@x.com", "Audit", "Security"));

        assert_eq!(
            classifier.classify(&record).await.unwrap(),
            LifecycleAction::InvokeCustomizationOnly
        );
        assert!(existence.asked.lock().is_empty());
    }

    #[tokio::test]
    async fn test_record_without_images_is_unsupported() {
        let (classifier, _) = classifier(false, false);
        let record = AccountRequestRecord {
            event_kind: EventKind::Insert,
            old_image: None,
            new_image: None,
        };

        assert!(matches!(
            classifier.classify(&record).await,
            Err(ClassificationError::Unsupported { event_kind: EventKind::Insert, .. })
        ));
    }

    #[test]
    fn test_changed_create_with_existing_product_is_unsupported() {
        let facts = RecordFacts {
            event_kind: EventKind::Insert,
            is_create: true,
            is_update: false,
            control_tower_parameters_changed: true,
            protected: false,
            product_exists: true,
        };
        assert_eq!(decide(facts), LifecycleAction::Unsupported);
    }
}
