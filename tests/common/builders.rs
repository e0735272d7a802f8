//! Builders for change-log events, request images and provisioned products.

use account_lifecycle::models::{
    marshal_image, AccountRequestImage, ControlTowerParameters, EventKind, ProductStatus,
    ProvisionedProductSummary,
};
use serde_json::{json, Value};

/// Builder for account request images
pub struct RequestImageBuilder {
    email: String,
    name: String,
    ou: String,
    extensions: Vec<(String, String)>,
    custom_fields: Vec<(String, Value)>,
}

impl RequestImageBuilder {
    pub fn new(email: &str, name: &str, ou: &str) -> Self {
        Self {
            email: email.to_string(),
            name: name.to_string(),
            ou: ou.to_string(),
            extensions: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    pub fn with_extension(mut self, key: &str, value: &str) -> Self {
        self.extensions.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_custom_field(mut self, key: &str, value: Value) -> Self {
        self.custom_fields.push((key.to_string(), value));
        self
    }

    pub fn build(self) -> AccountRequestImage {
        let mut parameters = ControlTowerParameters::new(&self.email, &self.name, &self.ou);
        for (key, value) in self.extensions {
            parameters = parameters.with_extension(key, value);
        }
        let mut image = AccountRequestImage::new(&self.email, parameters);
        image.custom_fields.extend(self.custom_fields);
        image
    }
}

/// A change-log notification in the provider's tagged wire encoding
pub fn change_log_event(
    kind: EventKind,
    old_image: Option<&AccountRequestImage>,
    new_image: Option<&AccountRequestImage>,
) -> Value {
    let mut images = serde_json::Map::new();
    if let Some(image) = old_image {
        images.insert("OldImage".to_string(), tagged(image));
    }
    if let Some(image) = new_image {
        images.insert("NewImage".to_string(), tagged(image));
    }

    json!({
        "Records": [{
            "eventName": kind.to_string(),
            "eventSource": "aws:dynamodb",
            "dynamodb": images,
        }]
    })
}

fn tagged(image: &AccountRequestImage) -> Value {
    let native = image.to_json();
    let object = native.as_object().cloned().unwrap_or_default();
    serde_json::to_value(marshal_image(&object)).expect("tagged image serializes")
}

/// Builder for provisioned products in the catalog
pub struct ProvisionedProductBuilder {
    product: ProvisionedProductSummary,
}

impl ProvisionedProductBuilder {
    pub fn new(id: &str, email: &str) -> Self {
        Self {
            product: ProvisionedProductSummary {
                id: id.to_string(),
                name: id.to_string(),
                product_id: "prod-acctfactory".to_string(),
                product_type: "CONTROL_TOWER_ACCOUNT".to_string(),
                status: ProductStatus::Available,
                provisioning_artifact_id: "pa-current".to_string(),
                last_successful_provisioning_record_id: Some(format!("rec-{id}")),
                account_email: Some(email.to_string()),
            },
        }
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.product.status = status;
        self
    }

    pub fn never_succeeded(mut self) -> Self {
        self.product.last_successful_provisioning_record_id = None;
        self
    }

    pub fn with_product_type(mut self, product_type: &str) -> Self {
        self.product.product_type = product_type.to_string();
        self
    }

    pub fn build(self) -> ProvisionedProductSummary {
        self.product
    }
}
