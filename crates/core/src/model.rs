//! Entity model for the four record kinds and their soft-deleted variants.
//!
//! Records are stored as JSON with camelCase field names, matching the wire
//! format the frontend writes. Every record has a small set of required,
//! statically typed fields (the id and any back-references the cascade
//! engine matches on); all remaining profile fields ride along in an open
//! `extra` map so they survive round-trips untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// The four entity kinds managed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Device,
    Service,
    Document,
}

impl EntityKind {
    /// All kinds, in cascade order: the root kind first.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Customer,
        EntityKind::Device,
        EntityKind::Service,
        EntityKind::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Device => "device",
            Self::Service => "service",
            Self::Document => "document",
        }
    }

    /// The active collection holding live records of this kind.
    pub fn active(&self) -> Collection {
        Collection::Active(*self)
    }

    /// The shadow collection holding soft-deleted records of this kind.
    pub fn trash(&self) -> Collection {
        Collection::Trash(*self)
    }
}

impl std::str::FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" | "customers" => Ok(Self::Customer),
            "device" | "devices" => Ok(Self::Device),
            "service" | "services" => Ok(Self::Service),
            "document" | "documents" => Ok(Self::Document),
            other => Err(crate::Error::UnknownEntityKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named record collection in the persistence adapter.
///
/// Active collections are named after the entity kind; shadow collections
/// use the `deleted_<kind>` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Active(EntityKind),
    Trash(EntityKind),
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Active(EntityKind::Customer) => "customers",
            Self::Active(EntityKind::Device) => "devices",
            Self::Active(EntityKind::Service) => "services",
            Self::Active(EntityKind::Document) => "documents",
            Self::Trash(EntityKind::Customer) => "deleted_customers",
            Self::Trash(EntityKind::Device) => "deleted_devices",
            Self::Trash(EntityKind::Service) => "deleted_services",
            Self::Trash(EntityKind::Document) => "deleted_documents",
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Active(kind) | Self::Trash(kind) => *kind,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A record kind the trash subsystem can move, restore and purge.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Unique record id.
    fn id(&self) -> &str;
}

/// A customer record. Owns devices, services and documents by back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    /// Name, contact, address, tax id and any other profile fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Customer {
    const KIND: EntityKind = EntityKind::Customer;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A device record. `owner` points at the owning customer's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub owner: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Device {
    const KIND: EntityKind = EntityKind::Device;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A repair-service record, referencing its customer and optionally a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Service {
    const KIND: EntityKind = EntityKind::Service;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A fiscal document record, referencing its customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub customer_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Document {
    const KIND: EntityKind = EntityKind::Document;

    fn id(&self) -> &str {
        &self.id
    }
}

/// The shadow variant of a record: the original fields plus deletion metadata.
///
/// Root tombstones carry only `deleted_at`. Dependents removed as part of a
/// cascade additionally carry the id of the root that dragged them along,
/// which restore and purge use as a pure lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: DeserializeOwned"))]
pub struct Trashed<R> {
    #[serde(flatten)]
    pub record: R,
    #[serde(with = "time::serde::rfc3339")]
    pub deleted_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_with_customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_with_device: Option<String>,
}

impl<R: Entity> Trashed<R> {
    /// Tombstone a root record.
    pub fn root(record: R, deleted_at: OffsetDateTime) -> Self {
        Self {
            record,
            deleted_at,
            deleted_with_customer: None,
            deleted_with_device: None,
        }
    }

    /// Tombstone a dependent dragged along by a customer-rooted cascade.
    pub fn with_customer(record: R, deleted_at: OffsetDateTime, customer_id: &str) -> Self {
        Self {
            record,
            deleted_at,
            deleted_with_customer: Some(customer_id.to_string()),
            deleted_with_device: None,
        }
    }

    /// Tombstone a dependent dragged along by a device-rooted cascade.
    pub fn with_device(record: R, deleted_at: OffsetDateTime, device_id: &str) -> Self {
        Self {
            record,
            deleted_at,
            deleted_with_customer: None,
            deleted_with_device: Some(device_id.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Strip the deletion metadata, yielding the bare record for restore.
    pub fn into_record(self) -> R {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn collection_names_follow_deleted_prefix_convention() {
        assert_eq!(EntityKind::Customer.active().name(), "customers");
        assert_eq!(EntityKind::Customer.trash().name(), "deleted_customers");
        assert_eq!(EntityKind::Document.trash().name(), "deleted_documents");
        for kind in EntityKind::ALL {
            assert_eq!(kind.trash().name(), format!("deleted_{}", kind.active()));
        }
    }

    #[test]
    fn entity_kind_parses_singular_and_plural() {
        assert_eq!("devices".parse::<EntityKind>().unwrap(), EntityKind::Device);
        assert_eq!("device".parse::<EntityKind>().unwrap(), EntityKind::Device);
        assert!("gadgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn service_round_trips_camel_case_and_extras() {
        let raw = json!({
            "id": "svc-1",
            "customerId": "cust-1",
            "deviceId": "dev-1",
            "status": "in_progress",
            "scheduledDate": "2025-03-01"
        });

        let service: Service = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(service.customer_id, "cust-1");
        assert_eq!(service.device_id.as_deref(), Some("dev-1"));
        assert_eq!(service.extra["status"], "in_progress");

        let back = serde_json::to_value(&service).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn service_without_device_omits_the_field() {
        let service = Service {
            id: "svc-1".to_string(),
            customer_id: "cust-1".to_string(),
            device_id: None,
            extra: Map::new(),
        };
        let value = serde_json::to_value(&service).unwrap();
        assert!(value.get("deviceId").is_none());
    }

    #[test]
    fn trashed_dependent_carries_back_reference() {
        let device = Device {
            id: "dev-1".to_string(),
            owner: "cust-1".to_string(),
            extra: Map::new(),
        };
        let at = datetime!(2025-01-15 12:00:00 UTC);
        let trashed = Trashed::with_customer(device, at, "cust-1");

        let value = serde_json::to_value(&trashed).unwrap();
        assert_eq!(value["deletedAt"], "2025-01-15T12:00:00Z");
        assert_eq!(value["deletedWithCustomer"], "cust-1");
        assert!(value.get("deletedWithDevice").is_none());

        let parsed: Trashed<Device> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.deleted_at, at);
        assert_eq!(parsed.deleted_with_customer.as_deref(), Some("cust-1"));
    }

    #[test]
    fn into_record_strips_deletion_metadata() {
        let raw = json!({
            "id": "cust-1",
            "name": "Maria",
            "deletedAt": "2025-01-15T12:00:00Z"
        });
        let trashed: Trashed<Customer> = serde_json::from_value(raw).unwrap();
        let customer = trashed.into_record();

        let value = serde_json::to_value(&customer).unwrap();
        assert!(value.get("deletedAt").is_none());
        assert_eq!(value["name"], "Maria");
    }
}
