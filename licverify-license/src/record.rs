//! License records and their canonical byte form.
//!
//! A record is serialized as compact JSON with a fixed key order:
//!
//! ```text
//! ID, CreationTime, ExpirationTime, Description, InstanceID, SubscriptionID,
//! (SKU | ProductPlanUniqueID, OrganizationID), Version
//! ```
//!
//! The product key set depends on the record's [`LicenseSchema`]. Absent text
//! fields serialize as `""`. These bytes are what gets signed, so a parsed
//! record re-serializes to exactly the bytes it was parsed from whenever the
//! input was itself canonical.

use crate::error::{LicenseError, LicenseResult};
use crate::timestamp::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Which product identification keys a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LicenseSchema {
    /// `ProductPlanUniqueID` plus `OrganizationID`.
    #[default]
    ProductPlan,
    /// Legacy `SKU` key, no organization.
    Sku,
}

/// The issuer-chosen contents of a new license.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseTerms {
    /// Organization the license is issued to.
    pub organization_id: String,
    /// Product plan (or SKU) the license grants.
    pub product_plan_id: String,
    /// Deployment instance the license is bound to.
    pub instance_id: String,
    /// Billing subscription backing the license.
    pub subscription_id: String,
    /// Free-form description.
    pub description: String,
    /// Which key set the record serializes with.
    pub schema: LicenseSchema,
}

/// A license record as signed by the licensing service.
///
/// Timestamps are kept as the exact strings that were signed and parsed on
/// demand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireRecordIn")]
pub struct LicenseRecord {
    id: String,
    creation_time: String,
    expiration_time: String,
    description: String,
    instance_id: String,
    subscription_id: String,
    product_plan_id: String,
    organization_id: String,
    version: u64,
    schema: LicenseSchema,
}

impl LicenseRecord {
    /// Creates a version 1 record with a fresh UUID v4 identifier.
    #[must_use]
    pub fn new(
        terms: LicenseTerms,
        creation_time: DateTime<Utc>,
        expiration_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            creation_time: format_timestamp(creation_time),
            expiration_time: format_timestamp(expiration_time),
            description: terms.description,
            instance_id: terms.instance_id,
            subscription_id: terms.subscription_id,
            product_plan_id: terms.product_plan_id,
            organization_id: match terms.schema {
                LicenseSchema::ProductPlan => terms.organization_id,
                LicenseSchema::Sku => String::new(),
            },
            version: 1,
            schema: terms.schema,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the creation time exactly as stored.
    #[must_use]
    pub fn creation_time_raw(&self) -> &str {
        &self.creation_time
    }

    /// Returns the expiration time exactly as stored.
    #[must_use]
    pub fn expiration_time_raw(&self) -> &str {
        &self.expiration_time
    }

    /// Parses the creation time.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidLicense`] if the stored value is not a
    /// valid timestamp.
    pub fn creation_time(&self) -> LicenseResult<DateTime<Utc>> {
        parse_timestamp(&self.creation_time).map_err(|e| {
            LicenseError::InvalidLicense(format!(
                "invalid creation time {:?}: {e}",
                self.creation_time
            ))
        })
    }

    /// Parses the expiration time.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidLicense`] if the stored value is not a
    /// valid timestamp.
    pub fn expiration_time(&self) -> LicenseResult<DateTime<Utc>> {
        parse_timestamp(&self.expiration_time).map_err(|e| {
            LicenseError::InvalidLicense(format!(
                "invalid expiration time {:?}: {e}",
                self.expiration_time
            ))
        })
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Returns the product plan ID (the `SKU` value for legacy records).
    #[must_use]
    pub fn product_plan_id(&self) -> &str {
        &self.product_plan_id
    }

    /// Returns the organization ID; always empty for [`LicenseSchema::Sku`].
    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn schema(&self) -> LicenseSchema {
        self.schema
    }

    /// Checks required fields and any expected identifiers.
    ///
    /// `None` or empty expected values match anything.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::MissingFields`] if `ID`, `CreationTime` or
    ///   `ExpirationTime` is empty, regardless of the other checks.
    /// - [`LicenseError::InvalidLicense`] naming the first mismatching field,
    ///   or an unparseable timestamp.
    pub fn fields_match(
        &self,
        organization_id: Option<&str>,
        product_plan_id: Option<&str>,
        instance_id: Option<&str>,
    ) -> LicenseResult<()> {
        let missing: Vec<&str> = [
            ("ID", &self.id),
            ("CreationTime", &self.creation_time),
            ("ExpirationTime", &self.expiration_time),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(LicenseError::MissingFields(missing.join(", ")));
        }

        check_field("organization ID", organization_id, &self.organization_id)?;
        check_field("product plan ID", product_plan_id, &self.product_plan_id)?;
        check_field("instance ID", instance_id, &self.instance_id)?;

        self.creation_time()?;
        self.expiration_time()?;
        Ok(())
    }

    /// Returns true if `at` is strictly after the expiration time.
    ///
    /// An unparseable expiration time counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.expiration_time().map_or(true, |expires| at > expires)
    }

    /// [`LicenseRecord::is_expired_at`] against the system clock.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Restarts the license: creation time becomes now, the expiration time
    /// is replaced and the version is incremented.
    pub fn renew(&mut self, expiration_time: DateTime<Utc>) {
        self.creation_time = format_timestamp(Utc::now());
        self.expiration_time = format_timestamp(expiration_time);
        self.version = self.version.saturating_add(1);
    }

    /// Returns the canonical JSON bytes that are signed and verified.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] if JSON encoding fails.
    pub fn canonical_bytes(&self) -> LicenseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn check_field(name: &str, expected: Option<&str>, actual: &str) -> LicenseResult<()> {
    match expected {
        Some(expected) if !expected.is_empty() && expected != actual => {
            Err(LicenseError::InvalidLicense(format!(
                "{name} mismatch: expected {expected:?}, license has {actual:?}"
            )))
        }
        _ => Ok(()),
    }
}

impl Serialize for LicenseRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (sku, product_plan_id, organization_id) = match self.schema {
            LicenseSchema::ProductPlan => (
                None,
                Some(self.product_plan_id.as_str()),
                Some(self.organization_id.as_str()),
            ),
            LicenseSchema::Sku => (Some(self.product_plan_id.as_str()), None, None),
        };
        WireRecordOut {
            id: &self.id,
            creation_time: &self.creation_time,
            expiration_time: &self.expiration_time,
            description: &self.description,
            instance_id: &self.instance_id,
            subscription_id: &self.subscription_id,
            sku,
            product_plan_id,
            organization_id,
            version: self.version,
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct WireRecordOut<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    #[serde(rename = "CreationTime")]
    creation_time: &'a str,
    #[serde(rename = "ExpirationTime")]
    expiration_time: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "InstanceID")]
    instance_id: &'a str,
    #[serde(rename = "SubscriptionID")]
    subscription_id: &'a str,
    #[serde(rename = "SKU", skip_serializing_if = "Option::is_none")]
    sku: Option<&'a str>,
    #[serde(rename = "ProductPlanUniqueID", skip_serializing_if = "Option::is_none")]
    product_plan_id: Option<&'a str>,
    #[serde(rename = "OrganizationID", skip_serializing_if = "Option::is_none")]
    organization_id: Option<&'a str>,
    #[serde(rename = "Version")]
    version: u64,
}

#[derive(Deserialize)]
struct WireRecordIn {
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "CreationTime")]
    creation_time: Option<String>,
    #[serde(rename = "ExpirationTime")]
    expiration_time: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "InstanceID")]
    instance_id: Option<String>,
    #[serde(rename = "SubscriptionID")]
    subscription_id: Option<String>,
    #[serde(rename = "SKU")]
    sku: Option<String>,
    #[serde(rename = "ProductPlanUniqueID")]
    product_plan_id: Option<String>,
    #[serde(rename = "OrganizationID")]
    organization_id: Option<String>,
    #[serde(rename = "Version")]
    version: Option<u64>,
}

impl From<WireRecordIn> for LicenseRecord {
    fn from(wire: WireRecordIn) -> Self {
        let product_plan_keys = wire.product_plan_id.is_some() || wire.organization_id.is_some();
        let (schema, product_plan_id) = if !product_plan_keys && wire.sku.is_some() {
            (LicenseSchema::Sku, wire.sku)
        } else {
            (LicenseSchema::ProductPlan, wire.product_plan_id)
        };

        Self {
            id: wire.id.unwrap_or_default(),
            creation_time: wire.creation_time.unwrap_or_default(),
            expiration_time: wire.expiration_time.unwrap_or_default(),
            description: wire.description.unwrap_or_default(),
            instance_id: wire.instance_id.unwrap_or_default(),
            subscription_id: wire.subscription_id.unwrap_or_default(),
            product_plan_id: product_plan_id.unwrap_or_default(),
            organization_id: wire.organization_id.unwrap_or_default(),
            version: wire.version.unwrap_or_default(),
            schema,
        }
    }
}
