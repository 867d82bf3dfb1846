//! Entity type enumeration and detected-entity span.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Closed enumeration of sensitive entity tags, plus an escape hatch for
/// plugin-declared tags that aren't part of the core taxonomy.
///
/// Serializes as its SCREAMING_SNAKE_CASE wire tag (see `as_wire_str`);
/// `Plugin(tag)` serializes as `tag` verbatim so firm-supplied recognizer
/// tags round-trip without a wrapper shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
    PhoneNumber,
    Email,
    CreditCard,
    Ssn,
    MonetaryAmount,
    AccountNumber,
    IpAddress,
    MedicalRecord,
    PassportNumber,
    DriversLicense,
    MatterNumber,
    ClientMatterPair,
    PrivilegeMarker,
    DealCodename,
    OpposingCounsel,
    ApiKey,
    DatabaseUri,
    AuthToken,
    PrivateKey,
    AwsCredential,
    GcpCredential,
    AzureCredential,
    /// A tag declared by a plugin recognizer, not part of the core taxonomy.
    Plugin(String),
}

impl EntityType {
    /// Canonical wire-format string.
    pub fn as_wire_str(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Location => "LOCATION",
            EntityType::Date => "DATE",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Email => "EMAIL",
            EntityType::CreditCard => "CREDIT_CARD",
            EntityType::Ssn => "SSN",
            EntityType::MonetaryAmount => "MONETARY_AMOUNT",
            EntityType::AccountNumber => "ACCOUNT_NUMBER",
            EntityType::IpAddress => "IP_ADDRESS",
            EntityType::MedicalRecord => "MEDICAL_RECORD",
            EntityType::PassportNumber => "PASSPORT_NUMBER",
            EntityType::DriversLicense => "DRIVERS_LICENSE",
            EntityType::MatterNumber => "MATTER_NUMBER",
            EntityType::ClientMatterPair => "CLIENT_MATTER_PAIR",
            EntityType::PrivilegeMarker => "PRIVILEGE_MARKER",
            EntityType::DealCodename => "DEAL_CODENAME",
            EntityType::OpposingCounsel => "OPPOSING_COUNSEL",
            EntityType::ApiKey => "API_KEY",
            EntityType::DatabaseUri => "DATABASE_URI",
            EntityType::AuthToken => "AUTH_TOKEN",
            EntityType::PrivateKey => "PRIVATE_KEY",
            EntityType::AwsCredential => "AWS_CREDENTIAL",
            EntityType::GcpCredential => "GCP_CREDENTIAL",
            EntityType::AzureCredential => "AZURE_CREDENTIAL",
            EntityType::Plugin(tag) => tag.as_str(),
        }
    }

    /// Parse a wire-format tag back into a type. Unknown tags become
    /// `Plugin(tag)` rather than failing — plugin vocabularies are open.
    pub fn from_wire_str(tag: &str) -> EntityType {
        match tag {
            "PERSON" => EntityType::Person,
            "ORGANIZATION" => EntityType::Organization,
            "LOCATION" => EntityType::Location,
            "DATE" => EntityType::Date,
            "PHONE_NUMBER" => EntityType::PhoneNumber,
            "EMAIL" => EntityType::Email,
            "CREDIT_CARD" => EntityType::CreditCard,
            "SSN" => EntityType::Ssn,
            "MONETARY_AMOUNT" => EntityType::MonetaryAmount,
            "ACCOUNT_NUMBER" => EntityType::AccountNumber,
            "IP_ADDRESS" => EntityType::IpAddress,
            "MEDICAL_RECORD" => EntityType::MedicalRecord,
            "PASSPORT_NUMBER" => EntityType::PassportNumber,
            "DRIVERS_LICENSE" => EntityType::DriversLicense,
            "MATTER_NUMBER" => EntityType::MatterNumber,
            "CLIENT_MATTER_PAIR" => EntityType::ClientMatterPair,
            "PRIVILEGE_MARKER" => EntityType::PrivilegeMarker,
            "DEAL_CODENAME" => EntityType::DealCodename,
            "OPPOSING_COUNSEL" => EntityType::OpposingCounsel,
            "API_KEY" => EntityType::ApiKey,
            "DATABASE_URI" => EntityType::DatabaseUri,
            "AUTH_TOKEN" => EntityType::AuthToken,
            "PRIVATE_KEY" => EntityType::PrivateKey,
            "AWS_CREDENTIAL" => EntityType::AwsCredential,
            "GCP_CREDENTIAL" => EntityType::GcpCredential,
            "AZURE_CREDENTIAL" => EntityType::AzureCredential,
            other => EntityType::Plugin(other.to_string()),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(EntityType::from_wire_str(&tag))
    }
}

/// Where a candidate or accepted entity span came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Regex,
    Plugin,
    ClientMatter,
    Model,
}

impl EntitySource {
    /// Tie-break priority when confidences are equal (higher wins):
    /// regex > plugin > client_matter > model.
    pub fn priority(self) -> u8 {
        match self {
            EntitySource::Regex => 3,
            EntitySource::Plugin => 2,
            EntitySource::ClientMatter => 1,
            EntitySource::Model => 0,
        }
    }
}

/// A span of text identified as a sensitive entity.
///
/// Invariants (enforced by construction in `irongate-core`, not here):
/// `0 <= start < end <= text.chars().count()` and `text` is the exact
/// Unicode-scalar-value slice `input[start..end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub entity_type: EntityType,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
    pub source: EntitySource,
}

impl DetectedEntity {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if this span overlaps `other` at all.
    pub fn overlaps(&self, other: &DetectedEntity) -> bool {
        self.start < other.end && other.start < self.end
    }
}
