//! PractitionerRole network extraction: search entry → `practitionerRole,network` rows

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use plannet_core::Record;

use crate::error::MalformedEntry;

/// Extension URL of the Plan-Net network reference
pub const NETWORK_REFERENCE_URL: &str =
    "http://hl7.org/fhir/us/davinci-pdex-plan-net/StructureDefinition/network-reference";

/// Network name used when the reference has neither `display` nor `reference`
pub const UNKNOWN_NETWORK: &str = "Unknown";

// === Entry structs (deserialized from JSON) ===

#[derive(Debug, Deserialize)]
struct PractitionerRoleEntry {
    #[serde(default)]
    resource: Option<PractitionerRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PractitionerRole {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub extension: Option<Vec<Extension>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(rename = "valueReference", default)]
    pub value_reference: Option<Reference>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub display: Option<String>,
}

impl Extension {
    pub fn is_network_reference(&self) -> bool {
        self.url.as_deref() == Some(NETWORK_REFERENCE_URL)
    }

    /// `display`, then `reference`, then [`UNKNOWN_NETWORK`]
    pub fn network_name(&self) -> &str {
        self.value_reference
            .as_ref()
            .and_then(|r| r.display.as_deref().or(r.reference.as_deref()))
            .unwrap_or(UNKNOWN_NETWORK)
    }
}

impl PractitionerRole {
    pub fn network_extensions(&self) -> impl Iterator<Item = &Extension> {
        self.extension
            .iter()
            .flatten()
            .filter(|ext| ext.is_network_reference())
    }
}

// === Output row ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRow {
    #[serde(rename = "practitionerRole")]
    pub practitioner_role: String,
    pub network: String,
}

impl Record for NetworkRow {
    const COLUMNS: &'static [&'static str] = &["practitionerRole", "network"];
}

/// One row per network-reference extension of a practitioner-role entry.
///
/// A role without matching extensions yields no rows. An entry without a
/// `resource`, or with matches but no `id`, is [`MalformedEntry`].
pub fn extract_networks(entry: &Value) -> Result<Vec<NetworkRow>, MalformedEntry> {
    let role = PractitionerRoleEntry::deserialize(entry)?
        .resource
        .ok_or(MalformedEntry::MissingResource)?;

    let mut rows = Vec::new();
    for ext in role.network_extensions() {
        let id = role.id.as_deref().ok_or(MalformedEntry::MissingId)?;
        rows.push(NetworkRow {
            practitioner_role: id.to_string(),
            network: ext.network_name().to_string(),
        });
    }
    Ok(rows)
}

/// First row for each distinct network name, in input order
pub fn unique_by_network(rows: &[NetworkRow]) -> Vec<&NetworkRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.network.as_str()))
        .collect()
}
