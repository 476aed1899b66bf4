//! Organization entry flattening: search entry → `id,name,identifiers` row

use serde::{Deserialize, Serialize};
use serde_json::Value;

use plannet_core::Record;

use crate::error::MalformedEntry;

/// Separator between identifier values in the `identifiers` column
pub const IDENTIFIER_SEPARATOR: &str = ", ";

// === Entry structs (deserialized from JSON) ===

#[derive(Debug, Default, Deserialize)]
struct OrganizationEntry {
    #[serde(default)]
    resource: Option<Organization>,
}

/// The subset of a FHIR Organization the export reads
#[derive(Debug, Default, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub identifier: Option<Vec<Identifier>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Identifier {
    #[serde(default)]
    pub value: Option<String>,
}

impl Organization {
    /// Identifier values joined by [`IDENTIFIER_SEPARATOR`]; valueless ones count as `""`
    pub fn joined_identifiers(&self) -> String {
        self.identifier
            .iter()
            .flatten()
            .map(|i| i.value.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(IDENTIFIER_SEPARATOR)
    }
}

// === Output row ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub identifiers: String,
}

impl Record for OrganizationRow {
    const COLUMNS: &'static [&'static str] = &["id", "name", "identifiers"];
}

impl From<Organization> for OrganizationRow {
    fn from(org: Organization) -> Self {
        let identifiers = org.joined_identifiers();
        Self {
            id: org.id.unwrap_or_default(),
            name: org.name.unwrap_or_default(),
            identifiers,
        }
    }
}

/// Flatten one organization search entry.
///
/// Absent fields (including the whole `resource`) become empty strings.
/// Only an entry whose fields have the wrong JSON type is an error.
pub fn flatten_organization(entry: &Value) -> Result<OrganizationRow, MalformedEntry> {
    let entry = OrganizationEntry::deserialize(entry)?;
    Ok(entry.resource.unwrap_or_default().into())
}

/// Distinct non-empty organization ids, in first-seen order
pub fn organization_ids(rows: &[OrganizationRow]) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::new();
    for row in rows {
        if !row.id.is_empty() && !ids.contains(&row.id.as_str()) {
            ids.push(&row.id);
        }
    }
    ids
}
