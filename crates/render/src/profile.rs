//! Issuer identity shown in the preview header.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable company data injected into the layout.
///
/// Injected rather than hardcoded so the rendering layer stays free of
/// globals; the default carries the demo issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "SmartInvoice SpA".to_string(),
            tax_id: "77.123.456-7".to_string(),
            address: "Av. Providencia 1234, Oficina 501, Santiago, Chile".to_string(),
            email: "facturacion@smartinvoice.cl".to_string(),
            phone: "+56 9 1234 5678".to_string(),
        }
    }
}

impl CompanyProfile {
    /// Load a profile from a JSON file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
