//! Seed catalog written by `seed_initial_assets`.

use super::entities::{Asset, AssetDraft};

/// `(id, color, size, owner, appraised value)` for each seeded asset.
const CATALOG: [(&str, &str, u64, &str, u64); 6] = [
    ("asset1", "blue", 5, "Tomoko", 300),
    ("asset2", "red", 5, "Brad", 400),
    ("asset3", "green", 10, "Jin Soo", 500),
    ("asset4", "yellow", 10, "Max", 600),
    ("asset5", "black", 15, "Adriana", 700),
    ("asset6", "white", 15, "Michel", 800),
];

/// The seed assets, each tagged with `docType = "asset"`.
#[must_use]
pub fn seed_assets() -> Vec<Asset> {
    CATALOG
        .iter()
        .map(|&(id, color, size, owner, value)| {
            Asset::from_draft(AssetDraft::new(id, color, size, owner, value)).tagged()
        })
        .collect()
}
