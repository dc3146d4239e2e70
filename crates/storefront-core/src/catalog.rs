//! Package Catalog
//!
//! Static, read-only list of lead packages. Loaded once, never mutated.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Package size tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Small,
    Medium,
    Large,
    Bonus,
    Premium,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Bonus => "bonus",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable lead package
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier (e.g., "coaches")
    pub id: String,

    /// Display name
    pub name: String,

    /// Short marketing description
    pub description: String,

    /// Lead count label (e.g., "~500K")
    pub lead_count: String,

    /// Unit price in USD cents
    pub unit_price_cents: i64,

    /// Size tier
    pub category: Category,
}

impl CatalogItem {
    fn new(
        id: &str,
        name: &str,
        lead_count: &str,
        description: &str,
        price_usd: i64,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            lead_count: lead_count.into(),
            unit_price_cents: price_usd * 100,
            category,
        }
    }

    fn segment(id: &str, name: &str, lead_count: &str, price_usd: i64, category: Category) -> Self {
        let description = format!("Verified & segmented U.S. leads for {name}");
        Self::new(id, name, lead_count, &description, price_usd, category)
    }
}

/// Id of the all-categories bundle shown below the package grid
pub const FULL_ACCESS_ID: &str = "full-access";

static PACKAGES: LazyLock<Vec<CatalogItem>> = LazyLock::new(|| {
    use Category::{Bonus, Large, Medium, Premium, Small};

    vec![
        CatalogItem::segment("coaches", "Coaches and Consultants", "~500K", 39, Small),
        CatalogItem::segment("corporates", "Corporates", "~1M", 79, Large),
        CatalogItem::segment("creative", "Creative Professionals", "~400K", 39, Small),
        CatalogItem::segment(
            "founder-ceo",
            "Founder & CEO (Affiliate Marketing)",
            "~600K",
            59,
            Medium,
        ),
        CatalogItem::segment("healthcare", "Healthcare", "~800K", 59, Medium),
        CatalogItem::segment("insurance", "Insurance Company", "~1.2M", 79, Large),
        CatalogItem::segment("it-company", "IT Company", "~500K", 39, Small),
        CatalogItem::segment("legal", "Legal", "~700K", 59, Medium),
        CatalogItem::segment("marketing-agency", "Marketing Agency", "~900K", 79, Large),
        CatalogItem::segment("real-estate", "Real Estate", "~1.5M", 59, Medium),
        CatalogItem::segment("sales-manager", "Sales Manager", "~600K", 59, Medium),
        CatalogItem::segment("software-company", "Software Company", "~800K", 79, Large),
        CatalogItem::new(
            "bonus-2",
            "🔥 Bonus 2",
            "~6M mixed",
            "Comprehensive mixed category leads package",
            149,
            Bonus,
        ),
        CatalogItem::new(
            "bonus-3",
            "🆕 Bonus 3",
            "~8M from Jay",
            "Premium curated leads collection",
            199,
            Bonus,
        ),
        CatalogItem::new(
            "usa-consumers",
            "🚀 3.5 Million USA Consumers",
            "~3.5M mixed",
            "Diverse consumer leads across multiple segments",
            149,
            Bonus,
        ),
        CatalogItem::new(
            FULL_ACCESS_ID,
            "🎯 Full Access Package",
            "10M+",
            "Get ALL categories + bonuses — 10+ million verified leads",
            299,
            Premium,
        ),
    ]
});

/// Read-only view over the package list
#[derive(Clone, Copy, Debug, Default)]
pub struct Catalog;

impl Catalog {
    /// Every package, in display order
    pub fn items(&self) -> &'static [CatalogItem] {
        &PACKAGES
    }

    /// Look up a package by id
    pub fn get(&self, id: &str) -> Option<&'static CatalogItem> {
        PACKAGES.iter().find(|item| item.id == id)
    }

    /// Packages shown in the grid (everything except the full-access bundle)
    pub fn grid(&self) -> impl Iterator<Item = &'static CatalogItem> {
        PACKAGES.iter().filter(|item| item.category != Category::Premium)
    }

    /// The all-categories bundle
    pub fn full_access(&self) -> Option<&'static CatalogItem> {
        self.get(FULL_ACCESS_ID)
    }

    /// Packages in one tier
    pub fn by_category(&self, category: Category) -> Vec<&'static CatalogItem> {
        PACKAGES.iter().filter(|item| item.category == category).collect()
    }
}
