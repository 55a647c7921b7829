use serde::{Deserialize, Serialize};

/// Server-assigned restaurant identifier.
pub type RestaurantId = i64;

/// Server-assigned menu item identifier.
pub type MenuItemId = i64;

/// A restaurant as returned by discovery.
///
/// Identity is the id; two restaurants with the same id are the same place even if
/// the name differs between responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,

    pub name: String,

    #[serde(
        rename = "formatted_address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
}

impl Restaurant {
    pub fn new(id: RestaurantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: None,
        }
    }

    /// Search key: lowercase ASCII alphanumerics only.
    pub fn search_key(&self) -> String {
        normalize_search(&self.name)
    }
}

impl PartialEq for Restaurant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Restaurant {}

impl std::hash::Hash for Restaurant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Lowercase and strip everything that is not `[a-z0-9]`.
pub fn normalize_search(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// A single item on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,

    pub name: String,

    pub calories: u32,

    /// Filled in by the client when the payload leaves it out.
    #[serde(rename = "restaurant", default)]
    pub restaurant_id: RestaurantId,
}
