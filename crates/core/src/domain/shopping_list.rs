use serde::{Deserialize, Serialize};

/// A named, ordered list of item names. Two lists are the same list when
/// their names match; items are payload, not identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShoppingList {
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl ShoppingList {
    pub fn new(name: &str, items: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            items: items.iter().map(|item| (*item).to_string()).collect(),
        }
    }
}

impl PartialEq for ShoppingList {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ShoppingList {}

#[cfg(test)]
mod tests {
    use super::ShoppingList;

    #[test]
    fn equality_is_by_name_only() {
        let a = ShoppingList::new("weekly", &["lipstick"]);
        let b = ShoppingList::new("weekly", &["mascara", "blusher"]);
        let c = ShoppingList::new("monthly", &["lipstick"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
