/// Pantry staples offered before the user adds anything of their own.
pub const DEFAULT_INGREDIENTS: &[&str] = &[
    "eggs",
    "milk",
    "flour",
    "tomatoes",
    "onion",
    "garlic",
    "chicken",
    "rice",
    "carrots",
    "potatoes",
    "olive oil",
    "cheese",
    "spinach",
    "corn",
    "bell pepper",
    "mushrooms",
    "tuna",
    "pasta",
    "zucchini",
    "basil",
    "broth",
    "butter",
    "yogurt",
    "cream",
    "parsley",
    "paprika",
    "lemon",
];

/// Ingredient catalogue plus the user's current selection.
///
/// The selection keeps insertion order and never holds duplicates, so it can
/// be sent to the generator as-is.
#[derive(Debug, Clone)]
pub struct IngredientSelection {
    catalogue: Vec<String>,
    selected: Vec<String>,
}

impl Default for IngredientSelection {
    fn default() -> Self {
        Self {
            catalogue: DEFAULT_INGREDIENTS.iter().map(|s| s.to_string()).collect(),
            selected: Vec::new(),
        }
    }
}

impl IngredientSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalogue(&self) -> &[String] {
        &self.catalogue
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, item: &str) -> bool {
        self.selected.iter().any(|s| s == item)
    }

    /// Catalogue entries containing `query`, case-insensitively. A blank
    /// query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&str> {
        let query = query.trim().to_lowercase();
        self.catalogue
            .iter()
            .filter(|item| query.is_empty() || item.to_lowercase().contains(&query))
            .map(String::as_str)
            .collect()
    }

    /// Select `item`, or deselect it if it is already selected.
    pub fn toggle(&mut self, item: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == item) {
            self.selected.remove(pos);
        } else {
            self.selected.push(item.to_string());
        }
    }

    /// Add a free-form ingredient to the catalogue (front first) and select it.
    ///
    /// Returns `false` when `name` is blank.
    pub fn add_manual(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        if !self.catalogue.iter().any(|c| c == name) {
            self.catalogue.insert(0, name.to_string());
        }
        if !self.is_selected(name) {
            self.selected.push(name.to_string());
        }
        true
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
