use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::decoder::{as_message, is_truthy};

const DEFAULT_TITLE: &str = "Recipe";

/// A single recipe step as delivered by the generator or the favorites store.
///
/// Generators are inconsistent about step shape: most return plain strings,
/// some return objects with timing data, and occasionally something else
/// entirely. All three shapes render to one display line. Object steps keep
/// every field exactly as received so saving a recipe never rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Text(String),
    /// Object step, e.g. `{"action": "Bake", "minutes": 20, "celsius": 180}`
    Structured(Map<String, Value>),
    Other(Value),
}

impl Step {
    /// Field of an object step, if present and truthy.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Step::Structured(fields) => fields.get(key).filter(|v| is_truthy(v)),
            _ => None,
        }
    }

    /// Render the step as a single display line.
    ///
    /// Object steps show `action` (or `title`, or `text`), then ` (N min)`
    /// and ` @ N°C` when those fields are truthy.
    pub fn display_text(&self) -> String {
        match self {
            Step::Text(text) => text.clone(),
            Step::Structured(_) => {
                let mut line = ["action", "title", "text"]
                    .iter()
                    .find_map(|key| self.field(key))
                    .map(value_text)
                    .unwrap_or_default();
                if let Some(minutes) = self.field("minutes") {
                    line.push_str(&format!(" ({} min)", value_text(minutes)));
                }
                if let Some(celsius) = self.field("celsius") {
                    line.push_str(&format!(" @ {}°C", value_text(celsius)));
                }
                line.trim().to_string()
            }
            Step::Other(value) => value_text(value),
        }
    }
}

/// Display text of a JSON value: strings unquoted, whole floats without a
/// trailing `.0`.
fn value_text(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => as_message(other),
    }
}

impl From<Value> for Step {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Step::Text(text),
            Value::Object(fields) => Step::Structured(fields),
            other => Step::Other(other),
        }
    }
}

impl From<&str> for Step {
    fn from(text: &str) -> Self {
        Step::Text(text.to_string())
    }
}

/// Flatten any mix of step shapes into ordered display lines.
pub fn render_steps(steps: &[Step]) -> Vec<String> {
    steps.iter().map(Step::display_text).collect()
}

/// The recipe value posted to the favorites store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Successful payload of the recipe generator.
///
/// Every field is optional on the wire; daily recipes also carry the
/// ingredients the backend picked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    #[serde(default)]
    pub picked: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl GeneratedRecipe {
    /// Read a generator payload leniently. Fields of the wrong type are
    /// treated as missing rather than failing the whole recipe.
    pub fn from_value(value: &Value) -> Self {
        let picked = value["picked"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let title = value["title"]
            .as_str()
            .filter(|t| !t.is_empty())
            .map(String::from);

        let steps = value["steps"]
            .as_array()
            .map(|items| {
                items.iter().cloned().map(Step::from).collect()
            })
            .unwrap_or_default();

        GeneratedRecipe {
            picked,
            title,
            steps,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// The value saved when the user adds this recipe to favorites.
    pub fn to_recipe(&self) -> Recipe {
        Recipe {
            title: self.display_title().to_string(),
            steps: self.steps.clone(),
        }
    }
}

impl fmt::Display for GeneratedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.display_title())?;

        if !self.picked.is_empty() {
            writeln!(f, "\nPicked ingredients:")?;
            for item in &self.picked {
                writeln!(f, "  - {}", item)?;
            }
        }

        let lines = render_steps(&self.steps);
        if lines.is_empty() {
            writeln!(f, "\nNo steps returned.")?;
        } else {
            writeln!(f)?;
            for (i, line) in lines.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, line)?;
            }
        }
        Ok(())
    }
}

/// A recipe stored in the remote favorites table, scoped to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    #[serde(rename = "userSub", default)]
    pub user_sub: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Favorite {
    /// Composite key under which the remote store keeps this favorite.
    pub fn key(&self) -> (&str, &str) {
        (&self.user_sub, &self.id)
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}
