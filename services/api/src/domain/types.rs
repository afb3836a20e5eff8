use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// User profile owned by the api service. Authentication lives at the
/// gateway; this record only carries displayable fields.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Reference ingredient from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Reference tag from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Scalar recipe fields without associations.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i64,
    pub author_id: Uuid,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// One ingredient row of a recipe, joined with its catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Recipe with its full ingredient and tag sets loaded.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
    pub tags: Vec<Tag>,
}

/// Validated payload for a recipe insert. Ingredient pairs are
/// (ingredient id, amount) with amounts already checked ≥ 1.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<(i64, i32)>,
    pub tag_ids: Vec<i64>,
}

/// Validated partial update. `None` scalar fields keep their prior value;
/// `None` sets keep the prior rows, `Some` sets replace them wholesale.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<(i64, i32)>>,
    pub tag_ids: Option<Vec<i64>>,
}

/// Filter set for the recipe list query. The `favorited_by` / `in_cart_of`
/// fields are only populated for authenticated callers — the corresponding
/// boolean query flags are no-ops for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author: Option<Uuid>,
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<Uuid>,
    pub in_cart_of: Option<Uuid>,
}

/// A profile annotated with whether the viewer follows it.
#[derive(Debug, Clone)]
pub struct UserView {
    pub profile: UserProfile,
    pub is_subscribed: bool,
}

/// A followed author together with the preview data the subscription
/// listing exposes.
#[derive(Debug, Clone)]
pub struct SubscribedAuthor {
    pub profile: UserProfile,
    pub recipes_count: u64,
    pub recipes: Vec<Recipe>,
}

/// Ingredient amount as received on the wire: either a JSON integer or a
/// numeric string ("5"). Anything that does not parse to a positive integer
/// is rejected at validation time.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Int(i64),
    Text(String),
}

impl RawAmount {
    /// Returns the amount when it is a positive integer that fits `i32`.
    pub fn parse_positive(&self) -> Option<i32> {
        let n = match self {
            Self::Int(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        (n >= 1 && n <= i32::MAX as i64).then_some(n as i32)
    }
}

/// First ingredient id that appears more than once, if any.
pub fn find_duplicate_ingredient(ids: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Some(id);
        }
    }
    None
}
