use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;

use crate::domain::repository::{CatalogRepository, RecipeRepository};
use crate::domain::types::{
    RawAmount, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, find_duplicate_ingredient,
};
use crate::error::ApiError;

/// Check one ingredient payload: no duplicate ids, every amount a positive
/// integer, every id present in the catalog. Returns validated pairs in
/// payload order.
async fn validate_ingredients<C: CatalogRepository>(
    catalog: &C,
    entries: &[(i64, RawAmount)],
) -> Result<Vec<(i64, i32)>, ApiError> {
    let ids: Vec<i64> = entries.iter().map(|(id, _)| *id).collect();
    if find_duplicate_ingredient(ids.iter().copied()).is_some() {
        return Err(ApiError::validation("duplicate ingredient"));
    }

    let mut pairs = Vec::with_capacity(entries.len());
    for (id, amount) in entries {
        let amount = amount
            .parse_positive()
            .ok_or_else(|| ApiError::validation("amount must be a positive integer"))?;
        pairs.push((*id, amount));
    }

    let found = catalog.find_ingredients_by_ids(&ids).await?;
    if found.len() != ids.len() {
        return Err(ApiError::IngredientNotFound);
    }

    Ok(pairs)
}

async fn validate_tags<C: CatalogRepository>(
    catalog: &C,
    tag_ids: &[i64],
) -> Result<(), ApiError> {
    let found = catalog.find_tags_by_ids(tag_ids).await?;
    if found.len() != tag_ids.len() {
        return Err(ApiError::TagNotFound);
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i32) -> Result<i32, ApiError> {
    if cooking_time < 1 {
        return Err(ApiError::validation(
            "cooking_time must be a positive integer",
        ));
    }
    Ok(cooking_time)
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeInput {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<(i64, RawAmount)>,
    pub tag_ids: Vec<i64>,
}

pub struct CreateRecipeUseCase<R: RecipeRepository, C: CatalogRepository> {
    pub recipes: R,
    pub catalog: C,
}

impl<R: RecipeRepository, C: CatalogRepository> CreateRecipeUseCase<R, C> {
    pub async fn execute(
        &self,
        author_id: Uuid,
        input: CreateRecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let cooking_time = validate_cooking_time(input.cooking_time)?;
        let ingredients = validate_ingredients(&self.catalog, &input.ingredients).await?;
        validate_tags(&self.catalog, &input.tag_ids).await?;

        let draft = RecipeDraft {
            name: input.name,
            image: input.image,
            text: input.text,
            cooking_time,
            ingredients,
            tag_ids: input.tag_ids,
        };
        self.recipes.create(author_id, &draft).await
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<(i64, RawAmount)>>,
    pub tag_ids: Option<Vec<i64>>,
}

pub struct UpdateRecipeUseCase<R: RecipeRepository, C: CatalogRepository> {
    pub recipes: R,
    pub catalog: C,
}

impl<R: RecipeRepository, C: CatalogRepository> UpdateRecipeUseCase<R, C> {
    pub async fn execute(
        &self,
        acting_user: Uuid,
        recipe_id: i64,
        input: UpdateRecipeInput,
    ) -> Result<RecipeDetail, ApiError> {
        let recipe = self
            .recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if recipe.author_id != acting_user {
            return Err(ApiError::Forbidden);
        }

        let cooking_time = input.cooking_time.map(validate_cooking_time).transpose()?;
        let ingredients = match &input.ingredients {
            Some(entries) => Some(validate_ingredients(&self.catalog, entries).await?),
            None => None,
        };
        if let Some(tag_ids) = &input.tag_ids {
            validate_tags(&self.catalog, tag_ids).await?;
        }

        let patch = RecipePatch {
            name: input.name,
            image: input.image,
            text: input.text,
            cooking_time,
            ingredients,
            tag_ids: input.tag_ids,
        };
        self.recipes.update(recipe_id, &patch).await
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(&self, recipe_id: i64) -> Result<RecipeDetail, ApiError> {
        self.recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    pub async fn execute(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Vec<RecipeDetail>, ApiError> {
        self.recipes.list(filter, page).await
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository> {
    pub recipes: R,
}

impl<R: RecipeRepository> DeleteRecipeUseCase<R> {
    pub async fn execute(&self, acting_user: Uuid, recipe_id: i64) -> Result<(), ApiError> {
        let recipe = self
            .recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if recipe.author_id != acting_user {
            return Err(ApiError::Forbidden);
        }
        let deleted = self.recipes.delete(recipe_id).await?;
        if !deleted {
            return Err(ApiError::RecipeNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Ingredient, Recipe, Tag};
    use chrono::Utc;
    use std::sync::Mutex;

    struct MockRecipeRepo {
        recipe: Option<Recipe>,
        last_patch: Mutex<Option<RecipePatch>>,
        last_draft: Mutex<Option<RecipeDraft>>,
    }

    impl MockRecipeRepo {
        fn new(recipe: Option<Recipe>) -> Self {
            Self {
                recipe,
                last_patch: Mutex::new(None),
                last_draft: Mutex::new(None),
            }
        }
    }

    fn detail_from(recipe: Recipe) -> RecipeDetail {
        RecipeDetail {
            recipe,
            ingredients: vec![],
            tags: vec![],
        }
    }

    fn test_recipe(author_id: Uuid) -> Recipe {
        Recipe {
            id: 1,
            author_id,
            name: "Pancakes".into(),
            image: "recipes/media/pancakes.png".into(),
            text: "Mix and fry.".into(),
            cooking_time: 20,
            created_at: Utc::now(),
        }
    }

    impl RecipeRepository for MockRecipeRepo {
        async fn create(
            &self,
            author_id: Uuid,
            draft: &RecipeDraft,
        ) -> Result<RecipeDetail, ApiError> {
            *self.last_draft.lock().unwrap() = Some(draft.clone());
            Ok(detail_from(Recipe {
                id: 1,
                author_id,
                name: draft.name.clone(),
                image: draft.image.clone(),
                text: draft.text.clone(),
                cooking_time: draft.cooking_time,
                created_at: Utc::now(),
            }))
        }
        async fn update(
            &self,
            _recipe_id: i64,
            patch: &RecipePatch,
        ) -> Result<RecipeDetail, ApiError> {
            *self.last_patch.lock().unwrap() = Some(patch.clone());
            Ok(detail_from(self.recipe.clone().unwrap()))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<RecipeDetail>, ApiError> {
            Ok(self.recipe.clone().map(detail_from))
        }
        async fn find_recipe(&self, _id: i64) -> Result<Option<Recipe>, ApiError> {
            Ok(self.recipe.clone())
        }
        async fn list(
            &self,
            _filter: &RecipeFilter,
            _page: PageRequest,
        ) -> Result<Vec<RecipeDetail>, ApiError> {
            Ok(self.recipe.clone().map(detail_from).into_iter().collect())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.recipe.is_some())
        }
        async fn count_by_author(&self, _author_id: Uuid) -> Result<u64, ApiError> {
            Ok(0)
        }
        async fn list_by_author(
            &self,
            _author_id: Uuid,
            _limit: Option<u64>,
        ) -> Result<Vec<Recipe>, ApiError> {
            Ok(vec![])
        }
    }

    struct MockCatalog {
        ingredient_ids: Vec<i64>,
        tag_ids: Vec<i64>,
    }

    impl CatalogRepository for MockCatalog {
        async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
            Ok(vec![])
        }
        async fn find_tag(&self, _id: i64) -> Result<Option<Tag>, ApiError> {
            Ok(None)
        }
        async fn find_tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, ApiError> {
            Ok(ids
                .iter()
                .filter(|id| self.tag_ids.contains(id))
                .map(|&id| Tag {
                    id,
                    name: format!("tag-{id}"),
                    color: "#ffffff".into(),
                    slug: format!("tag-{id}"),
                })
                .collect())
        }
        async fn list_ingredients(
            &self,
            _name_prefix: Option<&str>,
        ) -> Result<Vec<Ingredient>, ApiError> {
            Ok(vec![])
        }
        async fn find_ingredient(&self, _id: i64) -> Result<Option<Ingredient>, ApiError> {
            Ok(None)
        }
        async fn find_ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, ApiError> {
            Ok(ids
                .iter()
                .filter(|id| self.ingredient_ids.contains(id))
                .map(|&id| Ingredient {
                    id,
                    name: format!("ingredient-{id}"),
                    measurement_unit: "g".into(),
                })
                .collect())
        }
    }

    fn valid_input() -> CreateRecipeInput {
        CreateRecipeInput {
            name: "Pancakes".into(),
            image: "recipes/media/pancakes.png".into(),
            text: "Mix and fry.".into(),
            cooking_time: 20,
            ingredients: vec![(1, RawAmount::Int(200)), (2, RawAmount::Text("2".into()))],
            tag_ids: vec![10],
        }
    }

    fn full_catalog() -> MockCatalog {
        MockCatalog {
            ingredient_ids: vec![1, 2],
            tag_ids: vec![10],
        }
    }

    #[tokio::test]
    async fn should_create_recipe_with_valid_payload() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let detail = uc.execute(Uuid::now_v7(), valid_input()).await.unwrap();
        assert_eq!(detail.recipe.name, "Pancakes");
        let draft = uc.recipes.last_draft.lock().unwrap().clone().unwrap();
        assert_eq!(draft.ingredients, vec![(1, 200), (2, 2)]);
    }

    #[tokio::test]
    async fn should_reject_duplicate_ingredient_in_payload() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let mut input = valid_input();
        input.ingredients = vec![(1, RawAmount::Int(200)), (1, RawAmount::Int(100))];
        let result = uc.execute(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(ApiError::Validation(ref m)) if m == "duplicate ingredient"));
    }

    #[tokio::test]
    async fn should_reject_non_numeric_amount() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let mut input = valid_input();
        input.ingredients = vec![(1, RawAmount::Text("lots".into()))];
        let result = uc.execute(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn should_reject_non_positive_amount() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let mut input = valid_input();
        input.ingredients = vec![(1, RawAmount::Int(0))];
        let result = uc.execute(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn should_reject_unknown_ingredient() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: MockCatalog {
                ingredient_ids: vec![1],
                tag_ids: vec![10],
            },
        };
        let result = uc.execute(Uuid::now_v7(), valid_input()).await;
        assert!(matches!(result, Err(ApiError::IngredientNotFound)));
    }

    #[tokio::test]
    async fn should_reject_unknown_tag() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: MockCatalog {
                ingredient_ids: vec![1, 2],
                tag_ids: vec![],
            },
        };
        let result = uc.execute(Uuid::now_v7(), valid_input()).await;
        assert!(matches!(result, Err(ApiError::TagNotFound)));
    }

    #[tokio::test]
    async fn should_reject_non_positive_cooking_time() {
        let uc = CreateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let mut input = valid_input();
        input.cooking_time = 0;
        let result = uc.execute(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn should_reject_update_by_non_owner() {
        let owner = Uuid::now_v7();
        let uc = UpdateRecipeUseCase {
            recipes: MockRecipeRepo::new(Some(test_recipe(owner))),
            catalog: full_catalog(),
        };
        let result = uc
            .execute(Uuid::now_v7(), 1, UpdateRecipeInput::default())
            .await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[tokio::test]
    async fn should_reject_update_of_missing_recipe() {
        let uc = UpdateRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
            catalog: full_catalog(),
        };
        let result = uc
            .execute(Uuid::now_v7(), 1, UpdateRecipeInput::default())
            .await;
        assert!(matches!(result, Err(ApiError::RecipeNotFound)));
    }

    #[tokio::test]
    async fn should_keep_absent_sets_untouched_on_partial_update() {
        let owner = Uuid::now_v7();
        let uc = UpdateRecipeUseCase {
            recipes: MockRecipeRepo::new(Some(test_recipe(owner))),
            catalog: full_catalog(),
        };
        uc.execute(
            owner,
            1,
            UpdateRecipeInput {
                name: Some("Crepes".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patch = uc.recipes.last_patch.lock().unwrap().clone().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Crepes"));
        assert!(patch.image.is_none());
        assert!(patch.text.is_none());
        assert!(patch.cooking_time.is_none());
        assert!(patch.ingredients.is_none());
        assert!(patch.tag_ids.is_none());
    }

    #[tokio::test]
    async fn should_replace_ingredient_set_when_present() {
        let owner = Uuid::now_v7();
        let uc = UpdateRecipeUseCase {
            recipes: MockRecipeRepo::new(Some(test_recipe(owner))),
            catalog: full_catalog(),
        };
        uc.execute(
            owner,
            1,
            UpdateRecipeInput {
                ingredients: Some(vec![(2, RawAmount::Int(30))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let patch = uc.recipes.last_patch.lock().unwrap().clone().unwrap();
        assert_eq!(patch.ingredients, Some(vec![(2, 30)]));
    }

    #[tokio::test]
    async fn should_reject_delete_by_non_owner() {
        let owner = Uuid::now_v7();
        let uc = DeleteRecipeUseCase {
            recipes: MockRecipeRepo::new(Some(test_recipe(owner))),
        };
        let result = uc.execute(Uuid::now_v7(), 1).await;
        assert!(matches!(result, Err(ApiError::Forbidden)));
    }

    #[tokio::test]
    async fn should_delete_own_recipe() {
        let owner = Uuid::now_v7();
        let uc = DeleteRecipeUseCase {
            recipes: MockRecipeRepo::new(Some(test_recipe(owner))),
        };
        assert!(uc.execute(owner, 1).await.is_ok());
    }

    #[tokio::test]
    async fn should_return_recipe_not_found_on_get_missing() {
        let uc = GetRecipeUseCase {
            recipes: MockRecipeRepo::new(None),
        };
        let result = uc.execute(404).await;
        assert!(matches!(result, Err(ApiError::RecipeNotFound)));
    }
}
