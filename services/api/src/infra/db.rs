use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    Statement, TransactionTrait,
    sea_query::{Expr, Query, extension::postgres::PgExpr as _},
};
use uuid::Uuid;

use cookbook_api_schema::{
    favorited_recipes, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts,
    subscriptions, tags, users,
};
use cookbook_domain::pagination::PageRequest;

use crate::domain::repository::{
    CartRepository, CatalogRepository, FavoriteRepository, RecipeRepository,
    SubscriptionRepository, UserRepository,
};
use crate::domain::types::{
    Ingredient, IngredientLine, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, Tag,
    UserProfile,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(profile_from_model))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, ApiError> {
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        Ok(models.into_iter().map(profile_from_model).collect())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<UserProfile>, ApiError> {
        let page = page.clamped();
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.per_page as u64)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(profile_from_model).collect())
    }
}

fn profile_from_model(model: users::Model) -> UserProfile {
    UserProfile {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        created_at: model.created_at,
    }
}

// ── Catalog repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCatalogRepository {
    pub db: DatabaseConnection,
}

impl CatalogRepository for DbCatalogRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, ApiError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn find_tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, ApiError> {
        let models = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find tags by ids")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, ApiError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix {
            let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
            query = query.filter(Expr::col(ingredients::Column::Name).ilike(pattern));
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .all(&self.db)
            .await
            .context("list ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, ApiError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn find_ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, ApiError> {
        let models = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find ingredients by ids")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

impl DbRecipeRepository {
    async fn load_details(&self, models: Vec<recipes::Model>) -> Result<Vec<RecipeDetail>, ApiError> {
        let recipe_ids: Vec<i64> = models.iter().map(|m| m.id).collect();

        let line_rows = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(ingredients::Entity)
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("load recipe ingredient lines")?;

        let tag_rows = recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(tags::Entity)
            .order_by_asc(recipe_tags::Column::TagId)
            .all(&self.db)
            .await
            .context("load recipe tags")?;

        let mut details = Vec::with_capacity(models.len());
        for model in models {
            let ingredients = line_rows
                .iter()
                .filter(|(line, _)| line.recipe_id == model.id)
                .map(|(line, ingredient)| {
                    let ingredient = ingredient
                        .as_ref()
                        .context("recipe ingredient missing catalog row")?;
                    Ok(IngredientLine {
                        ingredient_id: ingredient.id,
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: line.amount,
                    })
                })
                .collect::<Result<Vec<_>, anyhow::Error>>()?;
            let tags = tag_rows
                .iter()
                .filter(|(link, _)| link.recipe_id == model.id)
                .filter_map(|(_, tag)| tag.clone())
                .map(tag_from_model)
                .collect();
            details.push(RecipeDetail {
                recipe: recipe_from_model(model),
                ingredients,
                tags,
            });
        }
        Ok(details)
    }

    async fn load_detail(&self, id: i64) -> Result<Option<RecipeDetail>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?;
        let Some(model) = model else {
            return Ok(None);
        };
        let mut details = self.load_details(vec![model]).await?;
        Ok(Some(details.remove(0)))
    }
}

async fn replace_ingredients<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i64,
    pairs: &[(i64, i32)],
) -> Result<(), ApiError> {
    recipe_ingredients::Entity::delete_many()
        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await
        .context("delete recipe ingredient lines")?;
    for &(ingredient_id, amount) in pairs {
        recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(ingredient_id),
            amount: Set(amount),
            ..Default::default()
        }
        .insert(conn)
        .await
        .context("insert recipe ingredient line")?;
    }
    Ok(())
}

async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i64,
    tag_ids: &[i64],
) -> Result<(), ApiError> {
    recipe_tags::Entity::delete_many()
        .filter(recipe_tags::Column::RecipeId.eq(recipe_id))
        .exec(conn)
        .await
        .context("delete recipe tags")?;
    for &tag_id in tag_ids {
        recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        }
        .insert(conn)
        .await
        .context("insert recipe tag")?;
    }
    Ok(())
}

impl RecipeRepository for DbRecipeRepository {
    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<RecipeDetail, ApiError> {
        let txn = self.db.begin().await.context("begin create recipe")?;

        let recipe = recipes::ActiveModel {
            author_id: Set(author_id),
            name: Set(draft.name.clone()),
            image: Set(draft.image.clone()),
            text: Set(draft.text.clone()),
            cooking_time: Set(draft.cooking_time),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert recipe")?;

        replace_ingredients(&txn, recipe.id, &draft.ingredients).await?;
        replace_tags(&txn, recipe.id, &draft.tag_ids).await?;

        txn.commit().await.context("commit create recipe")?;

        self.load_detail(recipe.id)
            .await?
            .context("created recipe vanished")
            .map_err(Into::into)
    }

    async fn update(&self, recipe_id: i64, patch: &RecipePatch) -> Result<RecipeDetail, ApiError> {
        let txn = self.db.begin().await.context("begin update recipe")?;

        let mut am = recipes::ActiveModel {
            id: Set(recipe_id),
            ..Default::default()
        };
        let mut dirty = false;
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
            dirty = true;
        }
        if let Some(image) = &patch.image {
            am.image = Set(image.clone());
            dirty = true;
        }
        if let Some(text) = &patch.text {
            am.text = Set(text.clone());
            dirty = true;
        }
        if let Some(cooking_time) = patch.cooking_time {
            am.cooking_time = Set(cooking_time);
            dirty = true;
        }
        if dirty {
            am.update(&txn).await.context("update recipe")?;
        }

        if let Some(pairs) = &patch.ingredients {
            replace_ingredients(&txn, recipe_id, pairs).await?;
        }
        if let Some(tag_ids) = &patch.tag_ids {
            replace_tags(&txn, recipe_id, tag_ids).await?;
        }

        txn.commit().await.context("commit update recipe")?;

        self.load_detail(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RecipeDetail>, ApiError> {
        self.load_detail(id).await
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>, ApiError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe row by id")?;
        Ok(model.map(recipe_from_model))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Vec<RecipeDetail>, ApiError> {
        let page = page.clamped();
        let mut query = recipes::Entity::find();

        if let Some(author) = filter.author {
            query = query.filter(recipes::Column::AuthorId.eq(author));
        }
        if !filter.tag_slugs.is_empty() {
            let sub = Query::select()
                .column(recipe_tags::Column::RecipeId)
                .from(recipe_tags::Entity)
                .inner_join(
                    tags::Entity,
                    Expr::col((tags::Entity, tags::Column::Id))
                        .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                )
                .and_where(
                    Expr::col((tags::Entity, tags::Column::Slug))
                        .is_in(filter.tag_slugs.clone()),
                )
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(sub));
        }
        if let Some(user_id) = filter.favorited_by {
            let sub = Query::select()
                .column(favorited_recipes::Column::RecipeId)
                .from(favorited_recipes::Entity)
                .and_where(Expr::col(favorited_recipes::Column::UserId).eq(user_id))
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(sub));
        }
        if let Some(user_id) = filter.in_cart_of {
            let sub = Query::select()
                .column(shopping_carts::Column::RecipeId)
                .from(shopping_carts::Entity)
                .and_where(Expr::col(shopping_carts::Column::UserId).eq(user_id))
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(sub));
        }

        let models = query
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(page.per_page as u64)
            .all(&self.db)
            .await
            .context("list recipes")?;

        self.load_details(models).await
    }

    async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        // Association rows go with the recipe via ON DELETE CASCADE.
        let result = recipes::Entity::delete_many()
            .filter(recipes::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError> {
        let count = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .context("count recipes by author")?;
        Ok(count)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<Recipe>, ApiError> {
        let mut query = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query.all(&self.db).await.context("list recipes by author")?;
        Ok(models.into_iter().map(recipe_from_model).collect())
    }
}

fn recipe_from_model(model: recipes::Model) -> Recipe {
    Recipe {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        image: model.image,
        text: model.text,
        cooking_time: model.cooking_time,
        created_at: model.created_at,
    }
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn insert(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError> {
        // The composite PK arbitrates duplicates, concurrent ones included.
        let result = favorited_recipes::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert favorite").into()),
        }
    }

    async fn delete(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError> {
        let result = favorited_recipes::Entity::delete_many()
            .filter(favorited_recipes::Column::UserId.eq(user_id))
            .filter(favorited_recipes::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("delete favorite")?;
        Ok(result.rows_affected > 0)
    }

    async fn recipe_ids_for_user(
        &self,
        user_id: Uuid,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, ApiError> {
        let models = favorited_recipes::Entity::find()
            .filter(favorited_recipes::Column::UserId.eq(user_id))
            .filter(favorited_recipes::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find favorited recipe ids")?;
        Ok(models.into_iter().map(|m| m.recipe_id).collect())
    }
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn insert(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError> {
        let result = shopping_carts::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert cart entry").into()),
        }
    }

    async fn delete(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError> {
        let result = shopping_carts::Entity::delete_many()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
            .exec(&self.db)
            .await
            .context("delete cart entry")?;
        Ok(result.rows_affected > 0)
    }

    async fn recipe_ids_for_user(
        &self,
        user_id: Uuid,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, ApiError> {
        let models = shopping_carts::Entity::find()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find cart recipe ids")?;
        Ok(models.into_iter().map(|m| m.recipe_id).collect())
    }

    async fn ingredient_lines(&self, user_id: Uuid) -> Result<Vec<IngredientLine>, ApiError> {
        // Stable line order keeps the aggregator's first-occurrence output
        // deterministic across identical carts.
        let sql = r#"
            SELECT i.id AS ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM shopping_carts sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            ORDER BY sc.created_at, ri.recipe_id, ri.id
        "#;

        #[derive(Debug, FromQueryResult)]
        struct LineRow {
            ingredient_id: i64,
            name: String,
            measurement_unit: String,
            amount: i32,
        }

        let rows = LineRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [user_id.into()],
        ))
        .all(&self.db)
        .await
        .context("load cart ingredient lines")?;

        Ok(rows
            .into_iter()
            .map(|row| IngredientLine {
                ingredient_id: row.ingredient_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert subscription").into()),
        }
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn author_ids_for_user(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, ApiError> {
        let models = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find followed author ids")?;
        Ok(models.into_iter().map(|m| m.author_id).collect())
    }

    async fn list_authors(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, ApiError> {
        let page = page.clamped();
        let offset = page.offset() as i64;
        let limit = page.per_page as i64;

        let sql = r#"
            SELECT u.* FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            LIMIT $2 OFFSET $3
        "#;

        let models = users::Model::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            sql,
            [user_id.into(), limit.into(), offset.into()],
        ))
        .all(&self.db)
        .await
        .context("list followed authors")?;

        Ok(models.into_iter().map(profile_from_model).collect())
    }
}
