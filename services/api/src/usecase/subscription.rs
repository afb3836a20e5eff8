use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;

use crate::domain::repository::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::domain::types::SubscribedAuthor;
use crate::error::ApiError;

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<S: SubscriptionRepository, U: UserRepository, R: RecipeRepository> {
    pub subscriptions: S,
    pub users: U,
    pub recipes: R,
}

impl<S: SubscriptionRepository, U: UserRepository, R: RecipeRepository> SubscribeUseCase<S, U, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        author_id: Uuid,
        recipes_limit: Option<u64>,
    ) -> Result<SubscribedAuthor, ApiError> {
        if user_id == author_id {
            return Err(ApiError::validation("cannot subscribe to yourself"));
        }

        let profile = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let inserted = self.subscriptions.insert(user_id, author_id).await?;
        if !inserted {
            return Err(ApiError::conflict("already subscribed"));
        }

        let recipes_count = self.recipes.count_by_author(author_id).await?;
        let recipes = self.recipes.list_by_author(author_id, recipes_limit).await?;

        Ok(SubscribedAuthor {
            profile,
            recipes_count,
            recipes,
        })
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<S: SubscriptionRepository, U: UserRepository> {
    pub subscriptions: S,
    pub users: U,
}

impl<S: SubscriptionRepository, U: UserRepository> UnsubscribeUseCase<S, U> {
    pub async fn execute(&self, user_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
        self.users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let deleted = self.subscriptions.delete(user_id, author_id).await?;
        if !deleted {
            return Err(ApiError::conflict("not subscribed"));
        }

        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository, R: RecipeRepository> {
    pub subscriptions: S,
    pub recipes: R,
}

impl<S: SubscriptionRepository, R: RecipeRepository> ListSubscriptionsUseCase<S, R> {
    /// Followed authors with their recipe counts and a capped recipe preview.
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Vec<SubscribedAuthor>, ApiError> {
        let profiles = self.subscriptions.list_authors(user_id, page).await?;

        let mut authors = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let recipes_count = self.recipes.count_by_author(profile.id).await?;
            let recipes = self.recipes.list_by_author(profile.id, recipes_limit).await?;
            authors.push(SubscribedAuthor {
                profile,
                recipes_count,
                recipes,
            });
        }

        Ok(authors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, UserProfile,
    };
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn profile(id: Uuid, username: &str) -> UserProfile {
        UserProfile {
            id,
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: "Test".into(),
            last_name: "User".into(),
            created_at: Utc::now(),
        }
    }

    struct MockUsers {
        profiles: Vec<UserProfile>,
    }

    impl UserRepository for MockUsers {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, ApiError> {
            Ok(self.profiles.iter().find(|p| p.id == id).cloned())
        }
        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, ApiError> {
            Ok(self
                .profiles
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
        async fn list(&self, _page: PageRequest) -> Result<Vec<UserProfile>, ApiError> {
            Ok(self.profiles.clone())
        }
    }

    struct MockSubscriptions {
        pairs: Mutex<HashSet<(Uuid, Uuid)>>,
        authors: Vec<UserProfile>,
    }

    impl MockSubscriptions {
        fn empty() -> Self {
            Self {
                pairs: Mutex::new(HashSet::new()),
                authors: vec![],
            }
        }
    }

    impl SubscriptionRepository for MockSubscriptions {
        async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
            Ok(self.pairs.lock().unwrap().insert((user_id, author_id)))
        }
        async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError> {
            Ok(self.pairs.lock().unwrap().remove(&(user_id, author_id)))
        }
        async fn author_ids_for_user(
            &self,
            user_id: Uuid,
            author_ids: &[Uuid],
        ) -> Result<Vec<Uuid>, ApiError> {
            let pairs = self.pairs.lock().unwrap();
            Ok(author_ids
                .iter()
                .copied()
                .filter(|&id| pairs.contains(&(user_id, id)))
                .collect())
        }
        async fn list_authors(
            &self,
            _user_id: Uuid,
            _page: PageRequest,
        ) -> Result<Vec<UserProfile>, ApiError> {
            Ok(self.authors.clone())
        }
    }

    struct MockRecipes {
        by_author: Vec<Recipe>,
    }

    impl MockRecipes {
        fn with_count(author_id: Uuid, count: usize) -> Self {
            Self {
                by_author: (0..count)
                    .map(|i| Recipe {
                        id: i as i64 + 1,
                        author_id,
                        name: format!("recipe-{i}"),
                        image: "recipes/media/r.png".into(),
                        text: "text".into(),
                        cooking_time: 10,
                        created_at: Utc::now(),
                    })
                    .collect(),
            }
        }
    }

    impl RecipeRepository for MockRecipes {
        async fn create(
            &self,
            _author_id: Uuid,
            _draft: &RecipeDraft,
        ) -> Result<RecipeDetail, ApiError> {
            unreachable!()
        }
        async fn update(
            &self,
            _recipe_id: i64,
            _patch: &RecipePatch,
        ) -> Result<RecipeDetail, ApiError> {
            unreachable!()
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<RecipeDetail>, ApiError> {
            Ok(None)
        }
        async fn find_recipe(&self, _id: i64) -> Result<Option<Recipe>, ApiError> {
            Ok(None)
        }
        async fn list(
            &self,
            _filter: &RecipeFilter,
            _page: PageRequest,
        ) -> Result<Vec<RecipeDetail>, ApiError> {
            Ok(vec![])
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(false)
        }
        async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError> {
            Ok(self
                .by_author
                .iter()
                .filter(|r| r.author_id == author_id)
                .count() as u64)
        }
        async fn list_by_author(
            &self,
            author_id: Uuid,
            limit: Option<u64>,
        ) -> Result<Vec<Recipe>, ApiError> {
            let mut recipes: Vec<Recipe> = self
                .by_author
                .iter()
                .filter(|r| r.author_id == author_id)
                .cloned()
                .collect();
            if let Some(limit) = limit {
                recipes.truncate(limit as usize);
            }
            Ok(recipes)
        }
    }

    #[tokio::test]
    async fn should_subscribe_and_return_author_preview() {
        let author_id = Uuid::now_v7();
        let uc = SubscribeUseCase {
            subscriptions: MockSubscriptions::empty(),
            users: MockUsers {
                profiles: vec![profile(author_id, "chef")],
            },
            recipes: MockRecipes::with_count(author_id, 5),
        };
        let author = uc.execute(Uuid::now_v7(), author_id, Some(3)).await.unwrap();
        assert_eq!(author.profile.username, "chef");
        assert_eq!(author.recipes_count, 5);
        assert_eq!(author.recipes.len(), 3);
    }

    #[tokio::test]
    async fn should_reject_self_subscription() {
        let user_id = Uuid::now_v7();
        let uc = SubscribeUseCase {
            subscriptions: MockSubscriptions::empty(),
            users: MockUsers {
                profiles: vec![profile(user_id, "me")],
            },
            recipes: MockRecipes::with_count(user_id, 0),
        };
        let result = uc.execute(user_id, user_id, None).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn should_reject_subscribing_twice() {
        let user_id = Uuid::now_v7();
        let author_id = Uuid::now_v7();
        let uc = SubscribeUseCase {
            subscriptions: MockSubscriptions::empty(),
            users: MockUsers {
                profiles: vec![profile(author_id, "chef")],
            },
            recipes: MockRecipes::with_count(author_id, 0),
        };
        uc.execute(user_id, author_id, None).await.unwrap();
        let result = uc.execute(user_id, author_id, None).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_reject_subscribing_to_missing_user() {
        let uc = SubscribeUseCase {
            subscriptions: MockSubscriptions::empty(),
            users: MockUsers { profiles: vec![] },
            recipes: MockRecipes::with_count(Uuid::now_v7(), 0),
        };
        let result = uc.execute(Uuid::now_v7(), Uuid::now_v7(), None).await;
        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }

    #[tokio::test]
    async fn should_reject_unsubscribing_when_not_subscribed() {
        let author_id = Uuid::now_v7();
        let uc = UnsubscribeUseCase {
            subscriptions: MockSubscriptions::empty(),
            users: MockUsers {
                profiles: vec![profile(author_id, "chef")],
            },
        };
        let result = uc.execute(Uuid::now_v7(), author_id).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_list_subscriptions_with_capped_previews() {
        let author_id = Uuid::now_v7();
        let uc = ListSubscriptionsUseCase {
            subscriptions: MockSubscriptions {
                pairs: Mutex::new(HashSet::new()),
                authors: vec![profile(author_id, "chef")],
            },
            recipes: MockRecipes::with_count(author_id, 4),
        };
        let authors = uc
            .execute(Uuid::now_v7(), PageRequest::default(), Some(2))
            .await
            .unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].recipes_count, 4);
        assert_eq!(authors[0].recipes.len(), 2);
    }
}
