use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;

use crate::domain::repository::{SubscriptionRepository, UserRepository};
use crate::domain::types::UserView;
use crate::error::ApiError;

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> ListUsersUseCase<U, S> {
    /// Profiles with the viewer's follow flag. Anonymous viewers get
    /// `is_subscribed: false` everywhere.
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<UserView>, ApiError> {
        let profiles = self.users.list(page).await?;

        let followed = match viewer {
            Some(viewer) => {
                let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
                self.subscriptions.author_ids_for_user(viewer, &ids).await?
            }
            None => vec![],
        };

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let is_subscribed = followed.contains(&profile.id);
                UserView {
                    profile,
                    is_subscribed,
                }
            })
            .collect())
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> GetUserUseCase<U, S> {
    pub async fn execute(&self, viewer: Option<Uuid>, id: Uuid) -> Result<UserView, ApiError> {
        let profile = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let is_subscribed = match viewer {
            Some(viewer) => !self
                .subscriptions
                .author_ids_for_user(viewer, &[id])
                .await?
                .is_empty(),
            None => false,
        };

        Ok(UserView {
            profile,
            is_subscribed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserProfile;
    use chrono::Utc;
    use std::collections::HashSet;

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
        pairs: HashSet<(Uuid, Uuid)>,
    }

    impl SubscriptionRepository for MockSubscriptions {
        async fn insert(&self, _user_id: Uuid, _author_id: Uuid) -> Result<bool, ApiError> {
            unreachable!()
        }
        async fn delete(&self, _user_id: Uuid, _author_id: Uuid) -> Result<bool, ApiError> {
            unreachable!()
        }
        async fn author_ids_for_user(
            &self,
            user_id: Uuid,
            author_ids: &[Uuid],
        ) -> Result<Vec<Uuid>, ApiError> {
            Ok(author_ids
                .iter()
                .copied()
                .filter(|&id| self.pairs.contains(&(user_id, id)))
                .collect())
        }
        async fn list_authors(
            &self,
            _user_id: Uuid,
            _page: PageRequest,
        ) -> Result<Vec<UserProfile>, ApiError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn should_mark_followed_authors_in_listing() {
        let viewer = Uuid::now_v7();
        let followed = Uuid::now_v7();
        let other = Uuid::now_v7();
        let uc = ListUsersUseCase {
            users: MockUsers {
                profiles: vec![profile(followed, "chef"), profile(other, "baker")],
            },
            subscriptions: MockSubscriptions {
                pairs: HashSet::from([(viewer, followed)]),
            },
        };
        let views = uc
            .execute(Some(viewer), PageRequest::default())
            .await
            .unwrap();
        assert!(views.iter().find(|v| v.profile.id == followed).unwrap().is_subscribed);
        assert!(!views.iter().find(|v| v.profile.id == other).unwrap().is_subscribed);
    }

    #[tokio::test]
    async fn should_mark_nothing_for_anonymous_viewer() {
        let uc = ListUsersUseCase {
            users: MockUsers {
                profiles: vec![profile(Uuid::now_v7(), "chef")],
            },
            subscriptions: MockSubscriptions {
                pairs: HashSet::new(),
            },
        };
        let views = uc.execute(None, PageRequest::default()).await.unwrap();
        assert!(views.iter().all(|v| !v.is_subscribed));
    }

    #[tokio::test]
    async fn should_get_user_with_follow_flag() {
        let viewer = Uuid::now_v7();
        let author = Uuid::now_v7();
        let uc = GetUserUseCase {
            users: MockUsers {
                profiles: vec![profile(author, "chef")],
            },
            subscriptions: MockSubscriptions {
                pairs: HashSet::from([(viewer, author)]),
            },
        };
        let view = uc.execute(Some(viewer), author).await.unwrap();
        assert!(view.is_subscribed);
    }

    #[tokio::test]
    async fn should_return_user_not_found_for_unknown_id() {
        let uc = GetUserUseCase {
            users: MockUsers { profiles: vec![] },
            subscriptions: MockSubscriptions {
                pairs: HashSet::new(),
            },
        };
        let result = uc.execute(None, Uuid::now_v7()).await;
        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }
}
