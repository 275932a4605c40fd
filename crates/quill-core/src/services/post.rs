use std::sync::Arc;

use chrono::Utc;

use crate::authz::{self, Action};
use crate::domain::{Post, PostDetails};
use crate::error::DomainError;
use crate::ports::{BaseRepository, PostFilter, PostRepository};

/// Creation input; the author comes from the authenticated identity, never
/// from the request body.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
}

/// Edit input. The author cannot be reassigned through this path.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
}

/// Post CRUD with duplicate detection and owner-only mutation.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Create a post for `author_id`.
    ///
    /// The natural key is (title, author): the same title under a different
    /// author is fine. The check and the insert are separate store calls,
    /// so concurrent identical requests can race past the check.
    pub async fn create(&self, new: NewPost, author_id: i64) -> Result<PostDetails, DomainError> {
        match self.posts.find_duplicate(&new.title, author_id).await {
            Ok(Some(_)) => {
                tracing::warn!(author_id, title = %new.title, "duplicate post rejected");
                return Err(DomainError::Duplicate(
                    "Post with the same title already exists".to_string(),
                ));
            }
            Ok(None) => {}
            // A lookup failure of unknown kind blocks creation.
            Err(e) => return Err(e.into()),
        }

        let post = Post::new(new.title, new.description, author_id, new.category_id);
        let saved = self.posts.insert(post).await?;

        self.posts
            .find_details(saved.id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Post" })
    }

    pub async fn get(&self, id: i64) -> Result<PostDetails, DomainError> {
        self.posts
            .find_details(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Post" })
    }

    pub async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostDetails>, u64), DomainError> {
        Ok(self.posts.find_filtered(filter, offset, limit).await?)
    }

    pub async fn list_by_author(
        &self,
        author_id: i64,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostDetails>, u64), DomainError> {
        let filter = PostFilter::by_author(author_id);
        Ok(self.posts.find_filtered(&filter, offset, limit).await?)
    }

    /// Apply `changes` to the post, owner-only.
    pub async fn update(
        &self,
        id: i64,
        changes: PostUpdate,
        actor_id: i64,
    ) -> Result<PostDetails, DomainError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Post" })?;

        if !authz::can(actor_id, Action::Edit, &post) {
            return Err(DomainError::Forbidden(
                "You are not allowed to edit this post".to_string(),
            ));
        }

        post.title = changes.title;
        post.description = changes.description;
        post.category_id = changes.category_id;
        post.updated_at = Utc::now();
        self.posts.update(post).await?;

        self.posts
            .find_details(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Post" })
    }

    /// Delete the post, owner-only.
    pub async fn delete(&self, id: i64, actor_id: i64) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Post" })?;

        if !authz::can(actor_id, Action::Delete, &post) {
            return Err(DomainError::Forbidden(
                "You are not allowed to delete this post".to_string(),
            ));
        }

        Ok(self.posts.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::RepoError;
    use crate::ports::BaseRepository;

    #[derive(Default)]
    struct FakePostRepo {
        rows: Mutex<Vec<Post>>,
        fail_duplicate_lookup: bool,
    }

    impl FakePostRepo {
        fn details(post: Post) -> PostDetails {
            PostDetails {
                post,
                author_name: "author".to_string(),
                author_email: "author@example.com".to_string(),
                category_name: None,
            }
        }
    }

    #[async_trait]
    impl BaseRepository<Post> for FakePostRepo {
        async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn insert(&self, mut post: Post) -> Result<Post, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            post.id = rows.len() as i64 + 1;
            rows.push(post.clone());
            Ok(post)
        }

        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            *slot = post.clone();
            Ok(post)
        }

        async fn delete(&self, id: i64) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn find_duplicate(
            &self,
            title: &str,
            author_id: i64,
        ) -> Result<Option<Post>, RepoError> {
            if self.fail_duplicate_lookup {
                return Err(RepoError::Query("syntax error".to_string()));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.title == title && p.author_id == author_id)
                .cloned())
        }

        async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
            Ok(self.find_by_id(id).await?.map(Self::details))
        }

        async fn find_filtered(
            &self,
            filter: &PostFilter,
            offset: u64,
            limit: u64,
        ) -> Result<(Vec<PostDetails>, u64), RepoError> {
            let rows = self.rows.lock().unwrap();
            let matching: Vec<Post> = rows
                .iter()
                .filter(|p| filter.author_id.is_none_or(|a| p.author_id == a))
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let page = matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(Self::details)
                .collect();
            Ok((page, total))
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            description: "a description".to_string(),
            category_id: None,
        }
    }

    fn changes(title: &str) -> PostUpdate {
        PostUpdate {
            title: title.to_string(),
            description: "edited".to_string(),
            category_id: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_same_title_same_author_without_insert() {
        let repo = Arc::new(FakePostRepo::default());
        let svc = PostService::new(repo.clone());

        svc.create(new_post("Hello"), 1).await.unwrap();
        let err = svc.create(new_post("Hello"), 1).await.unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_allows_same_title_for_different_author() {
        let repo = Arc::new(FakePostRepo::default());
        let svc = PostService::new(repo.clone());

        svc.create(new_post("Hello"), 1).await.unwrap();
        svc.create(new_post("Hello"), 2).await.unwrap();

        assert_eq!(repo.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_blocks_on_unknown_duplicate_lookup_failure() {
        let repo = Arc::new(FakePostRepo {
            fail_duplicate_lookup: true,
            ..FakePostRepo::default()
        });
        let err = PostService::new(repo.clone())
            .create(new_post("Hello"), 1)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden_and_leaves_post_unchanged() {
        let repo = Arc::new(FakePostRepo::default());
        let svc = PostService::new(repo.clone());
        let created = svc.create(new_post("Hello"), 1).await.unwrap();

        let err = svc
            .update(created.post.id, changes("Hijacked"), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden(_)));
        let stored = repo.rows.lock().unwrap()[0].clone();
        assert_eq!(stored.title, "Hello");
    }

    #[tokio::test]
    async fn update_by_owner_applies_changes_but_not_authorship() {
        let repo = Arc::new(FakePostRepo::default());
        let svc = PostService::new(repo.clone());
        let created = svc.create(new_post("Hello"), 1).await.unwrap();

        let updated = svc
            .update(created.post.id, changes("Renamed"), 1)
            .await
            .unwrap();

        assert_eq!(updated.post.title, "Renamed");
        assert_eq!(updated.post.author_id, 1);
    }

    #[tokio::test]
    async fn delete_by_non_owner_is_forbidden() {
        let repo = Arc::new(FakePostRepo::default());
        let svc = PostService::new(repo.clone());
        let created = svc.create(new_post("Hello"), 1).await.unwrap();

        let err = svc.delete(created.post.id, 2).await.unwrap_err();

        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_post_is_not_found() {
        let svc = PostService::new(Arc::new(FakePostRepo::default()));
        let err = svc.delete(42, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
