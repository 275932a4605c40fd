//! In-memory repositories.
//!
//! Fully functional implementations of the repository ports, used when no
//! database is configured and by the HTTP-level tests. Each call takes the
//! table lock once: per-call atomicity only, so multi-step sequences see
//! the same races a real store would.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{Category, Post, PostDetails, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, PostFilter, PostRepository, UserRepository,
};

/// Anything storable in an in-memory table.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for Post {
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Record for Category {
    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Generic in-memory table behind an async RwLock.
pub struct InMemoryRepository<T> {
    table: RwLock<Table<T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, mut entity: T) -> Result<T, RepoError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;
        entity.set_id(id);
        table.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        table.rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        match self.table.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

/// In-memory user repository.
pub type InMemoryUserRepository = InMemoryRepository<User>;

/// In-memory category repository.
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryRepository<Category> {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Category>, u64), RepoError> {
        let table = self.table.read().await;
        let total = table.rows.len() as u64;
        let page = table
            .rows
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

/// In-memory post repository. Holds handles to the sibling tables so the
/// detail queries can hydrate author and category the way the SQL joins do.
pub struct InMemoryPostRepository {
    posts: InMemoryRepository<Post>,
    users: Arc<InMemoryUserRepository>,
    categories: Arc<InMemoryCategoryRepository>,
}

impl InMemoryPostRepository {
    pub fn new(
        users: Arc<InMemoryUserRepository>,
        categories: Arc<InMemoryCategoryRepository>,
    ) -> Self {
        Self {
            posts: InMemoryRepository::new(),
            users,
            categories,
        }
    }

    async fn hydrate(&self, post: Post) -> Result<PostDetails, RepoError> {
        let author = self.users.find_by_id(post.author_id).await?.ok_or_else(|| {
            RepoError::Query(format!(
                "post {} references missing author {}",
                post.id, post.author_id
            ))
        })?;

        // A vanished category reads as "no category", matching the
        // ON DELETE SET NULL behavior of the real schema.
        let category_name = match post.category_id {
            Some(id) => self.categories.find_by_id(id).await?.map(|c| c.name),
            None => None,
        };

        Ok(PostDetails {
            author_name: author.name,
            author_email: author.email,
            category_name,
            post,
        })
    }

    fn matches(post: &Post, filter: &PostFilter) -> bool {
        if let Some(term) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            let hit = post.title.to_lowercase().contains(&term)
                || post.description.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(id) = filter.category_id {
            if post.category_id != Some(id) {
                return false;
            }
        }
        if let Some(id) = filter.author_id {
            if post.author_id != id {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl BaseRepository<Post> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        self.posts.find_by_id(id).await
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.insert(post).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.posts.update(post).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.posts.delete(id).await
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_duplicate(
        &self,
        title: &str,
        author_id: i64,
    ) -> Result<Option<Post>, RepoError> {
        Ok(self
            .posts
            .table
            .read()
            .await
            .rows
            .values()
            .find(|p| p.title == title && p.author_id == author_id)
            .cloned())
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
        match self.posts.find_by_id(id).await? {
            Some(post) => Ok(Some(self.hydrate(post).await?)),
            None => Ok(None),
        }
    }

    async fn find_filtered(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostDetails>, u64), RepoError> {
        let mut matching: Vec<Post> = {
            let table = self.posts.table.read().await;
            table
                .rows
                .values()
                .filter(|p| Self::matches(p, filter))
                .cloned()
                .collect()
        };
        // Newest first; id breaks ties for same-instant rows.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let mut page = Vec::new();
        for post in matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
        {
            page.push(self.hydrate(post).await?);
        }

        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;

    async fn seed() -> (InMemoryPostRepository, i64, i64, i64) {
        let users = Arc::new(InMemoryUserRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let posts = InMemoryPostRepository::new(users.clone(), categories.clone());

        let ann = users
            .insert(User::new(
                "Ann".to_string(),
                "ann@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let bob = users
            .insert(User::new(
                "Bob".to_string(),
                "bob@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        let pets = categories
            .insert(Category::new("pets".to_string()))
            .await
            .unwrap();

        let base = Utc::now();
        let specs = [
            ("Cat care", "feline tips", ann.id, Some(pets.id)),
            ("Dog care", "canine tips", ann.id, Some(pets.id)),
            ("Concatenation", "string tricks", bob.id, None),
        ];
        for (i, (title, description, author, category)) in specs.into_iter().enumerate() {
            let mut post = Post::new(
                title.to_string(),
                description.to_string(),
                author,
                category,
            );
            post.created_at = base + TimeDelta::seconds(i as i64);
            posts.insert(post).await.unwrap();
        }

        (posts, ann.id, bob.id, pets.id)
    }

    #[tokio::test]
    async fn crud_roundtrip_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let user = repo
            .insert(User::new(
                "Ann".to_string(),
                "ann@example.com".to_string(),
                "hash".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(user.id, 1);

        let found = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.email, "ann@example.com");

        repo.delete(1).await.unwrap();
        assert!(repo.find_by_id(1).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(1).await.unwrap_err(),
            RepoError::NotFound
        ));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_title_and_description() {
        let (posts, ..) = seed().await;
        let filter = PostFilter {
            search: Some("CAT".to_string()),
            ..PostFilter::default()
        };

        let (page, total) = posts.find_filtered(&filter, 0, 10).await.unwrap();

        // "Cat care" by title, "Concatenation" by substring.
        assert_eq!(total, 2);
        let titles: Vec<_> = page.iter().map(|d| d.post.title.as_str()).collect();
        assert!(titles.contains(&"Cat care"));
        assert!(titles.contains(&"Concatenation"));
    }

    #[tokio::test]
    async fn filters_are_conjunctive() {
        let (posts, ann, _bob, pets) = seed().await;
        let filter = PostFilter {
            search: Some("cat".to_string()),
            category_id: Some(pets),
            author_id: Some(ann),
        };

        let (page, total) = posts.find_filtered(&filter, 0, 10).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(page[0].post.title, "Cat care");
    }

    #[tokio::test]
    async fn empty_filter_matches_all_newest_first() {
        let (posts, ..) = seed().await;

        let (page, total) = posts.find_filtered(&PostFilter::default(), 0, 10).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page[0].post.title, "Concatenation");
        assert_eq!(page[2].post.title, "Cat care");
    }

    #[tokio::test]
    async fn total_ignores_pagination() {
        let (posts, ..) = seed().await;

        let (page, total) = posts.find_filtered(&PostFilter::default(), 1, 1).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].post.title, "Dog care");
    }

    #[tokio::test]
    async fn deleted_category_reads_as_none() {
        let (posts, _ann, _bob, pets) = seed().await;
        posts.categories.delete(pets).await.unwrap();

        let details = posts.find_details(1).await.unwrap().unwrap();

        assert!(details.category_name.is_none());
    }
}
