use std::sync::Arc;

use crate::domain::Category;
use crate::error::DomainError;
use crate::ports::{BaseRepository, CategoryRepository};

/// Category creation, listing and deletion. Categories have no owner:
/// any authenticated caller may create or delete one.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// Create a category, duplicate-checked by name.
    ///
    /// Same best-effort caveat as the other create paths: the name check and
    /// the insert are not atomic.
    pub async fn add(&self, name: String) -> Result<Category, DomainError> {
        match self.categories.find_by_name(&name).await {
            Ok(Some(_)) => {
                tracing::warn!(name = %name, "duplicate category rejected");
                return Err(DomainError::Duplicate(
                    "Category already exists".to_string(),
                ));
            }
            Ok(None) => {}
            // A lookup failure of unknown kind blocks creation.
            Err(e) => return Err(e.into()),
        }

        Ok(self.categories.insert(Category::new(name)).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Category" })
    }

    pub async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Category>, u64), DomainError> {
        Ok(self.categories.list(offset, limit).await?)
    }

    /// Delete a category by id. Posts referencing it keep existing with the
    /// reference nulled by the store.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "Category" })?;

        Ok(self.categories.delete(id).await?)
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
    struct FakeCategoryRepo {
        rows: Mutex<Vec<Category>>,
    }

    #[async_trait]
    impl BaseRepository<Category> for FakeCategoryRepo {
        async fn find_by_id(&self, id: i64) -> Result<Option<Category>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .cloned())
        }

        async fn insert(&self, mut category: Category) -> Result<Category, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            category.id = rows.len() as i64 + 1;
            rows.push(category.clone());
            Ok(category)
        }

        async fn update(&self, category: Category) -> Result<Category, RepoError> {
            Ok(category)
        }

        async fn delete(&self, id: i64) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|c| c.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CategoryRepository for FakeCategoryRepo {
        async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.name == name)
                .cloned())
        }

        async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Category>, u64), RepoError> {
            let rows = self.rows.lock().unwrap();
            let total = rows.len() as u64;
            let page = rows
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok((page, total))
        }
    }

    #[tokio::test]
    async fn add_rejects_duplicate_name() {
        let repo = Arc::new(FakeCategoryRepo::default());
        let svc = CategoryService::new(repo.clone());

        svc.add("rust".to_string()).await.unwrap();
        let err = svc.add("rust".to_string()).await.unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_category_is_not_found() {
        let svc = CategoryService::new(Arc::new(FakeCategoryRepo::default()));
        let err = svc.delete(9).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_returns_page_and_total() {
        let repo = Arc::new(FakeCategoryRepo::default());
        let svc = CategoryService::new(repo);
        for name in ["a", "b", "c"] {
            svc.add(name.to_string()).await.unwrap();
        }

        let (page, total) = svc.list(1, 1).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b");
    }
}
