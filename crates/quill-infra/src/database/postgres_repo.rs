//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};

use quill_core::domain::{Category, Post, PostDetails, User};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostFilter, PostRepository, UserRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask the address so no PII lands in the logs.
        tracing::debug!(user_email = %mask_email(email), "finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            format!("{}***@{}", &local[..1], domain)
        }
        _ => "***".to_string(),
    }
}

/// Row shape for the hydrated post queries: the post's own columns plus the
/// joined author and category columns.
#[derive(Debug, FromQueryResult)]
struct PostDetailsRow {
    id: i64,
    title: String,
    description: String,
    author_id: i64,
    category_id: Option<i64>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    author_name: String,
    author_email: String,
    category_name: Option<String>,
}

impl From<PostDetailsRow> for PostDetails {
    fn from(row: PostDetailsRow) -> Self {
        Self {
            post: Post {
                id: row.id,
                title: row.title,
                description: row.description,
                author_id: row.author_id,
                category_id: row.category_id,
                created_at: row.created_at.into(),
                updated_at: row.updated_at.into(),
            },
            author_name: row.author_name,
            author_email: row.author_email,
            category_name: row.category_name,
        }
    }
}

fn details_select() -> Select<PostEntity> {
    PostEntity::find()
        .join(JoinType::InnerJoin, post::Relation::Author.def())
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .column_as(user::Column::Name, "author_name")
        .column_as(user::Column::Email, "author_email")
        .column_as(category::Column::Name, "category_name")
}

/// Conjunctive filter; empty parts leave the result set unrestricted.
fn filter_condition(filter: &PostFilter) -> Condition {
    let mut cond = Condition::all();

    if let Some(term) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{term}%");
        cond = cond.add(
            Condition::any()
                .add(Expr::col(post::Column::Title).ilike(pattern.clone()))
                .add(Expr::col(post::Column::Description).ilike(pattern)),
        );
    }
    if let Some(id) = filter.category_id {
        cond = cond.add(post::Column::CategoryId.eq(id));
    }
    if let Some(id) = filter.author_id {
        cond = cond.add(post::Column::AuthorId.eq(id));
    }

    cond
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_duplicate(
        &self,
        title: &str,
        author_id: i64,
    ) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Title.eq(title))
            .filter(post::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
        let row = details_select()
            .filter(post::Column::Id.eq(id))
            .into_model::<PostDetailsRow>()
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(row.map(Into::into))
    }

    async fn find_filtered(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<PostDetails>, u64), RepoError> {
        let cond = filter_condition(filter);

        // Total over the same filter, ignoring pagination.
        let total = PostEntity::find()
            .filter(cond.clone())
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = details_select()
            .filter(cond)
            .order_by_desc(post::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .into_model::<PostDetailsRow>()
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Category>, u64), RepoError> {
        let total = CategoryEntity::find()
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let rows = CategoryEntity::find()
            .order_by_asc(category::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}
