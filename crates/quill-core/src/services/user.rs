use std::sync::Arc;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{BaseRepository, PasswordService, TokenService, UserRepository};

/// Registration input; the password is still plain text here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User registration, authentication and listing.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Register a new account.
    ///
    /// The email existence check and the insert are separate store calls;
    /// two concurrent registrations for the same email can both pass the
    /// check. The store's unique index reports (not prevents) that race.
    pub async fn register(&self, new: NewUser) -> Result<User, DomainError> {
        match self.users.find_by_email(&new.email).await {
            Ok(Some(_)) => {
                tracing::warn!("registration attempt for an already registered email");
                return Err(DomainError::Duplicate(
                    "Email already registered".to_string(),
                ));
            }
            Ok(None) => {}
            // A lookup failure of unknown kind blocks creation.
            Err(e) => return Err(e.into()),
        }

        let password_hash = self
            .passwords
            .hash(&new.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = User::new(new.name, new.email, password_hash);
        Ok(self.users.insert(user).await?)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, String), DomainError> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => return Err(DomainError::Unauthorized),
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok((user, token))
    }

    pub async fn get(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { entity: "User" })
    }

    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::RepoError;
    use crate::ports::{AuthError, BaseRepository, TokenClaims};

    #[derive(Default)]
    struct FakeUserRepo {
        rows: Mutex<Vec<User>>,
        fail_lookup: bool,
    }

    #[async_trait]
    impl BaseRepository<User> for FakeUserRepo {
        async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned())
        }

        async fn insert(&self, mut user: User) -> Result<User, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            user.id = rows.len() as i64 + 1;
            rows.push(user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User, RepoError> {
            Ok(user)
        }

        async fn delete(&self, _id: i64) -> Result<(), RepoError> {
            Err(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            if self.fail_lookup {
                return Err(RepoError::Connection("store unreachable".to_string()));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_all(&self) -> Result<Vec<User>, RepoError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    struct FakePasswords;

    impl PasswordService for FakePasswords {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            Ok(format!("h:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
            Ok(hash == format!("h:{password}"))
        }
    }

    struct FakeTokens;

    impl TokenService for FakeTokens {
        fn issue(&self, user_id: i64) -> Result<String, AuthError> {
            Ok(format!("token-{user_id}"))
        }

        fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
            let user_id = token
                .strip_prefix("token-")
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| AuthError::InvalidToken("bad fake token".to_string()))?;
            Ok(TokenClaims { user_id, exp: 0 })
        }

        fn expiry_seconds(&self) -> i64 {
            86_400
        }
    }

    fn service(repo: Arc<FakeUserRepo>) -> UserService {
        UserService::new(repo, Arc::new(FakePasswords), Arc::new(FakeTokens))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn register_hashes_password_and_assigns_id() {
        let repo = Arc::new(FakeUserRepo::default());
        let user = service(repo).register(new_user("a@b.io")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.password_hash, "h:correct horse");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email_without_insert() {
        let repo = Arc::new(FakeUserRepo::default());
        let svc = service(repo.clone());

        svc.register(new_user("a@b.io")).await.unwrap();
        let err = svc.register(new_user("a@b.io")).await.unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_blocks_on_unknown_lookup_failure() {
        let repo = Arc::new(FakeUserRepo {
            fail_lookup: true,
            ..FakeUserRepo::default()
        });
        let err = service(repo.clone())
            .register(new_user("a@b.io"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authenticate_returns_token_for_valid_credentials() {
        let repo = Arc::new(FakeUserRepo::default());
        let svc = service(repo);

        let user = svc.register(new_user("a@b.io")).await.unwrap();
        let (authed, token) = svc.authenticate("a@b.io", "correct horse").await.unwrap();

        assert_eq!(authed.id, user.id);
        assert_eq!(token, format!("token-{}", user.id));
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_unknown_email_alike() {
        let repo = Arc::new(FakeUserRepo::default());
        let svc = service(repo);
        svc.register(new_user("a@b.io")).await.unwrap();

        let wrong = svc.authenticate("a@b.io", "nope").await.unwrap_err();
        let unknown = svc.authenticate("x@b.io", "nope").await.unwrap_err();

        assert!(matches!(wrong, DomainError::Unauthorized));
        assert!(matches!(unknown, DomainError::Unauthorized));
    }
}
