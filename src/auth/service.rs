use model::ModelError;
use model::entities::user::{self, NewUser};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument, trace, warn};

use super::{AuthError, AuthKeys};

/// Registration input with the password still in plaintext.
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Creates a user after checking that the username, then the email, are free.
#[instrument(skip(db, keys, account), fields(username = %account.username))]
pub async fn register(
    db: &DatabaseConnection,
    keys: &AuthKeys,
    account: NewAccount,
) -> Result<user::Model, AuthError> {
    trace!("Entering register");

    if user::find_by_username(db, &account.username).await?.is_some() {
        warn!("Username '{}' already registered", account.username);
        return Err(ModelError::Conflict("Username already registered".to_string()).into());
    }
    if user::find_by_email(db, &account.email).await?.is_some() {
        warn!("Email for '{}' already registered", account.username);
        return Err(ModelError::Conflict("Email already registered".to_string()).into());
    }

    let user = user::create(
        db,
        NewUser {
            password_hash: keys.hash_password(&account.password),
            username: account.username,
            email: account.email,
            full_name: account.full_name,
        },
    )
    .await?;

    info!("Registered user {} with ID {}", user.username, user.id);
    Ok(user)
}

/// Returns the user when the username exists and the password matches.
///
/// Both failure cases produce the same error.
#[instrument(skip(db, keys, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    keys: &AuthKeys,
    username: &str,
    password: &str,
) -> Result<user::Model, AuthError> {
    let Some(user) = user::find_by_username(db, username).await? else {
        warn!("Login attempt for unknown user '{}'", username);
        return Err(AuthError::WrongCredentials);
    };
    if !keys.verify_password(password, &user.password_hash) {
        warn!("Wrong password for user '{}'", username);
        return Err(AuthError::WrongCredentials);
    }
    debug!("User '{}' authenticated", username);
    Ok(user)
}

/// Verifies `token` and loads the user named by its subject.
pub async fn resolve_user(
    db: &DatabaseConnection,
    keys: &AuthKeys,
    token: &str,
) -> Result<user::Model, AuthError> {
    let claims = keys.verify_token(token)?;
    match user::find_by_username(db, &claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            warn!("Token subject '{}' does not exist", claims.sub);
            Err(AuthError::InvalidToken)
        }
    }
}
