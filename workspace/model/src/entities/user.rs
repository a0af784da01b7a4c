use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use tracing::{info, instrument, trace};

use crate::error::ModelError;

/// A registered account that can obtain tokens.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A user about to be stored. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> crate::Result<Option<Model>> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> crate::Result<Option<Model>> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// Inserts an active user.
#[instrument(skip(db, new), fields(username = %new.username))]
pub async fn create(db: &DatabaseConnection, new: NewUser) -> crate::Result<Model> {
    trace!("Entering user::create");

    let user = ActiveModel {
        username: Set(new.username),
        email: Set(new.email),
        password_hash: Set(new.password_hash),
        full_name: Set(new.full_name),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| ModelError::on_write(e, || "Username or email already registered".to_string()))?;

    info!("User created with ID: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "abc123".to_string(),
            full_name: Some("Alice Doe".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = setup_db().await;

        let user = create(&db, alice()).await.unwrap();
        assert!(user.is_active);
        assert_eq!(user.full_name.as_deref(), Some("Alice Doe"));

        let by_name = find_by_username(&db, "alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        let by_email = find_by_email(&db, "alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(find_by_username(&db, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let db = setup_db().await;
        create(&db, alice()).await.unwrap();

        let err = create(
            &db,
            NewUser {
                username: "alice2".to_string(),
                ..alice()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ModelError::Conflict(_)));
    }
}
