use crate::error::UserError;
use crate::models::{Coordinate, User};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub liked_embedding: Json,
    pub disliked_embedding: Json,
    pub liked_tours: Json,
    pub disliked_tours: Json,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn decode_column<T: DeserializeOwned>(id: Uuid, column: &str, value: Json) -> Result<T, UserError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(user_id = %id, column, error = %e, "Corrupt user column");
        UserError::Internal(format!("Corrupt {} column for user {}", column, id))
    })
}

// A corrupt column fails the read so a later write cannot replace the
// stored history with an empty one.
impl TryFrom<Model> for User {
    type Error = UserError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let location = match (model.latitude, model.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        };

        Ok(Self {
            id,
            user_name: model.user_name,
            first_name: model.first_name,
            last_name: model.last_name,
            password_hash: model.password_hash,
            liked_embedding: decode_column(id, "liked_embedding", model.liked_embedding)?,
            disliked_embedding: decode_column(id, "disliked_embedding", model.disliked_embedding)?,
            liked_tours: decode_column(id, "liked_tours", model.liked_tours)?,
            disliked_tours: decode_column(id, "disliked_tours", model.disliked_tours)?,
            location,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            user_name: Set(user.user_name.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            liked_embedding: Set(Json::from(user.liked_embedding.clone())),
            disliked_embedding: Set(Json::from(user.disliked_embedding.clone())),
            liked_tours: Set(Json::from(user.liked_tours.clone())),
            disliked_tours: Set(Json::from(user.disliked_tours.clone())),
            latitude: Set(user.location.map(|c| c.latitude)),
            longitude: Set(user.location.map(|c| c.longitude)),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
