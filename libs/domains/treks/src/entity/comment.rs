use crate::models::TrekComment;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trek_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub trek_id: i64,
    pub rating: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub images: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trek::Entity",
        from = "Column::TrekId",
        to = "super::trek::Column::TourId"
    )]
    Trek,
}

impl Related<super::trek::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trek.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TrekComment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            trek_id: model.trek_id,
            rating: model.rating,
            text: model.text,
            images: serde_json::from_value(model.images).unwrap_or_default(),
            created_at: model.created_at.into(),
        }
    }
}

impl From<&TrekComment> for ActiveModel {
    fn from(comment: &TrekComment) -> Self {
        ActiveModel {
            id: Set(comment.id),
            user_id: Set(comment.user_id),
            trek_id: Set(comment.trek_id),
            rating: Set(comment.rating),
            text: Set(comment.text.clone()),
            images: Set(Json::from(comment.images.clone())),
            created_at: Set(comment.created_at.into()),
        }
    }
}
