use crate::models::{CoverImage, Trek};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM Entity for the treks catalog table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "treks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tour_id: i64,
    pub title: String,
    pub route_type: String,
    pub difficulty: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub short_description: String,
    #[sea_orm(column_type = "Text")]
    pub long_description: String,
    pub images: Json,
    pub cover_image: Option<Json>,
    pub amenities: Json,
    pub tags: Json,
    pub best_months: Json,
    pub url: String,
    pub map_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Trek {
    fn from(model: Model) -> Self {
        // A malformed cover image is treated as absent
        let cover_image = model
            .cover_image
            .and_then(|v| serde_json::from_value::<CoverImage>(v).ok());

        Self {
            tour_id: model.tour_id,
            title: model.title,
            route_type: model.route_type,
            difficulty: model.difficulty,
            short_description: model.short_description,
            long_description: model.long_description,
            images: serde_json::from_value(model.images).unwrap_or_default(),
            cover_image,
            amenities: model.amenities,
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            best_months: serde_json::from_value(model.best_months).unwrap_or_default(),
            url: model.url,
            map_url: model.map_url,
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}
