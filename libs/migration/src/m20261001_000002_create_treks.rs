use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Catalog rows keep the recommender's tour ids, so no generated key.
        manager
            .create_table(
                Table::create()
                    .table(Treks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Treks::TourId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Treks::Title))
                    .col(string(Treks::RouteType).default(""))
                    .col(string_null(Treks::Difficulty))
                    .col(text(Treks::ShortDescription).default(""))
                    .col(text(Treks::LongDescription).default(""))
                    .col(json(Treks::Images).default("[]"))
                    .col(json_null(Treks::CoverImage))
                    .col(json(Treks::Amenities).default("{}"))
                    .col(json(Treks::Tags).default("[]"))
                    .col(json(Treks::BestMonths).default("[]"))
                    .col(string(Treks::Url).default(""))
                    .col(string(Treks::MapUrl).default(""))
                    .col(double(Treks::Latitude))
                    .col(double(Treks::Longitude))
                    .col(
                        timestamp_with_time_zone(Treks::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Treks::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER treks_touch_updated_at
                    BEFORE UPDATE ON treks
                    FOR EACH ROW
                    EXECUTE FUNCTION util.touch_updated_at()
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TRIGGER IF EXISTS treks_touch_updated_at ON treks")
            .await?;

        manager
            .drop_table(Table::drop().table(Treks::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Treks {
    Table,
    TourId,
    Title,
    RouteType,
    Difficulty,
    ShortDescription,
    LongDescription,
    Images,
    CoverImage,
    Amenities,
    Tags,
    BestMonths,
    Url,
    MapUrl,
    Latitude,
    Longitude,
    CreatedAt,
    UpdatedAt,
}
