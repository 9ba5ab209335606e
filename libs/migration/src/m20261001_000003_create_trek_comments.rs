use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrekComments::Table)
                    .if_not_exists()
                    .col(pk_uuid(TrekComments::Id))
                    .col(uuid(TrekComments::UserId))
                    .col(big_integer(TrekComments::TrekId))
                    .col(double_null(TrekComments::Rating))
                    .col(text(TrekComments::Text).default(""))
                    .col(json(TrekComments::Images).default("[]"))
                    .col(
                        timestamp_with_time_zone(TrekComments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trek_comments_user")
                            .from(TrekComments::Table, TrekComments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trek_comments_trek")
                            .from(TrekComments::Table, TrekComments::TrekId)
                            .to(Treks::Table, Treks::TourId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trek_comments_trek_id")
                    .table(TrekComments::Table)
                    .col(TrekComments::TrekId)
                    .to_owned(),
            )
            .await?;

        // Recent ratings per user feed the personalized search
        manager
            .create_index(
                Index::create()
                    .name("idx_trek_comments_user_created")
                    .table(TrekComments::Table)
                    .col(TrekComments::UserId)
                    .col(TrekComments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrekComments::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TrekComments {
    Table,
    Id,
    UserId,
    TrekId,
    Rating,
    Text,
    Images,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Treks {
    Table,
    TourId,
}
