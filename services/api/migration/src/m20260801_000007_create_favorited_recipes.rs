use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoritedRecipes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FavoritedRecipes::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(FavoritedRecipes::RecipeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoritedRecipes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(FavoritedRecipes::UserId)
                            .col(FavoritedRecipes::RecipeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FavoritedRecipes::Table, FavoritedRecipes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FavoritedRecipes::Table, FavoritedRecipes::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoritedRecipes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(crate) enum FavoritedRecipes {
    Table,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
}
