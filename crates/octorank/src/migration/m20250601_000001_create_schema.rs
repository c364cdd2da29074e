//! Initial migration creating the octorank schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_tracked_users(manager).await?;
        self.create_repositories(manager).await?;
        self.create_organizations(manager).await?;
        self.create_languages(manager).await?;
        self.create_rank_entries(manager).await?;
        self.create_queues(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            BlockedUsers::Table.into_iden(),
            DeferredUsers::Table.into_iden(),
            RankEntries::Table.into_iden(),
            UserLanguages::Table.into_iden(),
            Languages::Table.into_iden(),
            UserOrganizations::Table.into_iden(),
            Organizations::Table.into_iden(),
            Repositories::Table.into_iden(),
            TrackedUsers::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

impl Migration {
    async fn create_tracked_users(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::Status)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    // Profile
                    .col(ColumnDef::new(TrackedUsers::Name).string().null())
                    .col(ColumnDef::new(TrackedUsers::Email).string().null())
                    .col(ColumnDef::new(TrackedUsers::Location).string().null())
                    .col(ColumnDef::new(TrackedUsers::AvatarUrl).text().null())
                    .col(ColumnDef::new(TrackedUsers::Company).string().null())
                    .col(ColumnDef::new(TrackedUsers::Bio).string().null())
                    .col(ColumnDef::new(TrackedUsers::Blog).string().null())
                    .col(
                        ColumnDef::new(TrackedUsers::PublicRepos)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::Followers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::Following)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Aggregates
                    .col(
                        ColumnDef::new(TrackedUsers::TotalContribution)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::TotalStargazers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::ContinuousCommitDays)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::TotalScore)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TrackedUsers::CurrentRank).integer().null())
                    .col(ColumnDef::new(TrackedUsers::PreviousRank).integer().null())
                    .col(
                        ColumnDef::new(TrackedUsers::Tier)
                            .string()
                            .not_null()
                            .default("iron"),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_repositories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Repositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repositories::UserId).uuid().not_null())
                    .col(ColumnDef::new(Repositories::Name).string().not_null())
                    .col(ColumnDef::new(Repositories::FullName).string().not_null())
                    .col(ColumnDef::new(Repositories::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Repositories::Contribution)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Repositories::Stargazers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Repositories::PrimaryLanguage)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Repositories::Languages)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Repositories::Table, Repositories::UserId)
                            .to(TrackedUsers::Table, TrackedUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_repositories_user_id")
                    .table(Repositories::Table)
                    .col(Repositories::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn create_organizations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Organizations::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Organizations::Description).string().null())
                    .col(ColumnDef::new(Organizations::LogoUrl).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserOrganizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserOrganizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserOrganizations::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserOrganizations::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserOrganizations::Table, UserOrganizations::UserId)
                            .to(TrackedUsers::Table, TrackedUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserOrganizations::Table, UserOrganizations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_organizations_user_id")
                    .table(UserOrganizations::Table)
                    .col(UserOrganizations::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn create_languages(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Languages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Languages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Languages::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserLanguages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLanguages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserLanguages::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserLanguages::LanguageId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserLanguages::Bytes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLanguages::Table, UserLanguages::UserId)
                            .to(TrackedUsers::Table, TrackedUsers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserLanguages::Table, UserLanguages::LanguageId)
                            .to(Languages::Table, Languages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_languages_user_language")
                    .table(UserLanguages::Table)
                    .col(UserLanguages::UserId)
                    .col(UserLanguages::LanguageId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn create_rank_entries(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RankEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RankEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RankEntries::Signal).string().not_null())
                    .col(ColumnDef::new(RankEntries::Position).integer().not_null())
                    .col(ColumnDef::new(RankEntries::UserId).uuid().null())
                    .col(
                        ColumnDef::new(RankEntries::Score)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rank_entries_signal_position")
                    .table(RankEntries::Table)
                    .col(RankEntries::Signal)
                    .col(RankEntries::Position)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn create_queues(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeferredUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeferredUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeferredUsers::Username).string().not_null())
                    .col(
                        ColumnDef::new(DeferredUsers::Status)
                            .string()
                            .not_null()
                            .default("ready"),
                    )
                    .col(
                        ColumnDef::new(DeferredUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeferredUsers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlockedUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlockedUsers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlockedUsers::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedUsers {
    Table,
    Id,
    Username,
    Status,
    Name,
    Email,
    Location,
    AvatarUrl,
    Company,
    Bio,
    Blog,
    PublicRepos,
    Followers,
    Following,
    TotalContribution,
    TotalStargazers,
    ContinuousCommitDays,
    TotalScore,
    CurrentRank,
    PreviousRank,
    Tier,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Repositories {
    Table,
    Id,
    UserId,
    Name,
    FullName,
    Owner,
    Contribution,
    Stargazers,
    PrimaryLanguage,
    Languages,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Description,
    LogoUrl,
}

#[derive(DeriveIden)]
enum UserOrganizations {
    Table,
    Id,
    UserId,
    OrganizationId,
}

#[derive(DeriveIden)]
enum Languages {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum UserLanguages {
    Table,
    Id,
    UserId,
    LanguageId,
    Bytes,
}

#[derive(DeriveIden)]
enum RankEntries {
    Table,
    Id,
    Signal,
    Position,
    UserId,
    Score,
}

#[derive(DeriveIden)]
enum DeferredUsers {
    Table,
    Id,
    Username,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BlockedUsers {
    Table,
    Id,
    Username,
}
