use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Messages {
    Table,
    MessageId,
    TopicId,
    AuthorId,
    Content,
    Created,
}

#[derive(DeriveIden)]
enum Topics {
    Table,
    TopicId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::MessageId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::TopicId).integer().not_null())
                    .col(ColumnDef::new(Messages::AuthorId).integer().not_null())
                    .col(
                        ColumnDef::new(Messages::Content)
                            .text()
                            .not_null()
                            .check(Expr::cust("char_length(content) > 0")),
                    )
                    .col(
                        ColumnDef::new(Messages::Created)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_topic_id")
                            .from(Messages::Table, Messages::TopicId)
                            .to(Topics::Table, Topics::TopicId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_messages_author_id")
                            .from(Messages::Table, Messages::AuthorId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_topic_created")
                    .table(Messages::Table)
                    .col(Messages::TopicId)
                    .col(Messages::Created)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}
