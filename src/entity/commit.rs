//! Commit entity mirroring a repository commit, plus its generated article.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "commits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sha: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: DateTimeUtc,
    pub repository_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub article_content: Option<String>,
    pub article_generated: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::repository::Entity",
        from = "Column::RepositoryId",
        to = "super::repository::Column::Id"
    )]
    Repository,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
