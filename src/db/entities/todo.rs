use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[base_entity]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    pub title: String,
    pub description: String,
    #[sea_orm(indexed, default_value = false)]
    pub completed: bool,
}

impl ActiveModelBehavior for ActiveModel {}
