use crate::utils::slugify;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub topics_count: i32,
    /// Packed 0xRRGGBB value.
    pub color: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Lower-case 6 digit hex of the lowest 24 bits of `color`.
    pub fn color_hex(&self) -> String {
        format!("{:06x}", (self.color as u32) & 0x00FF_FFFF)
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}
