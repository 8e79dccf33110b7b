use std::sync::Arc;

use crate::descriptors::{Align, ColumnDescriptor, FieldDescriptor};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{Rule, RuleSchema, Validator};

pub struct BranchDefinition;

impl EntityDefinition for BranchDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Branch
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("name", "Tên chi nhánh")
                .required()
                .placeholder("VD: Chi nhánh Quận 1")
                .section("Thông tin chung")
                .grid_size(6),
            FieldDescriptor::text("phone", "Số điện thoại")
                .section("Thông tin chung")
                .grid_size(6),
            FieldDescriptor::email("email", "Email")
                .section("Thông tin chung")
                .grid_size(6),
            FieldDescriptor::date("opening_date", "Ngày khai trương")
                .section("Thông tin chung")
                .grid_size(6),
            FieldDescriptor::text("address", "Địa chỉ").section("Thông tin chung"),
            FieldDescriptor::switch("is_active", "Đang hoạt động"),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Tên chi nhánh"),
            ColumnDescriptor::new("address", "Địa chỉ"),
            ColumnDescriptor::new("phone", "Số điện thoại"),
            ctx.display_column("opening_date", "Khai trương"),
            ctx.display_column("is_active", "Hoạt động").align(Align::Center),
        ]
    }

    fn validator(&self, _ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("name", vec![Rule::Required, Rule::length(Some(2), Some(100))])
                .field("phone", vec![Rule::Phone])
                .field("email", vec![Rule::Email])
                .field("address", vec![Rule::length(None, Some(255))]),
        )
    }
}
