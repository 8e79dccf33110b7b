use std::sync::Arc;

use crate::descriptors::{Align, ColumnDescriptor, FieldDescriptor};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{Rule, RuleSchema, Validator};

pub struct FacilityDefinition;

impl EntityDefinition for FacilityDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Facility
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("name", "Tên cơ sở").required().grid_size(6),
            ctx.reference_select("branch_id", "Chi nhánh", EntityKind::Branch)
                .required()
                .grid_size(6),
            FieldDescriptor::text("address", "Địa chỉ").grid_size(8),
            FieldDescriptor::number("area", "Diện tích (m²)").grid_size(4),
            FieldDescriptor::textarea("description", "Mô tả").rows(4),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Tên cơ sở"),
            ctx.reference_column("branch_id", "Chi nhánh", EntityKind::Branch),
            ColumnDescriptor::new("address", "Địa chỉ"),
            ColumnDescriptor::new("area", "Diện tích (m²)").align(Align::Right),
        ]
    }

    fn validator(&self, _ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("name", vec![Rule::Required, Rule::length(Some(2), Some(100))])
                .field("branch_id", vec![Rule::Required])
                .field("area", vec![Rule::range(Some(0.0), Some(100_000.0))])
                .field("description", vec![Rule::length(None, Some(1000))]),
        )
    }

    fn references(&self) -> &'static [EntityKind] {
        &[EntityKind::Branch]
    }
}
