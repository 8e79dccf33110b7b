use std::sync::Arc;

use crate::descriptors::{Align, ColumnDescriptor, FieldDescriptor, SelectOption, option_label_renderer};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{Rule, RuleSchema, Validator};
use crate::table::{AssignKind, RowAction};

pub const MAX_CAPACITY: f64 = 200.0;

fn room_types() -> Vec<SelectOption> {
    vec![
        SelectOption::new("classroom", "Phòng học"),
        SelectOption::new("lab", "Phòng thí nghiệm"),
        SelectOption::new("music", "Phòng nhạc"),
        SelectOption::new("sport", "Phòng thể chất"),
    ]
}

pub struct RoomDefinition;

impl EntityDefinition for RoomDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Room
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("name", "Tên phòng")
                .required()
                .placeholder("VD: Phòng A1")
                .grid_size(6),
            ctx.reference_select("facility_id", "Cơ sở", EntityKind::Facility)
                .required()
                .grid_size(6),
            FieldDescriptor::number("capacity", "Sức chứa")
                .helper_text("Số học sinh tối đa")
                .grid_size(6),
            FieldDescriptor::select("room_type", "Loại phòng", room_types()).grid_size(6),
            FieldDescriptor::switch("is_active", "Đang sử dụng"),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Tên phòng"),
            ctx.reference_column("facility_id", "Cơ sở", EntityKind::Facility),
            ColumnDescriptor::new("capacity", "Sức chứa").align(Align::Right),
            ColumnDescriptor::new("room_type", "Loại phòng")
                .renderer(option_label_renderer(room_types())),
            ctx.display_column("is_active", "Sử dụng").align(Align::Center),
        ]
    }

    fn validator(&self, _ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("name", vec![Rule::Required, Rule::length(Some(1), Some(50))])
                .field("facility_id", vec![Rule::Required])
                .field("capacity", vec![Rule::range(Some(1.0), Some(MAX_CAPACITY))]),
        )
    }

    fn row_actions(&self) -> Vec<RowAction> {
        vec![
            RowAction::Edit,
            RowAction::Assign(AssignKind::Facility),
            RowAction::Delete,
        ]
    }

    fn references(&self) -> &'static [EntityKind] {
        &[EntityKind::Facility]
    }

    fn assignment(&self, action: AssignKind, ctx: &DescriptorContext) -> Option<FieldDescriptor> {
        match action {
            AssignKind::Facility => Some(ctx.reference_select("facility_id", "Cơ sở", EntityKind::Facility)),
            AssignKind::Branch | AssignKind::Benefit => None,
        }
    }
}
