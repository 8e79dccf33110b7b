use std::sync::Arc;

use crate::descriptors::{Align, ColumnDescriptor, FieldDescriptor, SelectOption, option_label_renderer};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{CrossFieldRule, Rule, RuleSchema, Validator};
use crate::table::{AssignKind, RowAction};

pub const MIN_AGE: f64 = 3.0;
pub const MAX_AGE: f64 = 18.0;

fn genders() -> Vec<SelectOption> {
    vec![
        SelectOption::new("male", "Nam"),
        SelectOption::new("female", "Nữ"),
    ]
}

pub struct StudentDefinition;

impl EntityDefinition for StudentDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Student
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("full_name", "Họ và tên")
                .required()
                .section("Học sinh"),
            FieldDescriptor::date("date_of_birth", "Ngày sinh")
                .required()
                .section("Học sinh")
                .grid_size(4),
            FieldDescriptor::number("age", "Tuổi")
                .required()
                .helper_text("Phải khớp với ngày sinh")
                .section("Học sinh")
                .grid_size(4),
            FieldDescriptor::select("gender", "Giới tính", genders())
                .section("Học sinh")
                .grid_size(4),
            ctx.reference_select("branch_id", "Chi nhánh", EntityKind::Branch)
                .section("Học sinh")
                .grid_size(6),
            ctx.reference_select("benefit_id", "Ưu đãi", EntityKind::Benefit)
                .section("Học sinh")
                .grid_size(6),
            FieldDescriptor::text("parent_name", "Họ tên phụ huynh")
                .required()
                .section("Phụ huynh")
                .section_description("Người liên hệ chính của học sinh")
                .grid_size(6),
            FieldDescriptor::text("parent_phone", "Số điện thoại phụ huynh")
                .required()
                .section("Phụ huynh")
                .grid_size(6),
            FieldDescriptor::email("parent_email", "Email phụ huynh").section("Phụ huynh"),
            FieldDescriptor::textarea("note", "Ghi chú"),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("full_name", "Họ và tên"),
            ctx.display_column("date_of_birth", "Ngày sinh"),
            ColumnDescriptor::new("age", "Tuổi").align(Align::Right),
            ColumnDescriptor::new("gender", "Giới tính").renderer(option_label_renderer(genders())),
            ColumnDescriptor::new("parent_name", "Phụ huynh"),
            ColumnDescriptor::new("parent_phone", "Điện thoại"),
            ctx.reference_column("benefit_id", "Ưu đãi", EntityKind::Benefit),
        ]
    }

    fn validator(&self, ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("full_name", vec![Rule::Required, Rule::length(Some(2), Some(100))])
                .field("date_of_birth", vec![Rule::Required])
                .field("age", vec![Rule::Required, Rule::range(Some(MIN_AGE), Some(MAX_AGE))])
                .field("parent_name", vec![Rule::Required])
                .field("parent_phone", vec![Rule::Required, Rule::Phone])
                .field("parent_email", vec![Rule::Email])
                .field("note", vec![Rule::length(None, Some(500))])
                .cross_field(CrossFieldRule::AgeMatchesBirthDate {
                    age: "age".to_string(),
                    birth_date: "date_of_birth".to_string(),
                    reference_date: ctx.today,
                    message: "Tuổi không khớp với ngày sinh".to_string(),
                }),
        )
    }

    fn row_actions(&self) -> Vec<RowAction> {
        vec![
            RowAction::Edit,
            RowAction::Assign(AssignKind::Benefit),
            RowAction::Delete,
        ]
    }

    fn references(&self) -> &'static [EntityKind] {
        &[EntityKind::Branch, EntityKind::Benefit]
    }

    fn assignment(&self, action: AssignKind, ctx: &DescriptorContext) -> Option<FieldDescriptor> {
        match action {
            AssignKind::Benefit => Some(ctx.reference_select("benefit_id", "Ưu đãi", EntityKind::Benefit)),
            AssignKind::Branch | AssignKind::Facility => None,
        }
    }
}
