use std::sync::Arc;

use crate::descriptors::{ColumnDescriptor, FieldDescriptor, SelectOption, option_label_renderer};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{Rule, RuleSchema, Validator};
use crate::table::{AssignKind, RowAction};

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn positions() -> Vec<SelectOption> {
    vec![
        SelectOption::new("teacher", "Giáo viên"),
        SelectOption::new("assistant", "Trợ giảng"),
        SelectOption::new("manager", "Quản lý"),
        SelectOption::new("admin", "Quản trị viên"),
    ]
}

pub struct StaffDefinition;

impl EntityDefinition for StaffDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Staff
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        let mut fields = vec![
            FieldDescriptor::text("full_name", "Họ và tên")
                .required()
                .section("Thông tin cá nhân"),
            FieldDescriptor::email("email", "Email")
                .required()
                .section("Thông tin cá nhân")
                .grid_size(6),
            FieldDescriptor::text("phone", "Số điện thoại")
                .section("Thông tin cá nhân")
                .grid_size(6),
            FieldDescriptor::select("position", "Vị trí", positions())
                .required()
                .section("Công việc")
                .grid_size(6),
            ctx.reference_select("branch_id", "Chi nhánh", EntityKind::Branch)
                .section("Công việc")
                .grid_size(6),
            FieldDescriptor::date("hire_date", "Ngày vào làm")
                .section("Công việc")
                .grid_size(6),
            FieldDescriptor::switch("is_active", "Đang làm việc").section("Công việc"),
        ];

        if ctx.is_create() {
            fields.push(
                FieldDescriptor::password("password", "Mật khẩu")
                    .required()
                    .helper_text(format!("Tối thiểu {MIN_PASSWORD_LENGTH} ký tự"))
                    .section("Tài khoản")
                    .section_description("Dùng để đăng nhập hệ thống"),
            );
        }

        ctx.lock(fields)
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("full_name", "Họ và tên"),
            ColumnDescriptor::new("email", "Email"),
            ColumnDescriptor::new("phone", "Số điện thoại"),
            ColumnDescriptor::new("position", "Vị trí").renderer(option_label_renderer(positions())),
            ctx.reference_column("branch_id", "Chi nhánh", EntityKind::Branch),
            ctx.display_column("hire_date", "Ngày vào làm"),
        ]
    }

    fn validator(&self, ctx: &DescriptorContext) -> Arc<dyn Validator> {
        let mut schema = RuleSchema::new()
            .field("full_name", vec![Rule::Required, Rule::length(Some(2), Some(100))])
            .field("email", vec![Rule::Required, Rule::Email])
            .field("phone", vec![Rule::Phone])
            .field("position", vec![Rule::Required]);
        if ctx.is_create() {
            schema = schema.field(
                "password",
                vec![Rule::Required, Rule::length(Some(MIN_PASSWORD_LENGTH), Some(128))],
            );
        }
        Arc::new(schema)
    }

    fn row_actions(&self) -> Vec<RowAction> {
        vec![
            RowAction::Edit,
            RowAction::Assign(AssignKind::Branch),
            RowAction::Delete,
        ]
    }

    fn references(&self) -> &'static [EntityKind] {
        &[EntityKind::Branch]
    }

    fn assignment(&self, action: AssignKind, ctx: &DescriptorContext) -> Option<FieldDescriptor> {
        match action {
            AssignKind::Branch => Some(ctx.reference_select("branch_id", "Chi nhánh", EntityKind::Branch)),
            AssignKind::Facility | AssignKind::Benefit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::dialog::DialogMode;
    use crate::domain::record::EntityRecord;

    fn ctx(mode: DialogMode) -> DescriptorContext {
        DescriptorContext::new(mode, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
    }

    #[test]
    fn password_is_only_asked_on_create() {
        let create = StaffDefinition.fields(&ctx(DialogMode::Create));
        let edit = StaffDefinition.fields(&ctx(DialogMode::Edit));
        assert!(create.iter().any(|field| field.name == "password"));
        assert!(!edit.iter().any(|field| field.name == "password"));
        assert_eq!(create.len(), edit.len() + 1);
    }

    #[test]
    fn create_requires_a_long_enough_password() {
        let values = EntityRecord::new()
            .with("full_name", "Nguyễn Văn An")
            .with("email", "an@example.com")
            .with("position", "teacher")
            .with("password", "short");

        let errors = StaffDefinition
            .validator(&ctx(DialogMode::Create))
            .validate(&values)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("password"));

        assert!(StaffDefinition.validator(&ctx(DialogMode::Edit)).validate(&values).is_ok());
    }
}
