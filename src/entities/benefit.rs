use std::sync::Arc;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::descriptors::{Align, ColumnDescriptor, FieldDescriptor};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{DerivedValidator, MSG_REQUIRED, Validator};

/// Typed view of the benefit dialog, checked with `validator` derives.
#[derive(Debug, Deserialize, Validate)]
pub struct BenefitForm {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Không được vượt quá 100 ký tự")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Mức giảm phải từ 0 đến 100%"))]
    pub discount_percent: f64,
    #[serde(default)]
    #[validate(length(max = 500, message = "Không được vượt quá 500 ký tự"))]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(MSG_REQUIRED.into()));
    }
    Ok(())
}

pub struct BenefitDefinition;

impl EntityDefinition for BenefitDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Benefit
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("name", "Tên ưu đãi").required().grid_size(8),
            FieldDescriptor::number("discount_percent", "Mức giảm (%)")
                .placeholder("0 - 100")
                .grid_size(4),
            FieldDescriptor::textarea("description", "Mô tả"),
            FieldDescriptor::switch("is_active", "Đang áp dụng"),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Tên ưu đãi"),
            ColumnDescriptor::new("discount_percent", "Mức giảm")
                .align(Align::Right)
                .render(|value, _| {
                    if value.is_empty() {
                        String::new()
                    } else {
                        format!("{value}%")
                    }
                }),
            ColumnDescriptor::new("description", "Mô tả"),
            ctx.display_column("is_active", "Áp dụng").align(Align::Center),
        ]
    }

    fn validator(&self, _ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(DerivedValidator::<BenefitForm>::new())
    }
}
