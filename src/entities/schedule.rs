use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::descriptors::{ColumnDescriptor, FieldDescriptor, SelectOption, option_label_renderer};
use crate::domain::types::EntityKind;
use crate::entities::{DescriptorContext, EntityDefinition};
use crate::forms::validation::{CrossFieldRule, Rule, RuleSchema, Validator};

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time pattern"));

const MSG_INVALID_TIME: &str = "Giờ phải theo định dạng HH:MM";

fn weekdays() -> Vec<SelectOption> {
    vec![
        SelectOption::new("1", "Thứ Hai"),
        SelectOption::new("2", "Thứ Ba"),
        SelectOption::new("3", "Thứ Tư"),
        SelectOption::new("4", "Thứ Năm"),
        SelectOption::new("5", "Thứ Sáu"),
        SelectOption::new("6", "Thứ Bảy"),
        SelectOption::new("7", "Chủ Nhật"),
    ]
}

fn time_rule() -> Rule {
    Rule::Pattern {
        regex: TIME_PATTERN.clone(),
        message: MSG_INVALID_TIME.to_string(),
    }
}

pub struct ScheduleDefinition;

impl EntityDefinition for ScheduleDefinition {
    fn kind(&self) -> EntityKind {
        EntityKind::Schedule
    }

    fn fields(&self, ctx: &DescriptorContext) -> Vec<FieldDescriptor> {
        ctx.lock(vec![
            FieldDescriptor::text("title", "Tên lớp").required().section("Lớp học"),
            ctx.reference_select("room_id", "Phòng", EntityKind::Room)
                .required()
                .section("Lớp học")
                .grid_size(6),
            ctx.reference_select("staff_id", "Giáo viên", EntityKind::Staff)
                .required()
                .section("Lớp học")
                .grid_size(6),
            FieldDescriptor::select("weekday", "Thứ", weekdays())
                .required()
                .section("Thời gian")
                .grid_size(4),
            FieldDescriptor::text("start_time", "Bắt đầu")
                .required()
                .placeholder("HH:MM")
                .section("Thời gian")
                .grid_size(4),
            FieldDescriptor::text("end_time", "Kết thúc")
                .required()
                .placeholder("HH:MM")
                .section("Thời gian")
                .grid_size(4),
            FieldDescriptor::date("start_date", "Từ ngày")
                .required()
                .section("Thời gian")
                .grid_size(6),
            FieldDescriptor::date("end_date", "Đến ngày")
                .section("Thời gian")
                .grid_size(6),
        ])
    }

    fn columns(&self, ctx: &DescriptorContext) -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("title", "Tên lớp"),
            ctx.reference_column("room_id", "Phòng", EntityKind::Room),
            ctx.reference_column("staff_id", "Giáo viên", EntityKind::Staff),
            ColumnDescriptor::new("weekday", "Thứ").renderer(option_label_renderer(weekdays())),
            ColumnDescriptor::new("start_time", "Giờ học")
                .render(|start, row| format!("{start} - {}", row.value("end_time"))),
            ctx.display_column("start_date", "Từ ngày"),
            ctx.display_column("end_date", "Đến ngày"),
        ]
    }

    fn validator(&self, _ctx: &DescriptorContext) -> Arc<dyn Validator> {
        Arc::new(
            RuleSchema::new()
                .field("title", vec![Rule::Required, Rule::length(Some(2), Some(100))])
                .field("room_id", vec![Rule::Required])
                .field("staff_id", vec![Rule::Required])
                .field("weekday", vec![Rule::Required])
                .field("start_time", vec![Rule::Required, time_rule()])
                .field("end_time", vec![Rule::Required, time_rule()])
                .field("start_date", vec![Rule::Required])
                .cross_field(CrossFieldRule::TimeAfter {
                    field: "end_time".to_string(),
                    other: "start_time".to_string(),
                    message: "Giờ kết thúc phải sau giờ bắt đầu".to_string(),
                })
                .cross_field(CrossFieldRule::DateNotBefore {
                    field: "end_date".to_string(),
                    other: "start_date".to_string(),
                    message: "Ngày kết thúc không được trước ngày bắt đầu".to_string(),
                }),
        )
    }

    fn references(&self) -> &'static [EntityKind] {
        &[EntityKind::Room, EntityKind::Staff]
    }
}
