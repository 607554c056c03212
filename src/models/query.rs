use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::record::FieldValue;

/// 问题所询问的属性类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeIntent {
    Price,
    Quantity,
    Location,
    Unknown,
}

impl AttributeIntent {
    /// 回答中使用的属性名
    pub fn label(&self) -> &'static str {
        match self {
            AttributeIntent::Price => "price",
            AttributeIntent::Quantity => "quantity",
            AttributeIntent::Location => "location",
            AttributeIntent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AttributeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 问答结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub matched: bool,
    pub subject: Option<String>,
    pub intent: Option<AttributeIntent>,
    pub value: Option<FieldValue>,
    pub message: String,
}

impl QueryResult {
    pub fn answered(subject: String, intent: AttributeIntent, value: FieldValue) -> Self {
        let message = format!(
            "{}'s {} is {}.",
            capitalize(&subject),
            intent.label(),
            value
        );
        Self {
            matched: true,
            subject: Some(subject),
            intent: Some(intent),
            value: Some(value),
            message,
        }
    }

    pub fn unmatched(
        subject: Option<String>,
        intent: Option<AttributeIntent>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            matched: false,
            subject,
            intent,
            value: None,
            message: message.into(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
