//! 问答 DTO
//!
//! 定义问答请求和响应数据结构。

use serde::{Deserialize, Serialize};

use crate::models::query::{AttributeIntent, QueryResult};
use crate::models::record::FieldValue;

/// 问答请求
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    /// 自然语言问题
    pub question: String,
}

/// 问答响应
#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub matched: bool,
    pub subject: Option<String>,
    pub intent: Option<AttributeIntent>,
    pub value: Option<FieldValue>,
}

impl AskResponse {
    pub fn new(question: String, result: QueryResult) -> Self {
        Self {
            question,
            answer: result.message,
            matched: result.matched,
            subject: result.subject,
            intent: result.intent,
            value: result.value,
        }
    }
}
