//! 规则问答引擎
//!
//! Keyword rules map a question to an (intent, subject) pair which is then
//! looked up against the record store. Read-only and deterministic.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::config::{IntentRule, QueryConfig};
use crate::error::{AppError, Result};
use crate::models::query::{AttributeIntent, QueryResult};
use crate::models::record::Record;
use crate::storage::record_store::RecordStore;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("punctuation pattern is valid"));

pub const UNKNOWN_QUESTION: &str = "I couldn't understand the question.";
pub const MISSING_SUBJECT: &str = "I couldn't identify which item you are asking about.";
pub const EMPTY_STORE: &str = "No data has been uploaded yet. Please upload a CSV first.";

/// 小写、去标点、按空白切分
pub fn tokenize(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(&text.to_lowercase(), "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
struct CompiledRule {
    intent: AttributeIntent,
    column: String,
    phrases: Vec<Vec<String>>,
}

impl CompiledRule {
    /// 在 `start` 处命中的最长短语长度
    fn match_at(&self, tokens: &[String], start: usize) -> Option<usize> {
        self.phrases
            .iter()
            .filter(|phrase| tokens[start..].starts_with(phrase))
            .map(Vec::len)
            .max()
    }
}

/// 问答引擎
pub struct QueryEngine {
    rules: Vec<CompiledRule>,
    stop_words: HashSet<String>,
    store: Arc<RecordStore>,
}

impl QueryEngine {
    /// 创建问答引擎
    ///
    /// Every rule must target a column of the store's schema.
    pub fn new(config: &QueryConfig, store: Arc<RecordStore>) -> Result<Self> {
        let rules = config
            .intents
            .iter()
            .map(|rule| Self::compile(rule, &store))
            .collect::<Result<Vec<_>>>()?;

        let stop_words = config
            .stop_words
            .iter()
            .flat_map(|w| tokenize(w))
            .collect();

        Ok(Self {
            rules,
            stop_words,
            store,
        })
    }

    fn compile(rule: &IntentRule, store: &RecordStore) -> Result<CompiledRule> {
        if !store.schema().contains(&rule.column) {
            return Err(AppError::Config(format!(
                "intent {} maps to unknown column '{}'",
                rule.intent, rule.column
            )));
        }

        let phrases: Vec<Vec<String>> = rule
            .keywords
            .iter()
            .map(|k| tokenize(k))
            .filter(|p| !p.is_empty())
            .collect();

        if phrases.is_empty() {
            return Err(AppError::Config(format!(
                "intent {} has no keywords",
                rule.intent
            )));
        }

        Ok(CompiledRule {
            intent: rule.intent,
            column: rule.column.clone(),
            phrases,
        })
    }

    /// 回答问题
    pub fn answer(&self, question: &str) -> QueryResult {
        let tokens = tokenize(question);

        let Some(rule) = self.detect_intent(&tokens) else {
            return QueryResult::unmatched(None, Some(AttributeIntent::Unknown), UNKNOWN_QUESTION);
        };

        let subject = self.extract_subject(&tokens);
        if subject.is_empty() {
            return QueryResult::unmatched(None, Some(rule.intent), MISSING_SUBJECT);
        }

        let records = self.store.snapshot();
        if records.is_empty() {
            return QueryResult::unmatched(Some(subject), Some(rule.intent), EMPTY_STORE);
        }

        let identifier = self.store.schema().identifier();
        let Some(record) = find_subject(&records, identifier, &subject) else {
            let message = format!("No data found for '{}'.", subject);
            return QueryResult::unmatched(Some(subject), Some(rule.intent), message);
        };

        let name = record
            .get(identifier)
            .map(|v| v.to_string())
            .unwrap_or_else(|| subject.clone());

        match record.get(&rule.column) {
            Some(value) => QueryResult::answered(name, rule.intent, value.clone()),
            None => {
                let message = format!("No {} recorded for '{}'.", rule.intent, name);
                QueryResult::unmatched(Some(name), Some(rule.intent), message)
            }
        }
    }

    /// 从左到右扫描；同一位置按规则顺序取第一个命中
    fn detect_intent(&self, tokens: &[String]) -> Option<&CompiledRule> {
        (0..tokens.len()).find_map(|start| {
            self.rules
                .iter()
                .find(|rule| rule.match_at(tokens, start).is_some())
        })
    }

    /// 去除所有意图关键词和停用词，剩余词组成主语
    fn extract_subject(&self, tokens: &[String]) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let keyword_len = self
                .rules
                .iter()
                .filter_map(|rule| rule.match_at(tokens, i))
                .max();

            match keyword_len {
                Some(len) => i += len,
                None => {
                    if !self.stop_words.contains(&tokens[i]) {
                        kept.push(&tokens[i]);
                    }
                    i += 1;
                }
            }
        }

        kept.join(" ")
    }
}

/// 精确匹配优先，其次按插入顺序取第一个包含匹配
fn find_subject<'a>(records: &'a [Arc<Record>], identifier: &str, subject: &str) -> Option<&'a Record> {
    let normalized: Vec<(&Record, String)> = records
        .iter()
        .filter_map(|record| {
            let value = record.get(identifier)?.to_string();
            Some((record.as_ref(), tokenize(&value).join(" ")))
        })
        .filter(|(_, name)| !name.is_empty())
        .collect();

    normalized
        .iter()
        .find(|(_, name)| name == subject)
        .or_else(|| {
            normalized
                .iter()
                .find(|(_, name)| name.contains(subject) || subject.contains(name.as_str()))
        })
        .map(|(record, _)| *record)
}
