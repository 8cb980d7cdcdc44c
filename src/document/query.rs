use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde_json::Value;

use crate::error::{AppError, AppResult};

use super::pretty_lines;

/// Evaluates a jq-style query against the document.
pub trait QueryEvaluator: Send + Sync {
    fn evaluate(&self, input: &Value, query: &str) -> AppResult<Vec<Value>>;
}

/// Path queries: `.`, `.a.b`, `.["k"]`, `.[n]`, `.[]`, chained with
/// `| keys` and `| length`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathQuery;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(i64),
    Iterate,
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Path(Vec<Segment>),
    Keys,
    Length,
}

impl QueryEvaluator for PathQuery {
    fn evaluate(&self, input: &Value, query: &str) -> AppResult<Vec<Value>> {
        let stages = parse_query(query)?;
        let mut stream = vec![input.clone()];
        for stage in &stages {
            let mut next = Vec::with_capacity(stream.len());
            for value in stream {
                apply_stage(stage, value, &mut next)?;
            }
            stream = next;
        }
        Ok(stream)
    }
}

fn parse_query(query: &str) -> AppResult<Vec<Stage>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(vec![Stage::Path(Vec::new())]);
    }
    split_pipes(query)?
        .into_iter()
        .map(|stage| parse_stage(stage.trim()))
        .collect()
}

/// Splits on `|` outside brackets and string literals.
fn split_pipes(query: &str) -> AppResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in query.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AppError::query(format!("unbalanced ']' at {idx}")))?;
            }
            '|' if depth == 0 => {
                parts.push(&query[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if in_string || depth != 0 {
        return Err(AppError::query("unterminated string or bracket"));
    }
    parts.push(&query[start..]);
    Ok(parts)
}

fn parse_stage(stage: &str) -> AppResult<Stage> {
    match stage {
        "keys" => return Ok(Stage::Keys),
        "length" => return Ok(Stage::Length),
        "" => return Err(AppError::query("empty pipeline stage")),
        _ => {}
    }
    if !stage.starts_with('.') {
        return Err(AppError::query(format!("unsupported expression: {stage}")));
    }
    parse_path(stage).map(Stage::Path)
}

fn parse_path(path: &str) -> AppResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            if after_dot.is_empty() || after_dot.starts_with('[') {
                rest = after_dot;
                continue;
            }
            let end = after_dot
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .unwrap_or(after_dot.len());
            if end == 0 {
                return Err(AppError::query(format!("expected field name in {path}")));
            }
            segments.push(Segment::Field(after_dot[..end].to_string()));
            rest = &after_dot[end..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = closing_bracket(after_bracket)
                .ok_or_else(|| AppError::query(format!("missing ']' in {path}")))?;
            segments.push(parse_bracket(after_bracket[..close].trim())?);
            rest = &after_bracket[close + 1..];
        } else {
            return Err(AppError::query(format!("unexpected {rest:?} in {path}")));
        }
    }
    Ok(segments)
}

fn closing_bracket(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ']' if !in_string => return Some(idx),
            _ => {}
        }
    }
    None
}

fn parse_bracket(inner: &str) -> AppResult<Segment> {
    if inner.is_empty() {
        return Ok(Segment::Iterate);
    }
    if inner.starts_with('"') {
        let key = serde_json::from_str::<String>(inner)
            .map_err(|err| AppError::query(format!("invalid key {inner}: {err}")))?;
        return Ok(Segment::Field(key));
    }
    inner
        .parse::<i64>()
        .map(Segment::Index)
        .map_err(|_| AppError::query(format!("invalid index [{inner}]")))
}

fn apply_stage(stage: &Stage, value: Value, out: &mut Vec<Value>) -> AppResult<()> {
    match stage {
        Stage::Path(segments) => {
            let mut stream = vec![value];
            for segment in segments {
                let mut next = Vec::with_capacity(stream.len());
                for value in stream {
                    apply_segment(segment, value, &mut next)?;
                }
                stream = next;
            }
            out.extend(stream);
        }
        Stage::Keys => out.push(keys_of(&value)?),
        Stage::Length => out.push(length_of(&value)?),
    }
    Ok(())
}

fn apply_segment(segment: &Segment, value: Value, out: &mut Vec<Value>) -> AppResult<()> {
    match (segment, value) {
        (Segment::Field(key), Value::Object(mut map)) => {
            out.push(map.remove(key).unwrap_or(Value::Null));
        }
        (Segment::Field(_) | Segment::Index(_), Value::Null) => out.push(Value::Null),
        (Segment::Index(index), Value::Array(mut items)) => {
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let resolved = if *index < 0 { len + index } else { *index };
            let picked = usize::try_from(resolved)
                .ok()
                .filter(|idx| *idx < items.len())
                .map(|idx| items.swap_remove(idx))
                .unwrap_or(Value::Null);
            out.push(picked);
        }
        (Segment::Iterate, Value::Array(items)) => out.extend(items),
        (Segment::Iterate, Value::Object(map)) => out.extend(map.into_iter().map(|(_, v)| v)),
        (Segment::Field(key), other) => {
            return Err(AppError::query(format!(
                "cannot index {} with {key:?}",
                type_name(&other)
            )));
        }
        (Segment::Index(index), other) => {
            return Err(AppError::query(format!(
                "cannot index {} with number {index}",
                type_name(&other)
            )));
        }
        (Segment::Iterate, other) => {
            return Err(AppError::query(format!(
                "cannot iterate over {}",
                type_name(&other)
            )));
        }
    }
    Ok(())
}

fn keys_of(value: &Value) -> AppResult<Value> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Ok(Value::Array(
                keys.into_iter().map(|key| Value::String(key.clone())).collect(),
            ))
        }
        Value::Array(items) => Ok(Value::Array((0..items.len()).map(Value::from).collect())),
        other => Err(AppError::query(format!(
            "{} has no keys",
            type_name(other)
        ))),
    }
}

fn length_of(value: &Value) -> AppResult<Value> {
    match value {
        Value::Null => Ok(Value::from(0)),
        Value::Array(items) => Ok(Value::from(items.len())),
        Value::Object(map) => Ok(Value::from(map.len())),
        Value::String(text) => Ok(Value::from(text.chars().count())),
        Value::Number(number) => Ok(number
            .as_f64()
            .map(f64::abs)
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        Value::Bool(_) => Err(AppError::query("boolean has no length")),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A successful evaluation, pretty-printed once for display.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub values: Vec<Value>,
    pub lines: Vec<String>,
}

impl QueryOutput {
    pub fn new(values: Vec<Value>) -> AppResult<Self> {
        let lines = pretty_lines(&values)?;
        Ok(Self { values, lines })
    }
}

/// Recent successful query outputs keyed by trimmed query text.
pub struct QueryCache {
    entries: LruCache<String, Arc<QueryOutput>>,
}

impl QueryCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, query: &str) -> Option<Arc<QueryOutput>> {
        self.entries.get(query.trim()).cloned()
    }

    pub fn insert(&mut self, query: &str, output: Arc<QueryOutput>) {
        self.entries.put(query.trim().to_string(), output);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached output or a fresh evaluation. Failures are not cached.
    pub fn evaluate(
        &mut self,
        evaluator: &dyn QueryEvaluator,
        input: &Value,
        query: &str,
    ) -> AppResult<Arc<QueryOutput>> {
        if let Some(hit) = self.get(query) {
            return Ok(hit);
        }
        let output = Arc::new(QueryOutput::new(evaluator.evaluate(input, query)?)?);
        self.insert(query, Arc::clone(&output));
        Ok(output)
    }
}
