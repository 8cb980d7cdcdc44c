use serde_json::Value;

/// Type skeleton of a value. Array items are merged so every key seen in
/// any element shows up once.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Null,
    Bool,
    Number,
    String,
    Array { len: usize, item: Option<Box<Shape>> },
    Object(Vec<(String, Shape)>),
    Mixed,
}

impl Shape {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(items) => Self::Array {
                len: items.len(),
                item: items
                    .iter()
                    .map(Self::of)
                    .reduce(Self::merge)
                    .map(Box::new),
            },
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::of(value)))
                    .collect(),
            ),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Null, other) | (other, Self::Null) => other,
            (Self::Object(mut fields), Self::Object(more)) => {
                for (key, shape) in more {
                    match fields.iter_mut().find(|(existing, _)| *existing == key) {
                        Some((_, slot)) => {
                            let current = std::mem::replace(slot, Self::Null);
                            *slot = current.merge(shape);
                        }
                        None => fields.push((key, shape)),
                    }
                }
                Self::Object(fields)
            }
            (Self::Array { len, item }, Self::Array { len: other_len, item: other_item }) => {
                let item = match (item, other_item) {
                    (Some(a), Some(b)) => Some(Box::new(a.merge(*b))),
                    (a, b) => a.or(b),
                };
                Self::Array {
                    len: len.max(other_len),
                    item,
                }
            }
            (a, b) if a == b => a,
            _ => Self::Mixed,
        }
    }

    fn scalar_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Mixed => "mixed",
            Self::Array { .. } => "array",
            Self::Object(_) => "object",
        }
    }
}

pub fn outline_lines(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    write_shape(&mut lines, 0, String::new(), &Shape::of(value));
    lines
}

fn write_shape(lines: &mut Vec<String>, depth: usize, prefix: String, shape: &Shape) {
    let indent = "  ".repeat(depth);
    match shape {
        Shape::Object(fields) if fields.is_empty() => {
            lines.push(format!("{indent}{prefix}object {{}}"));
        }
        Shape::Object(fields) => {
            lines.push(format!("{indent}{prefix}object {{"));
            for (key, field) in fields {
                write_shape(lines, depth + 1, format!("{key:?}: "), field);
            }
            lines.push(format!("{indent}}}"));
        }
        Shape::Array {
            len,
            item: Some(item),
        } => {
            write_shape(lines, depth, format!("{prefix}array[{len}] of "), item);
        }
        Shape::Array { len, item: None } => {
            lines.push(format!("{indent}{prefix}array[{len}]"));
        }
        scalar => lines.push(format!("{indent}{prefix}{}", scalar.scalar_label())),
    }
}
