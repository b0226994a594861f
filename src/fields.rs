//! Field descriptors, visibility rules and typed parameter access.
//!
//! Descriptors are static data shared by the UI side (visibility, defaults)
//! and the dispatcher (defaults, typed reads). Visibility is never consulted
//! when building a request.

use serde_json::{Map, Number, Value};

use crate::error::OperationError;

/// One selectable value of an options field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionValue {
    pub name: &'static str,
    pub value: &'static str,
}

/// Input type of a field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// JSON document entered as text
    Json,
    /// Fixed list of allowed values
    Options(&'static [OptionValue]),
    /// Allowed values are produced at runtime by the connector's operation loader
    DynamicOptions,
    /// Group of optional sub-fields submitted as one object
    Collection(&'static [FieldDescriptor]),
}

/// Declared default of a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    None,
    Str(&'static str),
    Int(i64),
    Bool(bool),
    EmptyCollection,
}

impl DefaultValue {
    pub fn to_value(&self) -> Option<Value> {
        match self {
            DefaultValue::None => None,
            DefaultValue::Str(s) => Some(Value::String((*s).to_string())),
            DefaultValue::Int(n) => Some(Value::from(*n)),
            DefaultValue::Bool(b) => Some(Value::Bool(*b)),
            DefaultValue::EmptyCollection => Some(Value::Object(Map::new())),
        }
    }
}

/// `field` must hold one of `values`
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub field: &'static str,
    pub values: &'static [&'static str],
}

/// Conditions that all have to hold
pub type Rule = &'static [Condition];

/// Visibility rules of a field.
///
/// A field is shown when it has no `show` rules or when every condition of at
/// least one `show` rule holds, and it is not hidden by a `hide` rule whose
/// conditions all hold.
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub show: &'static [Rule],
    pub hide: &'static [Rule],
}

impl DisplayOptions {
    pub const ALWAYS: DisplayOptions = DisplayOptions {
        show: &[],
        hide: &[],
    };
}

/// Static description of one input field
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub kind: FieldType,
    pub default: DefaultValue,
    pub required: bool,
    pub description: &'static str,
    pub display: DisplayOptions,
}

impl FieldDescriptor {
    pub const BASE: FieldDescriptor = FieldDescriptor {
        name: "",
        display_name: "",
        kind: FieldType::String,
        default: DefaultValue::None,
        required: false,
        description: "",
        display: DisplayOptions::ALWAYS,
    };
}

fn condition_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn rule_holds(rule: Rule, context: &Map<String, Value>) -> bool {
    rule.iter().all(|condition| {
        context
            .get(condition.field)
            .and_then(condition_key)
            .is_some_and(|key| condition.values.contains(&key.as_str()))
    })
}

/// Whether `field` is visible given the current resource, operation and peer values.
pub fn visible(field: &FieldDescriptor, context: &Map<String, Value>) -> bool {
    let display = &field.display;
    let shown =
        display.show.is_empty() || display.show.iter().any(|rule| rule_holds(rule, context));
    shown && !display.hide.iter().any(|rule| rule_holds(rule, context))
}

/// All fields visible in `context`, in declaration order.
pub fn visible_fields<'a>(
    fields: &'a [FieldDescriptor],
    context: &Map<String, Value>,
) -> Vec<&'a FieldDescriptor> {
    fields.iter().filter(|f| visible(f, context)).collect()
}

/// Per-item parameter values supplied by the host
pub trait ParameterSource: Send + Sync {
    fn parameter(&self, name: &str, item_index: usize) -> Option<&Value>;
}

/// The same parameters for every item.
impl ParameterSource for Map<String, Value> {
    fn parameter(&self, name: &str, _item_index: usize) -> Option<&Value> {
        self.get(name)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Integer value of `n` when it is a whole number within `i64` range.
fn whole_number(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn value_to_string(name: &str, value: &Value) -> Result<Option<String>, OperationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(
            whole_number(n).map_or_else(|| n.to_string(), |i| i.to_string()),
        )),
        Value::Bool(b) => Ok(Some(b.to_string())),
        _ => Err(OperationError::invalid_parameter(name, "expected a text value")),
    }
}

fn value_to_integer(name: &str, value: &Value) -> Result<Option<i64>, OperationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
            OperationError::invalid_parameter(name, format!("'{}' is not a whole number", s))
        }),
        Value::Number(n) => whole_number(n)
            .map(Some)
            .ok_or_else(|| {
                OperationError::invalid_parameter(name, format!("'{}' is not a whole number", n))
            }),
        _ => Err(OperationError::invalid_parameter(name, "expected a number")),
    }
}

fn value_to_bool(name: &str, value: &Value) -> Result<Option<bool>, OperationError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(OperationError::invalid_parameter(
                name,
                format!("'{}' is not a boolean", other),
            )),
        },
        _ => Err(OperationError::invalid_parameter(name, "expected a boolean")),
    }
}

fn value_to_json(name: &str, value: Value) -> Result<Option<Value>, OperationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| OperationError::invalid_json(name, e)),
        other => Ok(Some(other)),
    }
}

fn value_to_list(name: &str, value: &Value) -> Result<Option<Vec<String>>, OperationError> {
    let items = match value {
        Value::Null => return Ok(None),
        Value::String(s) => split_list(s),
        Value::Number(_) => value_to_string(name, value)?.into_iter().collect(),
        Value::Array(values) => values
            .iter()
            .filter_map(|v| value_to_string(name, v).transpose())
            .map(|r| r.map(|s| s.trim().to_string()))
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(OperationError::invalid_parameter(
                name,
                "expected a comma-separated list",
            ));
        }
    };
    Ok(Some(items).filter(|items| !items.is_empty()))
}

/// Typed accessors over named values.
///
/// Optional accessors return `Ok(None)` for absent or empty values so callers
/// can build sparse payloads; `required_*` accessors turn absence into a
/// missing-parameter error.
pub trait FieldAccess {
    fn raw(&self, name: &str) -> Option<Value>;

    fn is_present(&self, name: &str) -> bool {
        self.raw(name).is_some_and(|v| !is_empty_value(&v))
    }

    fn string(&self, name: &str) -> Result<Option<String>, OperationError> {
        match self.raw(name) {
            Some(value) => value_to_string(name, &value),
            None => Ok(None),
        }
    }

    fn required_string(&self, name: &str) -> Result<String, OperationError> {
        self.string(name)?
            .ok_or_else(|| OperationError::missing_parameter(name))
    }

    fn integer(&self, name: &str) -> Result<Option<i64>, OperationError> {
        match self.raw(name) {
            Some(value) => value_to_integer(name, &value),
            None => Ok(None),
        }
    }

    fn required_integer(&self, name: &str) -> Result<i64, OperationError> {
        self.integer(name)?
            .ok_or_else(|| OperationError::missing_parameter(name))
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>, OperationError> {
        match self.raw(name) {
            Some(value) => value_to_bool(name, &value),
            None => Ok(None),
        }
    }

    /// JSON-typed field; strings are parsed and must be valid JSON.
    fn json(&self, name: &str) -> Result<Option<Value>, OperationError> {
        match self.raw(name) {
            Some(value) => value_to_json(name, value),
            None => Ok(None),
        }
    }

    fn required_json(&self, name: &str) -> Result<Value, OperationError> {
        self.json(name)?
            .ok_or_else(|| OperationError::missing_parameter(name))
    }

    /// Comma-separated list, trimmed, empty entries dropped.
    fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, OperationError> {
        match self.raw(name) {
            Some(value) => value_to_list(name, &value),
            None => Ok(None),
        }
    }

    /// Comma-separated list of numeric ids.
    fn id_list(&self, name: &str) -> Result<Option<Vec<i64>>, OperationError> {
        let Some(items) = self.string_list(name)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| {
                item.parse::<i64>().map_err(|_| {
                    OperationError::invalid_parameter(
                        name,
                        format!("'{}' is not a numeric id", item),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Values of a collection field
#[derive(Debug, Clone, Default)]
pub struct Collection {
    values: Map<String, Value>,
}

impl Collection {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(is_empty_value)
    }
}

impl FieldAccess for Collection {
    fn raw(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}

/// Reads the parameters of one item, falling back to declared field defaults.
pub struct FieldReader<'a> {
    params: &'a dyn ParameterSource,
    fields: &'a [FieldDescriptor],
    item_index: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(
        params: &'a dyn ParameterSource,
        fields: &'a [FieldDescriptor],
        item_index: usize,
    ) -> Self {
        Self {
            params,
            fields,
            item_index,
        }
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    /// Value of `name`, or `default` when neither the item nor the field declares one.
    pub fn get_or(&self, name: &str, default: Value) -> Value {
        self.raw(name).unwrap_or(default)
    }

    pub fn collection(&self, name: &str) -> Result<Collection, OperationError> {
        match self.raw(name) {
            None | Some(Value::Null) => Ok(Collection::default()),
            Some(Value::Object(values)) => Ok(Collection::new(values)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(Collection::default()),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Object(values)) => Ok(Collection::new(values)),
                Ok(_) => Err(OperationError::invalid_parameter(name, "expected an object")),
                Err(e) => Err(OperationError::invalid_json(name, e)),
            },
            Some(_) => Err(OperationError::invalid_parameter(name, "expected an object")),
        }
    }

    fn first_default(&self, name: &str) -> Option<Value> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.default.to_value())
    }

    /// Default of `name`. When several descriptors share the name, the one
    /// visible for the item's current selections wins.
    fn declared_default(&self, name: &str) -> Option<Value> {
        let candidates: Vec<&FieldDescriptor> =
            self.fields.iter().filter(|f| f.name == name).collect();
        match candidates.as_slice() {
            [] => None,
            [only] => only.default.to_value(),
            many => {
                let mut context = Map::new();
                for rule in many.iter().flat_map(|f| f.display.show.iter().chain(f.display.hide)) {
                    for condition in rule.iter() {
                        if context.contains_key(condition.field) || condition.field == name {
                            continue;
                        }
                        let peer = self
                            .params
                            .parameter(condition.field, self.item_index)
                            .cloned()
                            .or_else(|| self.first_default(condition.field));
                        if let Some(peer) = peer {
                            context.insert(condition.field.to_string(), peer);
                        }
                    }
                }
                many.iter()
                    .find(|f| visible(f, &context))
                    .and_then(|f| f.default.to_value())
            }
        }
    }
}

impl FieldAccess for FieldReader<'_> {
    fn raw(&self, name: &str) -> Option<Value> {
        self.params
            .parameter(name, self.item_index)
            .cloned()
            .or_else(|| self.declared_default(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static OPERATION_OPTIONS_A: &[OptionValue] = &[OptionValue {
        name: "Find Email",
        value: "findEmail",
    }];
    static OPERATION_OPTIONS_B: &[OptionValue] = &[OptionValue {
        name: "Verify Email",
        value: "verifyEmail",
    }];

    static FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor {
            name: "resource",
            default: DefaultValue::Str("person"),
            ..FieldDescriptor::BASE
        },
        FieldDescriptor {
            name: "operation",
            kind: FieldType::Options(OPERATION_OPTIONS_A),
            default: DefaultValue::Str("findEmail"),
            display: DisplayOptions {
                show: &[&[Condition {
                    field: "resource",
                    values: &["person"],
                }]],
                hide: &[],
            },
            ..FieldDescriptor::BASE
        },
        FieldDescriptor {
            name: "operation",
            kind: FieldType::Options(OPERATION_OPTIONS_B),
            default: DefaultValue::Str("verifyEmail"),
            display: DisplayOptions {
                show: &[&[Condition {
                    field: "resource",
                    values: &["verification"],
                }]],
                hide: &[],
            },
            ..FieldDescriptor::BASE
        },
        FieldDescriptor {
            name: "limit",
            kind: FieldType::Number,
            default: DefaultValue::Int(50),
            display: DisplayOptions {
                show: &[&[
                    Condition {
                        field: "resource",
                        values: &["lead"],
                    },
                    Condition {
                        field: "operation",
                        values: &["getAll"],
                    },
                ]],
                hide: &[&[Condition {
                    field: "raw",
                    values: &["true"],
                }]],
            },
            ..FieldDescriptor::BASE
        },
    ];

    fn context(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_visibility_requires_all_conditions_of_a_rule() {
        let limit = &FIELDS[3];
        assert!(visible(limit, &context(json!({"resource": "lead", "operation": "getAll"}))));
        assert!(!visible(limit, &context(json!({"resource": "lead", "operation": "get"}))));
        assert!(!visible(limit, &context(json!({"resource": "campaign", "operation": "getAll"}))));
    }

    #[test]
    fn test_visibility_hide_rule_matches_booleans() {
        let limit = &FIELDS[3];
        let ctx = context(json!({"resource": "lead", "operation": "getAll", "raw": true}));
        assert!(!visible(limit, &ctx));
    }

    #[test]
    fn test_field_without_rules_is_always_visible() {
        assert!(visible(&FIELDS[0], &Map::new()));
        assert_eq!(visible_fields(FIELDS, &Map::new()).len(), 1);
    }

    #[test]
    fn test_reader_prefers_item_value_over_default() {
        let params = context(json!({"limit": 10}));
        let reader = FieldReader::new(&params, FIELDS, 0);
        assert_eq!(reader.integer("limit").unwrap(), Some(10));

        let empty = Map::new();
        let reader = FieldReader::new(&empty, FIELDS, 0);
        assert_eq!(reader.integer("limit").unwrap(), Some(50));
        assert_eq!(reader.get_or("missing", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn test_reader_picks_default_of_visible_duplicate() {
        let params = context(json!({"resource": "verification"}));
        let reader = FieldReader::new(&params, FIELDS, 0);
        assert_eq!(
            reader.string("operation").unwrap().as_deref(),
            Some("verifyEmail")
        );

        let empty = Map::new();
        let reader = FieldReader::new(&empty, FIELDS, 0);
        assert_eq!(reader.string("operation").unwrap().as_deref(), Some("findEmail"));
    }

    #[test]
    fn test_comma_separated_list_is_split_and_trimmed() {
        let params = context(json!({"names": "a, b ,, c", "ids": "2907, 2908"}));
        let reader = FieldReader::new(&params, &[], 0);
        assert_eq!(
            reader.string_list("names").unwrap(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(reader.id_list("ids").unwrap(), Some(vec![2907, 2908]));
    }

    #[test]
    fn test_id_list_rejects_non_numeric_entries() {
        let params = context(json!({"ids": "12, abc"}));
        let reader = FieldReader::new(&params, &[], 0);
        let err = reader.id_list("ids").unwrap_err();
        assert!(err.to_string().contains("'abc' is not a numeric id"));
    }

    #[test]
    fn test_float_numbers_render_as_integers() {
        let params = context(json!({"campaignId": 12.0, "ratio": 0.5, "ids": [7.0, 8]}));
        let reader = FieldReader::new(&params, &[], 0);
        assert_eq!(reader.string("campaignId").unwrap().as_deref(), Some("12"));
        assert_eq!(reader.integer("campaignId").unwrap(), Some(12));
        assert_eq!(reader.string("ratio").unwrap().as_deref(), Some("0.5"));
        assert_eq!(reader.id_list("ids").unwrap(), Some(vec![7, 8]));
    }

    #[test]
    fn test_out_of_range_integer_is_rejected() {
        let params = context(json!({"leadLimit": 1e30, "offset": -1e30}));
        let reader = FieldReader::new(&params, &[], 0);
        let err = reader.integer("leadLimit").unwrap_err();
        assert!(matches!(err.kind, crate::error::ErrorKind::InvalidParameter { .. }));
        assert!(reader.integer("offset").is_err());
    }

    #[test]
    fn test_json_field_parse_error_names_field() {
        let params = context(json!({"leadList": "[{\"email\": }"}));
        let reader = FieldReader::new(&params, &[], 0);
        let err = reader.json("leadList").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::ErrorKind::InvalidJson { ref field, .. } if field == "leadList"
        ));
    }

    #[test]
    fn test_json_field_accepts_structured_values() {
        let params = context(json!({"payload": {"a": 1}, "text": "{\"b\": 2}"}));
        let reader = FieldReader::new(&params, &[], 0);
        assert_eq!(reader.json("payload").unwrap(), Some(json!({"a": 1})));
        assert_eq!(reader.json("text").unwrap(), Some(json!({"b": 2})));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = context(json!({"domain": "", "count": null, "flag": "TRUE"}));
        let reader = FieldReader::new(&params, &[], 0);
        assert!(!reader.is_present("domain"));
        assert_eq!(reader.string("domain").unwrap(), None);
        assert_eq!(reader.integer("count").unwrap(), None);
        assert_eq!(reader.boolean("flag").unwrap(), Some(true));
        assert!(reader.required_string("domain").is_err());
    }

    #[test]
    fn test_collection_access() {
        let params = context(json!({"options": {"timeout": "30", "webhookUrl": ""}}));
        let reader = FieldReader::new(&params, &[], 0);
        let options = reader.collection("options").unwrap();
        assert_eq!(options.integer("timeout").unwrap(), Some(30));
        assert_eq!(options.string("webhookUrl").unwrap(), None);
        assert!(!options.is_empty());

        let missing = reader.collection("absent").unwrap();
        assert!(missing.is_empty());
    }
}
