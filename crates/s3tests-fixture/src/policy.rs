//! Bucket policy documents.

use s3tests_core::constants::policy::{
    ACTION, ALLOW, CONDITION, EFFECT, PRINCIPAL, RESOURCE, RESOURCE_PREFIX, STATEMENT, VERSION,
    VERSION_DATE,
};
use serde_json::{Map, Value, json};

/// Principal matching every AWS identity.
#[must_use]
pub fn any_principal() -> Value {
    json!({ "AWS": "*" })
}

/// One policy statement.
///
/// `effect` defaults to `Allow`, `principal` to `{"AWS":"*"}`; a `None`
/// condition omits the element.
#[must_use]
pub fn make_json_statement(
    action: &str,
    resource: &str,
    effect: Option<&str>,
    principal: Option<Value>,
    condition: Option<Value>,
) -> Value {
    let mut statement = Map::new();
    statement.insert(EFFECT.to_owned(), Value::from(effect.unwrap_or(ALLOW)));
    statement.insert(
        PRINCIPAL.to_owned(),
        principal.unwrap_or_else(any_principal),
    );
    statement.insert(ACTION.to_owned(), Value::from(action));
    statement.insert(RESOURCE.to_owned(), Value::from(resource));
    if let Some(condition) = condition {
        statement.insert(CONDITION.to_owned(), condition);
    }
    Value::Object(statement)
}

/// Policy document holding `statements`.
#[must_use]
pub fn make_json_policy(statements: impl IntoIterator<Item = Value>) -> Value {
    let mut policy = Map::new();
    policy.insert(VERSION.to_owned(), Value::from(VERSION_DATE));
    policy.insert(
        STATEMENT.to_owned(),
        Value::Array(statements.into_iter().collect()),
    );
    Value::Object(policy)
}

/// Single-statement policy, serialized for `PutBucketPolicy`.
pub fn make_policy_string(
    action: &str,
    resource: &str,
    effect: Option<&str>,
    principal: Option<Value>,
    condition: Option<Value>,
) -> serde_json::Result<String> {
    serde_json::to_string(&make_json_policy([make_json_statement(
        action, resource, effect, principal, condition,
    )]))
}

/// `arn:aws:s3:::{path}`.
#[must_use]
pub fn make_arn_resource(path: &str) -> String {
    format!("{RESOURCE_PREFIX}{path}")
}
