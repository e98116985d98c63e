//! End-to-end tests for the cast, validate and apply pipeline
//!
//! These tests drive derived records through full changeset chains,
//! covering casting, error accumulation, provenance, and materialization.

use exo_changeset::validators::{
    Acceptance, Exclusion, Format, GreaterThan, Inclusion, Length, LessThanOrEqual,
};
use exo_changeset::{
    apply_in_place, apply_new, params, Assign, Changeset, ChangesetConfig, ErrorKind,
    FieldDescriptor, FieldType, Params, Record, Schema, Value,
};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Account {
    username: String,
    #[record(rename = "emailAddress")]
    email: String,
    age: u32,
    nickname: Option<String>,
    tags: Vec<String>,
    terms: bool,
    score: f64,
    #[record(readonly)]
    display_name: String,
    #[record(skip)]
    session_token: String,
}

/// Declares `value` as `any` while its slot only holds integers
#[derive(Debug, Default)]
struct Loose {
    count: i64,
    value: i64,
}

impl Record for Loose {
    fn schema() -> Schema {
        Schema::new(vec![
            FieldDescriptor::of::<i64>("count"),
            FieldDescriptor::new("value", FieldType::Any),
        ])
    }

    fn assign(&mut self, field: &str, value: &Value) -> Assign {
        match field {
            "count" => Assign::write(&mut self.count, value),
            "value" => Assign::write(&mut self.value, value),
            _ => Assign::NoSlot,
        }
    }

    fn to_params(&self) -> Params {
        params! { "count" => self.count, "value" => self.value }
    }
}

fn valid_payload() -> Params {
    params! {
        "username" => "alice",
        "emailAddress" => "alice@example.com",
        "age" => 30,
        "tags" => vec!["admin"],
        "terms" => true,
        "score" => 9.5,
    }
}

#[cfg(test)]
mod derived_schema {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_order_and_types() {
        let schema = Account::schema();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(
            names,
            vec![
                "username",
                "emailAddress",
                "age",
                "nickname",
                "tags",
                "terms",
                "score",
                "display_name",
            ]
        );
        assert_eq!(schema.field("age").unwrap().ty, FieldType::Int);
        assert_eq!(
            schema.field("nickname").unwrap().ty,
            FieldType::Optional(Box::new(FieldType::String))
        );
        assert!(!schema.contains("session_token"));
        assert!(!schema.contains("email"));
    }

    #[test]
    fn test_to_params_lists_every_schema_field() {
        let account = Account {
            username: "bob".to_string(),
            nickname: Some("b".to_string()),
            session_token: "secret".to_string(),
            ..Account::default()
        };
        let params = account.to_params();
        assert_eq!(params.len(), Account::schema().len());
        assert_eq!(params["username"], Value::from("bob"));
        assert_eq!(params["nickname"], Value::from("b"));
        assert_eq!(params["age"], Value::Int(0));
        assert!(!params.contains_key("session_token"));
    }

    #[test]
    fn test_to_params_casts_back_to_equal_record() {
        let original = Account {
            username: "carol".to_string(),
            email: "c@example.com".to_string(),
            age: 41,
            tags: vec!["x".to_string(), "y".to_string()],
            score: 1.25,
            ..Account::default()
        };
        let copy = apply_new(Changeset::<Account>::cast(original.to_params())).unwrap();
        assert_eq!(copy, original);
    }
}

#[cfg(test)]
mod casting {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let account = apply_new(Changeset::<Account>::cast(valid_payload())).unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.email, "alice@example.com");
        assert_eq!(account.age, 30);
        assert_eq!(account.tags, vec!["admin".to_string()]);
        assert!(account.terms);
        assert_eq!(account.nickname, None);
    }

    #[test]
    fn test_renamed_key_only() {
        let c = Changeset::<Account>::cast(params! { "email" => "x@example.com" });
        assert!(c.changes().is_empty());
        assert!(c.is_valid());
        assert_eq!(c.params().len(), 1);
    }

    #[test]
    fn test_type_mismatch_accumulates() {
        let c = Changeset::<Account>::cast(params! {
            "username" => 123,
            "age" => "thirty",
            "terms" => "yes",
            "tags" => vec![1, 2],
        });
        assert!(!c.is_valid());
        assert!(c.changes().is_empty());
        for field in ["username", "age", "terms", "tags"] {
            assert_eq!(c.get_error(field).unwrap().kind, ErrorKind::CastTypeMismatch);
            assert!(c.get_change(field).is_none());
        }
    }

    #[test]
    fn test_nullable_field_accepts_null() {
        let c = Changeset::<Account>::cast(params! { "nickname" => Value::Null });
        assert!(c.is_valid());
        assert_eq!(c.get_change("nickname"), Some(&Value::Null));

        // Present but null still counts as missing
        let c = c.validate_required(["nickname"]);
        assert_eq!(c.get_error("nickname").unwrap().message, "is required");
    }

    #[test]
    fn test_cast_json_payload() {
        let body = serde_json::json!({
            "username": "dave",
            "age": 22,
            "score": 3,
            "unexpected": {"nested": true}
        });
        let c = Changeset::<Account>::cast_json(body.clone()).unwrap();
        assert_eq!(c.get_error("score").unwrap().kind, ErrorKind::CastTypeMismatch);

        let config = ChangesetConfig::default().with_widen_integers();
        let params = match Value::from(body) {
            Value::Map(params) => params,
            other => panic!("expected object, got {:?}", other),
        };
        let c = Changeset::cast_with_config(Account::default(), params, config);
        assert!(c.is_valid());
        assert_eq!(apply_new(c).unwrap().score, 3.0);
    }
}

#[cfg(test)]
mod validation_chains {
    use super::*;
    use pretty_assertions::assert_eq;

    fn signup(params: Params) -> Changeset<Account> {
        Changeset::<Account>::cast(params)
            .validate_required(["username", "emailAddress", "terms"])
            .validate_change("username", Length::new(3, 16))
            .validate_change("username", Exclusion::new(["admin", "root"]))
            .validate_change("emailAddress", Format::pattern(r"^[^@\s]+@[^@\s]+$").unwrap())
            .validate_change("age", GreaterThan::new(12_u32))
            .validate_change("age", LessThanOrEqual::new(130_u32))
            .validate_change("terms", Acceptance)
    }

    #[test]
    fn test_valid_signup() {
        let c = signup(valid_payload());
        assert!(c.is_valid(), "unexpected errors: {:?}", c.errors());
        assert_eq!(apply_new(c).unwrap().username, "alice");
    }

    #[test]
    fn test_every_failure_is_reported() {
        let c = signup(params! {
            "username" => "root",
            "emailAddress" => "not-an-email",
            "age" => 12,
            "terms" => false,
        });

        let errors = apply_new(c).unwrap_err();
        let fields = errors.to_field_map();
        let expected: BTreeMap<String, String> = [
            ("age", "age must be greater than 12, got 12"),
            (
                "emailAddress",
                r"emailAddress has invalid format, expected to match /^[^@\s]+@[^@\s]+$/",
            ),
            ("terms", "terms must be accepted"),
            (
                "username",
                r#"username is reserved, "root" is one of ["admin", "root"]"#,
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let c = signup(Params::new());
        assert_eq!(c.get_error("username").unwrap().kind, ErrorKind::MissingChange);
        assert_eq!(c.get_error("terms").unwrap().kind, ErrorKind::MissingChange);
        assert_eq!(c.get_error("emailAddress").unwrap().kind, ErrorKind::MissingChange);
        assert_eq!(c.get_error("age").unwrap().message, "doesn't exist");
    }

    #[test]
    fn test_invalid_state_is_absorbing() {
        let c = Changeset::<Account>::cast(params! { "username" => "x", "age" => 40 })
            .validate_change("username", Length::at_least(3));
        assert!(!c.is_valid());

        let c = c
            .validate_change("age", GreaterThan::new(18_u32))
            .put_change("username", "long enough");
        assert!(!c.is_valid());
        assert!(c.get_error("username").is_some());
    }

    #[test]
    fn test_inclusion_on_tags_list() {
        let c = Changeset::<Account>::cast(params! { "tags" => vec!["a", "b"] })
            .validate_change("tags", Inclusion::new([Value::from(vec!["a", "b"])]))
            .validate_change("tags", Length::exactly(2));
        assert!(c.is_valid());
    }

    #[test]
    fn test_update_change_with_anyhow() {
        let c = Changeset::<Account>::cast(params! { "username" => "  Alice  " })
            .update_change("username", |current| {
                let name = current
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow::anyhow!("username must be present"))?;
                Ok::<_, anyhow::Error>(name.trim().to_lowercase())
            })
            .update_change("nickname", |current| match current {
                Some(v) => Ok(v.clone()),
                None => Err(anyhow::anyhow!("nickname has nothing to update")),
            });

        assert_eq!(c.get_change("username"), Some(&Value::from("alice")));
        let err = c.get_error("nickname").unwrap();
        assert_eq!(err.kind, ErrorKind::TransformFailure);
        assert_eq!(err.message, "nickname has nothing to update");
    }

    #[test]
    fn test_traverse_errors_with_violation_detail() {
        let c = Changeset::<Account>::cast(params! { "username" => "hello" })
            .validate_change("username", Length::exactly(5))
            .validate_change("username", Length::exactly(3));

        let rendered = c.traverse_errors(|_, error, validator| {
            let length = validator.and_then(|v| v.downcast_ref::<Length>()).copied();
            (length, error.violation.clone().map(|v| v.actual))
        });

        assert_eq!(
            rendered["username"],
            (Some(Length::exactly(3)), Some("5 characters".to_string()))
        );
    }
}

#[cfg(test)]
mod materialization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_in_place_updates_existing_record() {
        let mut account = apply_new(Changeset::<Account>::cast(valid_payload())).unwrap();
        account.session_token = "keep".to_string();

        let c = Changeset::<Account>::cast(params! { "age" => 31, "nickname" => "ally" });
        apply_in_place(&mut account, c).unwrap();

        assert_eq!(account.age, 31);
        assert_eq!(account.nickname.as_deref(), Some("ally"));
        assert_eq!(account.username, "alice");
        assert_eq!(account.session_token, "keep");
    }

    #[test]
    fn test_readonly_field_is_validated_but_not_applied() {
        let c = Changeset::<Account>::cast(params! { "display_name" => "Alice A." })
            .validate_change("display_name", Length::at_most(32));
        assert!(c.is_valid());

        let account = c.apply_new().unwrap();
        assert_eq!(account.display_name, "");
    }

    #[test]
    fn test_readonly_field_rejected_when_strict() {
        let c = Changeset::cast_with_config(
            Account::default(),
            params! { "display_name" => "Alice A." },
            ChangesetConfig::strict(),
        );
        let errors = c.apply_new().unwrap_err();
        assert_eq!(errors.get("display_name").unwrap().kind, ErrorKind::InvalidField);
    }

    #[test]
    fn test_list_element_mismatch_rejected_at_cast() {
        let mut account = Account::default();
        let c = Changeset::<Account>::cast(params! { "age" => 5, "tags" => vec![1, 2] });
        assert!(!c.is_valid());
        assert_eq!(c.get_change("age"), Some(&Value::Int(5)));
        assert!(c.get_change("tags").is_none());

        let errors = c.apply_to(&mut account).unwrap_err();
        assert_eq!(errors.get("tags").unwrap().kind, ErrorKind::CastTypeMismatch);
        assert_eq!(account, Account::default());
    }

    #[test]
    fn test_out_of_range_integer_rejected_at_cast() {
        let c = Changeset::<Account>::cast(params! { "age" => -1 })
            .validate_change("age", GreaterThan::new(12_u32));
        assert!(c.get_change("age").is_none());
        let errors = c.apply_new().unwrap_err();
        assert_eq!(errors.get("age").unwrap().message, "doesn't exist");

        let c = Changeset::<Account>::cast(params! { "age" => -1 });
        assert_eq!(
            c.get_error("age").unwrap().message,
            "type mismatch: cannot cast -1 to int"
        );
    }

    #[test]
    fn test_apply_mismatch_on_hand_built_schema_keeps_earlier_fields() {
        let mut target = Loose::default();
        let c = Changeset::<Loose>::cast(params! { "count" => 2, "value" => "text" });
        assert!(c.is_valid());

        let errors = c.apply_to(&mut target).unwrap_err();
        assert_eq!(
            errors.get("value").unwrap().message,
            r#"type mismatch: cannot assign "text" to a field of type int"#
        );
        // "count" sorts before "value" and stays applied
        assert_eq!(target.count, 2);
    }

    #[test]
    fn test_invalid_changeset_leaves_target_untouched() {
        let mut account = Account::default();
        let c = Changeset::<Account>::cast(params! { "username" => "eve", "age" => "x" });

        let errors = apply_in_place(&mut account, c).unwrap_err();
        assert_eq!(account, Account::default());
        assert_eq!(errors.len(), 1);
        assert!(errors.to_string().contains("age: type mismatch: expected int, got string"));
    }

    #[test]
    fn test_error_report_serializes_as_field_object() {
        let c = Changeset::<Account>::cast(Params::new()).validate_required(["username", "terms"]);
        let errors = c.apply_new().unwrap_err();
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"terms": "is required", "username": "is required"})
        );
    }
}

#[cfg(test)]
mod branching {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_branches_do_not_alias() {
        let base = Changeset::<Account>::cast(valid_payload());
        let strict = base.clone().validate_change("username", Length::exactly(10));
        let relaxed = base.clone().put_change("username", "alice2");

        assert!(!strict.is_valid());
        assert!(relaxed.is_valid());
        assert!(base.is_valid());
        assert_eq!(base.get_change("username"), Some(&Value::from("alice")));
        assert!(relaxed.validation("username").is_none());
        assert!(strict.validation("username").is_some());
    }

    #[test]
    fn test_changeset_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Changeset<Account>>();
    }
}
