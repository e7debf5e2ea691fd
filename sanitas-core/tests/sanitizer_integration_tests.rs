// sanitas-core/tests/sanitizer_integration_tests.rs
use anyhow::Result;
use indexmap::IndexMap;
use test_log::test; // Routes `log` output through env_logger for failing tests.

use sanitas_core::{
    MetadataRegistry, Object, RuleKind, SanitasError, SanitizationArguments, SanitizationOptions, Sanitizer,
    SanitizerConstraint, Value,
};

fn plain() -> SanitizationOptions {
    SanitizationOptions::default()
}

#[derive(Default)]
struct LetterReplacer;

impl SanitizerConstraint for LetterReplacer {
    fn sanitize(&self, value: Value, _args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
        Ok(match value {
            Value::String(s) => Value::String(s.replace('o', "w")),
            other => other,
        })
    }
}

/// Appends the value the pipeline started from, separated by `|`.
#[derive(Default)]
struct EchoOriginal;

impl SanitizerConstraint for EchoOriginal {
    fn sanitize(&self, value: Value, args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
        Ok(Value::String(format!("{}|{}", value.to_js_string(), args.value.to_js_string())))
    }
}

/// Records what the context exposes, as a string.
#[derive(Default)]
struct DescribeContext;

impl SanitizerConstraint for DescribeContext {
    fn sanitize(&self, _value: Value, args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
        let constraints: Vec<String> = args.constraints.iter().map(Value::to_js_string).collect();
        let sibling = args.object.get("id").map(Value::to_js_string).unwrap_or_default();
        Ok(Value::String(format!(
            "{}.{} [{}] id={}",
            args.target_name,
            args.property,
            constraints.join(";"),
            sibling
        )))
    }
}

#[derive(Default)]
struct Refuse;

impl SanitizerConstraint for Refuse {
    fn sanitize(&self, _value: Value, _args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
        anyhow::bail!("refused")
    }
}

#[test]
fn test_end_to_end_basic_sanitization() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let user = registry.define_class("User", None)?;
    registry.register_rule(RuleKind::ToInt, user, "age", vec![], plain())?;
    registry.register_rule(RuleKind::NormalizeEmail, user, "email", vec![], plain())?;
    registry.register_rule(RuleKind::ToString, user, "tags", vec![], SanitizationOptions::each())?;
    registry.register_rule(RuleKind::ToLowerCase, user, "tags", vec![], SanitizationOptions::each())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(user)
        .with("age", "18")
        .with("email", "EXAMPLE+work@gmail.com")
        .with("tags", vec![Value::from("AAA"), Value::from(1)]);
    sanitizer.sanitize(&mut object)?;

    assert_eq!(object.get("age"), Some(&Value::Number(18.0)));
    assert_eq!(object.get("email"), Some(&Value::from("example@gmail.com")));
    assert_eq!(object.get("tags"), Some(&Value::Array(vec![Value::from("aaa"), Value::from("1")])));
    Ok(())
}

#[test]
fn test_nested_map_of_objects_is_sanitized() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let tag = registry.define_class("Tag", None)?;
    let post = registry.define_class("Post", None)?;
    registry.register_rule(RuleKind::Trim, tag, "name", vec![], plain())?;
    registry.register_rule(RuleKind::Trim, post, "title", vec![], plain())?;
    registry.register_rule(RuleKind::Nested, post, "tags", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut tags = IndexMap::new();
    tags.insert("first".to_string(), Value::Object(Object::new(tag).with("name", "  rust ")));
    tags.insert("second".to_string(), Value::Object(Object::new(tag).with("name", "web  ")));
    let mut object = Object::new(post).with("title", " Hello ").with("tags", Value::Map(tags));
    sanitizer.sanitize(&mut object)?;

    assert_eq!(object.get("title"), Some(&Value::from("Hello")));
    let Some(Value::Map(tags)) = object.get("tags") else {
        panic!("tags should stay a map");
    };
    let names: Vec<&Value> = tags.values().filter_map(|t| t.as_object()?.get("name")).collect();
    assert_eq!(names, vec![&Value::from("rust"), &Value::from("web")]);
    Ok(())
}

#[test]
fn test_nested_each_recurses_into_arrays_of_collections() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let tag = registry.define_class("Tag", None)?;
    let post = registry.define_class("Post", None)?;
    registry.register_rule(RuleKind::ToUpperCase, tag, "name", vec![], plain())?;
    registry.register_rule(RuleKind::Nested, post, "groups", vec![], SanitizationOptions::each())?;
    let sanitizer = Sanitizer::new(registry);

    let group = Value::Set(vec![Value::Object(Object::new(tag).with("name", "a"))]);
    let mut object = Object::new(post).with("groups", vec![group]);
    sanitizer.sanitize(&mut object)?;

    let expected = Value::Array(vec![Value::Set(vec![Value::Object(Object::new(tag).with("name", "A"))])]);
    assert_eq!(object.get("groups"), Some(&expected));
    Ok(())
}

#[test]
fn test_custom_rule_replaces_letters() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let replacer = registry.register_constraint_class::<LetterReplacer>(None, false);
    registry.register_custom_rule(post, "text", replacer, vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(post).with("text", "Hello world");
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("Hellw wwrld")));
    Ok(())
}

#[test]
fn test_custom_registrations_fold_in_order_with_original_in_context() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let echo = registry.register_constraint_class::<EchoOriginal>(Some("first"), false);
    registry.register_constraint_class::<EchoOriginal>(Some("second"), false);
    registry.register_custom_rule(post, "text", echo, vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(post).with("text", "a");
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("a|a|a")));
    Ok(())
}

#[test]
fn test_custom_context_exposes_target_constraints_and_object() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let describe = registry.register_constraint_class::<DescribeContext>(None, false);
    registry.register_custom_rule(post, "summary", describe, vec![Value::from("x"), Value::from(2)], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(post).with("id", 7).with("summary", "anything");
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("summary"), Some(&Value::from("Post.summary [x;2] id=7")));
    Ok(())
}

#[test]
fn test_custom_rule_each_applies_per_element() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let replacer = registry.register_constraint_class::<LetterReplacer>(None, false);
    registry.register_custom_rule(post, "words", replacer, vec![], SanitizationOptions::each())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(post).with("words", vec![Value::from("foo"), Value::from("bar")]);
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("words"), Some(&Value::Array(vec![Value::from("fww"), Value::from("bar")])));
    Ok(())
}

#[test]
fn test_custom_failure_names_the_constraint() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let refuse = registry.register_constraint_class::<Refuse>(Some("refuse"), false);
    registry.register_custom_rule(post, "text", refuse, vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(post).with("text", "x");
    let err = sanitizer.sanitize(&mut object).unwrap_err();
    assert!(matches!(
        err,
        SanitasError::ConstraintFailed { ref name, ref property, .. } if name == "refuse" && property == "text"
    ));
    Ok(())
}

#[test]
fn test_subclass_inherits_and_overrides_rules() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let base = registry.define_class("Base", None)?;
    let derived = registry.define_class("Derived", Some(base))?;
    registry.register_rule(RuleKind::Trim, base, "name", vec![Value::from("-")], plain())?;
    registry.register_rule(RuleKind::ToUpperCase, base, "code", vec![], plain())?;
    registry.register_rule(RuleKind::Trim, derived, "name", vec![Value::from("*")], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(derived).with("name", "*-x-*").with("code", "ab");
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("name"), Some(&Value::from("-x-")));
    assert_eq!(object.get("code"), Some(&Value::from("AB")));

    let mut base_object = Object::new(base).with("name", "*-x-*");
    sanitizer.sanitize(&mut base_object)?;
    assert_eq!(base_object.get("name"), Some(&Value::from("*-x-*")));
    Ok(())
}

#[test]
fn test_unrelated_classes_do_not_share_rules() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let note = registry.define_class("Note", None)?;
    let memo = registry.define_class("Memo", None)?;
    registry.register_rule(RuleKind::ToUpperCase, note, "text", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut first = Object::new(note).with("text", "abc");
    let mut second = Object::new(memo).with("text", "abc");
    sanitizer.sanitize(&mut first)?;
    sanitizer.sanitize(&mut second)?;
    assert_eq!(first.get("text"), Some(&Value::from("ABC")));
    assert_eq!(second.get("text"), Some(&Value::from("abc")));
    Ok(())
}

#[test]
fn test_case_and_trim_are_idempotent() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let form = registry.define_class("Form", None)?;
    registry.register_rule(RuleKind::Trim, form, "text", vec![], plain())?;
    registry.register_rule(RuleKind::ToLowerCase, form, "text", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(form).with("text", "  MiXeD  ");
    sanitizer.sanitize(&mut object)?;
    let once = object.clone();
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object, once);
    assert_eq!(object.get("text"), Some(&Value::from("mixed")));
    Ok(())
}

#[test]
fn test_falsy_values_never_reach_transforms() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let form = registry.define_class("Form", None)?;
    // toInt would reject a boolean; the rule must be skipped instead.
    registry.register_rule(RuleKind::ToInt, form, "flag", vec![], plain())?;
    registry.register_rule(RuleKind::ToBoolean, form, "count", vec![], plain())?;
    registry.register_rule(RuleKind::ToUpperCase, form, "label", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(form).with("flag", false).with("count", 0).with("label", "");
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("flag"), Some(&Value::Bool(false)));
    assert_eq!(object.get("count"), Some(&Value::Number(0.0)));
    assert_eq!(object.get("label"), Some(&Value::from("")));
    Ok(())
}

#[test]
fn test_skip_check_uses_values_from_the_start_of_the_run() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let form = registry.define_class("Form", None)?;
    // toInt turns "abc" into NaN, which is falsy; the later rules still run.
    registry.register_rule(RuleKind::ToInt, form, "code", vec![], plain())?;
    registry.register_rule(RuleKind::ToString, form, "code", vec![], plain())?;
    registry.register_rule(RuleKind::ToUpperCase, form, "code", vec![], plain())?;
    registry.register_rule(RuleKind::Trim, form, "name", vec![], plain())?;
    registry.register_rule(RuleKind::ToString, form, "count", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(form).with("code", "abc").with("name", " a ").with("count", 0);
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("code"), Some(&Value::from("NAN")));
    assert_eq!(object.get("name"), Some(&Value::from("a")));
    assert_eq!(object.get("count"), Some(&Value::Number(0.0)));
    Ok(())
}

#[test]
fn test_transform_error_keeps_earlier_changes() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let form = registry.define_class("Form", None)?;
    registry.register_rule(RuleKind::Trim, form, "name", vec![], plain())?;
    registry.register_rule(RuleKind::ToFloat, form, "score", vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let mut object = Object::new(form).with("name", " a ").with("score", true);
    let err = sanitizer.sanitize(&mut object).unwrap_err();
    assert!(matches!(err, SanitasError::Transform { kind: RuleKind::ToFloat, .. }));
    assert_eq!(object.get("name"), Some(&Value::from("a")));
    Ok(())
}

#[tokio::test]
async fn test_sanitize_async_resolves_with_the_object() -> Result<()> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let replacer = registry.register_constraint_class::<LetterReplacer>(None, true);
    registry.register_custom_rule(post, "text", replacer, vec![], plain())?;
    let sanitizer = Sanitizer::new(registry);

    let object = sanitizer.sanitize_async(Object::new(post).with("text", "good")).await?;
    assert_eq!(object.get("text"), Some(&Value::from("gwwd")));
    Ok(())
}
