use std::sync::Arc;

use strum::IntoEnumIterator;
use synthrun::contract::coerce::{FALSE_LITERALS, TRUE_LITERALS};
use synthrun::contract::{Strategy, TaskContract, TaskRegistry, TypeSchema, TypeTag, body_fn};
use synthrun::error::{ContractError, ErrorKind};
use synthrun::runtime::ExecutionContext;
use synthrun::value::{Value, ValueMap};

use crate::harness::{ScriptedNeural, map};

fn identity(tag: TypeTag) -> TaskContract {
    let schema = TypeSchema::new().field("f", tag).unwrap();
    TaskContract::symbolic(
        "identity",
        schema.clone(),
        schema,
        body_fn(|inputs, _ctx| Box::pin(async move { Ok(inputs) })),
    )
}

fn samples(tag: TypeTag) -> Vec<Value> {
    match tag {
        TypeTag::String => vec![Value::from("hello"), Value::from("")],
        TypeTag::Integer => vec![Value::from(0), Value::from(-17), Value::Integer(i64::MAX)],
        TypeTag::Number => vec![Value::from(0.5), Value::from(-2.25), Value::from(1e10)],
        TypeTag::Boolean => vec![Value::from(true), Value::from(false)],
        TypeTag::Array => vec![Value::Sequence(vec![Value::from(1), Value::from("a")])],
        TypeTag::Map => vec![Value::Map(map(&[("k", Value::from(1))]))],
        TypeTag::Any => vec![Value::Null, Value::from("x"), Value::from(3)],
    }
}

#[tokio::test]
async fn every_tag_accepts_its_own_representation_unchanged() {
    let ctx = ExecutionContext::builder().build();
    for tag in TypeTag::iter() {
        let task = identity(tag);
        for value in samples(tag) {
            let out = task
                .invoke(map(&[("f", value.clone())]), &ctx)
                .await
                .unwrap_or_else(|e| panic!("{tag}: {value:?}: {e}"));
            assert_eq!(out["f"], value, "{tag}");
        }
    }
}

#[tokio::test]
async fn numeric_and_boolean_text_round_trips() {
    let ctx = ExecutionContext::builder().build();

    let int_task = identity(TypeTag::Integer);
    for n in [0_i64, 42, -7, 1_000_000] {
        let out = int_task
            .invoke(map(&[("f", Value::from(n.to_string()))]), &ctx)
            .await
            .unwrap();
        assert_eq!(out["f"], Value::Integer(n));
        assert_eq!(out["f"].render(), n.to_string());
    }

    let num_task = identity(TypeTag::Number);
    for x in [0.5_f64, -3.75, 12.0] {
        let out = num_task
            .invoke(map(&[("f", Value::from(x.to_string()))]), &ctx)
            .await
            .unwrap();
        assert_eq!(out["f"], Value::Float(x));
        assert_eq!(out["f"].render().parse::<f64>().unwrap(), x);
    }

    let bool_task = identity(TypeTag::Boolean);
    for b in [true, false] {
        let out = bool_task
            .invoke(map(&[("f", Value::from(b.to_string()))]), &ctx)
            .await
            .unwrap();
        assert_eq!(out["f"], Value::Bool(b));
    }
}

#[tokio::test]
async fn boolean_literal_set_is_closed() {
    assert_eq!(TRUE_LITERALS, ["true", "t", "yes", "y", "on", "1"]);
    assert_eq!(FALSE_LITERALS, ["false", "f", "no", "n", "off", "0"]);

    let ctx = ExecutionContext::builder().build();
    let task = identity(TypeTag::Boolean);
    for lit in TRUE_LITERALS {
        let out = task.invoke(map(&[("f", Value::from(lit.to_uppercase()))]), &ctx).await.unwrap();
        assert_eq!(out["f"], Value::Bool(true), "{lit}");
    }
    for lit in FALSE_LITERALS {
        let out = task.invoke(map(&[("f", Value::from(lit))]), &ctx).await.unwrap();
        assert_eq!(out["f"], Value::Bool(false), "{lit}");
    }
    for bad in ["maybe", "2", "", "truthy"] {
        assert!(task.invoke(map(&[("f", Value::from(bad))]), &ctx).await.is_err(), "{bad}");
    }
}

#[tokio::test]
async fn integer_rejects_non_numeric_text_and_truncates_floats() {
    let ctx = ExecutionContext::builder().build();
    let task = identity(TypeTag::Integer);

    let out = task.invoke(map(&[("f", Value::from("3.9"))]), &ctx).await.unwrap();
    assert_eq!(out["f"], Value::Integer(3));

    let err = task.invoke(map(&[("f", Value::from("abc"))]), &ctx).await.unwrap_err();
    let contract = err.downcast_ref::<ContractError>().unwrap();
    assert!(matches!(contract, ContractError::TypeCoercion { task, .. } if task == "identity"));
    assert_eq!(contract.field(), Some("f"));
}

#[tokio::test]
async fn arrays_and_maps_are_never_split_from_text() {
    let ctx = ExecutionContext::builder().build();
    for tag in [TypeTag::Array, TypeTag::Map] {
        let err = identity(tag)
            .invoke(map(&[("f", Value::from("a,b,c"))]), &ctx)
            .await
            .unwrap_err();
        assert_eq!(ErrorKind::classify(&err), ErrorKind::ContractViolation);
    }
}

#[tokio::test]
async fn output_type_mismatch_names_the_field() {
    let task = TaskContract::symbolic(
        "count_words",
        TypeSchema::new(),
        TypeSchema::from_declaration([("x", "integer")]).unwrap(),
        body_fn(|_inputs, _ctx| Box::pin(async move { Ok(map(&[("x", Value::from("abc"))])) })),
    );
    let ctx = ExecutionContext::builder().build();
    let err = task.invoke(ValueMap::new(), &ctx).await.unwrap_err();
    let contract = err.downcast_ref::<ContractError>().unwrap();
    assert!(matches!(contract, ContractError::TypeCoercion { .. }));
    assert_eq!(contract.field(), Some("x"));
    assert!(err.to_string().contains("count_words"));
}

#[tokio::test]
async fn missing_output_is_reported() {
    let task = TaskContract::symbolic(
        "lazy",
        TypeSchema::new(),
        TypeSchema::from_declaration([("result", "string")]).unwrap(),
        body_fn(|_inputs, _ctx| Box::pin(async move { Ok(ValueMap::new()) })),
    );
    let ctx = ExecutionContext::builder().build();
    let err = task.invoke(ValueMap::new(), &ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ContractError>(),
        Some(ContractError::MissingOutput { field, .. }) if field == "result"
    ));
}

#[tokio::test]
async fn bodies_reach_other_tasks_through_the_context() {
    let mut tasks = TaskRegistry::new();
    tasks
        .register(TaskContract::symbolic(
            "square",
            TypeSchema::from_declaration([("n", "int")]).unwrap(),
            TypeSchema::from_declaration([("n", "int")]).unwrap(),
            body_fn(|inputs, _ctx| {
                Box::pin(async move {
                    let n = inputs["n"].as_i64().unwrap_or_default();
                    Ok(map(&[("n", Value::from(n * n))]))
                })
            }),
        ))
        .unwrap();
    tasks
        .register(TaskContract::symbolic(
            "square_plus_one",
            TypeSchema::from_declaration([("n", "int")]).unwrap(),
            TypeSchema::from_declaration([("n", "int")]).unwrap(),
            body_fn(|inputs, ctx| {
                Box::pin(async move {
                    let squared = ctx.invoke_task("square", inputs).await?;
                    let n = squared["n"].as_i64().unwrap_or_default();
                    Ok(map(&[("n", Value::from(n + 1))]))
                })
            }),
        ))
        .unwrap();

    let ctx = ExecutionContext::builder().tasks(Arc::new(tasks)).build();
    let out = ctx
        .invoke_task("square_plus_one", map(&[("n", Value::from("7"))]))
        .await
        .unwrap();
    assert_eq!(out["n"], Value::Integer(50));
}

#[tokio::test]
async fn hybrid_prefers_body_even_with_neural_executor() {
    let mut tasks = TaskRegistry::new();
    tasks
        .register(TaskContract::define(
            "hybrid",
            TypeSchema::new(),
            TypeSchema::from_declaration([("response", "string")]).unwrap(),
            Some("Reply with anything".into()),
            Some(body_fn(|_inputs, _ctx| {
                Box::pin(async move { Ok(map(&[("response", Value::from("from body"))])) })
            })),
        ))
        .unwrap();
    let ctx = ExecutionContext::builder()
        .tasks(Arc::new(tasks))
        .neural(Arc::new(ScriptedNeural))
        .build();

    assert_eq!(ctx.tasks().lookup("hybrid").unwrap().strategy(), Strategy::Hybrid);
    let out = ctx.invoke_task("hybrid", ValueMap::new()).await.unwrap();
    assert_eq!(out["response"], Value::from("from body"));
}

#[tokio::test]
async fn neural_task_uses_injected_executor() {
    let mut tasks = TaskRegistry::new();
    tasks
        .register(TaskContract::neural(
            "summarise",
            TypeSchema::new(),
            TypeSchema::from_declaration([("response", "text")]).unwrap(),
            "Summarise the input",
        ))
        .unwrap();
    let ctx = ExecutionContext::builder()
        .tasks(Arc::new(tasks))
        .neural(Arc::new(ScriptedNeural))
        .build();
    let out = ctx.invoke_task("summarise", ValueMap::new()).await.unwrap();
    assert_eq!(out["response"], Value::from("echo: Summarise the input"));
}

#[test]
fn schema_declaration_validates_names_and_types() {
    assert!(TypeSchema::from_declaration([("ok_name", "float")]).is_ok());
    assert!(matches!(
        TypeSchema::from_declaration([("9lives", "string")]),
        Err(ContractError::InvalidSchema(_))
    ));
    assert!(matches!(
        TypeSchema::from_declaration([("name", "datetime")]),
        Err(ContractError::InvalidSchema(_))
    ));
}
