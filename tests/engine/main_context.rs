use std::sync::Arc;

use synthrun::config::Config;
use synthrun::contract::{TaskContract, TypeSchema, TypeTag, body_fn};
use synthrun::error::{ContractError, ErrorKind};
use synthrun::runtime::observability::{ObserverEvent, RecordingObserver};
use synthrun::runtime::{Engine, MainExecutionContext};
use synthrun::value::{Value, ValueMap};

use crate::harness::{map, recording_context};

fn greeter() -> TaskContract {
    TaskContract::symbolic(
        "greet",
        TypeSchema::new().field("name", TypeTag::String).unwrap(),
        TypeSchema::new().field("greeting", TypeTag::String).unwrap(),
        body_fn(|inputs, _ctx| {
            Box::pin(async move {
                let name = inputs
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(map(&[("greeting", Value::from(format!("hello {name}")))]))
            })
        }),
    )
}

fn engine(observer: Arc<RecordingObserver>) -> Engine {
    let config = Config {
        workspace_dir: std::env::temp_dir(),
        ..Config::default()
    };
    let mut engine = Engine::new(config, observer).unwrap();
    engine.register_task(greeter()).unwrap();
    engine
}

#[tokio::test]
async fn entry_point_drives_tasks_and_tools_through_the_context() {
    let observer = Arc::new(RecordingObserver::new());
    let engine = engine(observer.clone());
    let mut main = MainExecutionContext::new();
    main.define_fn(|input, ctx| {
        Box::pin(async move {
            let greeting = ctx.invoke_task("greet", input).await?;
            let echoed = ctx
                .call_tool(
                    "process_run",
                    map(&[
                        ("command", Value::from("echo")),
                        (
                            "args",
                            Value::Sequence(vec![greeting["greeting"].clone()]),
                        ),
                    ]),
                )
                .await?;
            Ok(echoed.get("output").cloned().unwrap_or_default())
        })
    });

    let out = main
        .call(map(&[("name", Value::from("ada"))]), &engine.context())
        .await
        .unwrap();
    assert_eq!(out, Value::from("hello ada\n"));

    let events = observer.events();
    assert!(matches!(events.first(), Some(ObserverEvent::InvocationStart { .. })));
    assert!(matches!(
        events.last(),
        Some(ObserverEvent::InvocationEnd { success: true, .. })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        ObserverEvent::TaskInvoked { task, .. } if task == "greet"
    )));
}

#[tokio::test]
async fn contract_violation_reaches_the_caller_unchanged() {
    let observer = Arc::new(RecordingObserver::new());
    let engine = engine(observer.clone());
    let mut main = MainExecutionContext::new();
    main.define_fn(|_input, ctx| {
        Box::pin(async move {
            // `name` is missing, so the contract rejects the call.
            ctx.invoke_task("greet", ValueMap::new()).await?;
            Ok(Value::Null)
        })
    });

    let err = main
        .call(ValueMap::new(), &engine.context())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ContractError>(),
        Some(ContractError::MissingInput { field, .. }) if field == "name"
    ));
    assert_eq!(ErrorKind::classify(&err), ErrorKind::ContractViolation);

    let logged: Vec<_> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ObserverEvent::Error {
                component,
                kind,
                message,
                ..
            } => Some((component, kind, message)),
            _ => None,
        })
        .collect();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].0, "main");
    assert_eq!(logged[0].1, "contract_violation");
    assert_eq!(logged[0].2, err.to_string());
}

#[tokio::test]
async fn each_call_gets_its_own_invocation() {
    let (ctx_a, observer) = recording_context();
    let (ctx_b, _) = recording_context();
    let mut main = MainExecutionContext::new();
    main.define_fn(|_input, ctx| {
        let id = ctx.invocation_id().to_string();
        Box::pin(async move { Ok(Value::from(id)) })
    });

    let a = main.call(ValueMap::new(), &ctx_a).await.unwrap();
    let b = main.call(ValueMap::new(), &ctx_b).await.unwrap();
    assert_ne!(a, b);
    assert_eq!(
        observer.count(|e| matches!(e, ObserverEvent::InvocationStart { .. })),
        1
    );
}

#[tokio::test]
async fn redefining_replaces_the_entry_point() {
    let (ctx, _) = recording_context();
    let mut main = MainExecutionContext::new();
    main.define_fn(|_input, _ctx| Box::pin(async { Ok(Value::from(1)) }));
    main.define_fn(|_input, _ctx| Box::pin(async { Ok(Value::from(2)) }));
    assert_eq!(
        main.call(ValueMap::new(), &ctx).await.unwrap(),
        Value::Integer(2)
    );
}

#[tokio::test]
async fn calling_without_an_entry_point_fails() {
    let (ctx, observer) = recording_context();
    let main = MainExecutionContext::new();
    assert!(main.call(ValueMap::new(), &ctx).await.is_err());
    assert!(observer.events().is_empty());
}
