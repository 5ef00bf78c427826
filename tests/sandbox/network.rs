use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{
    basic_auth, bearer_token, body_json, header, header_exists, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use synthrun::config::NetworkSandboxConfig;
use synthrun::runtime::ExecutionContext;
use synthrun::runtime::observability::{ObserverEvent, RecordingObserver};
use synthrun::sandbox::{Auth, HttpMethod, NetworkSandbox, RequestOptions, StaticResolver};
use synthrun::security::AddressPolicy;
use synthrun::value::Value;

use crate::harness::{loopback_sandbox, map};

fn sandbox() -> NetworkSandbox {
    loopback_sandbox(NetworkSandboxConfig::default())
}

#[tokio::test]
async fn get_returns_normalized_json_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "abc123")
                .set_body_json(json!({"items": [1, 2, 3]})),
        )
        .mount(&server)
        .await;

    let response = sandbox()
        .get(&format!("{}/items", server.uri()), &RequestOptions::new())
        .await;

    assert_eq!(response.status, 200);
    assert!(response.success);
    assert!(!response.blocked);
    assert!(response.error.is_none());
    assert_eq!(response.json, Some(json!({"items": [1, 2, 3]})));
    assert_eq!(
        response.headers.get("x-request-id").map(String::as_str),
        Some("abc123")
    );
    assert!(response.headers.keys().all(|k| k == &k.to_ascii_lowercase()));
}

#[tokio::test]
async fn repeated_response_headers_are_joined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("x-tag", "a")
                .append_header("x-tag", "b"),
        )
        .mount(&server)
        .await;

    let response = sandbox().get(&server.uri(), &RequestOptions::new()).await;
    assert_eq!(response.headers.get("x-tag").map(String::as_str), Some("a, b"));
}

#[tokio::test]
async fn default_user_agent_is_sent_unless_caller_sets_one() {
    let server = MockServer::start().await;
    let default_ua = NetworkSandboxConfig::default().user_agent;
    Mock::given(method("GET"))
        .and(path("/default"))
        .and(header("user-agent", default_ua.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/custom"))
        .and(header("user-agent", "probe/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sandbox = sandbox();
    let plain = sandbox
        .get(&format!("{}/default", server.uri()), &RequestOptions::new())
        .await;
    assert_eq!(plain.status, 200);

    let custom = sandbox
        .get(
            &format!("{}/custom", server.uri()),
            &RequestOptions::new().header("User-Agent", "probe/1.0"),
        )
        .await;
    assert_eq!(custom.status, 200);
}

#[tokio::test]
async fn credentials_are_attached_per_scheme() {
    let server = MockServer::start().await;
    Mock::given(path("/bearer"))
        .and(bearer_token("t0ken"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path("/basic"))
        .and(basic_auth("ada", "secret"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path("/header"))
        .and(header("x-api-key", "k-1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sandbox = sandbox();
    let cases = [
        (
            "/bearer",
            Auth::Bearer {
                token: "t0ken".into(),
            },
        ),
        (
            "/basic",
            Auth::Basic {
                username: "ada".into(),
                password: Some("secret".into()),
            },
        ),
        (
            "/header",
            Auth::Header {
                name: "X-Api-Key".into(),
                value: "k-1".into(),
            },
        ),
    ];
    for (route, auth) in cases {
        let response = sandbox
            .get(
                &format!("{}{route}", server.uri()),
                &RequestOptions::new().auth(auth),
            )
            .await;
        assert_eq!(response.status, 200, "{route}");
    }
}

#[tokio::test]
async fn non_2xx_is_a_value_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let response = sandbox().get(&server.uri(), &RequestOptions::new()).await;
    assert_eq!(response.status, 404);
    assert!(!response.success);
    assert!(!response.blocked);
    assert!(response.error.is_none());
    assert_eq!(response.body, "missing");
}

#[tokio::test]
async fn post_sends_json_body_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(query_param("q", "rust lang"))
        .and(body_json(json!({"limit": 5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let response = sandbox()
        .post(
            &format!("{}/search", server.uri()),
            &RequestOptions::new()
                .query("q", "rust lang")
                .json(json!({"limit": 5})),
        )
        .await;
    assert_eq!(response.status, 201);
    assert_eq!(response.json, Some(json!({"ok": true})));
}

#[tokio::test]
async fn put_delete_and_head_use_their_methods() {
    let server = MockServer::start().await;
    for verb in ["PUT", "DELETE", "HEAD"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
    }

    let sandbox = sandbox();
    let opts = RequestOptions::new();
    assert_eq!(sandbox.put(&server.uri(), &opts).await.status, 204);
    assert_eq!(sandbox.delete(&server.uri(), &opts).await.status, 204);
    assert_eq!(sandbox.head(&server.uri(), &opts).await.status, 204);
}

#[tokio::test]
async fn single_redirect_is_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let response = sandbox()
        .get(&format!("{}/old", server.uri()), &RequestOptions::new())
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "moved here");
}

#[tokio::test]
async fn second_redirect_hop_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(path("/one"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/two"))
        .mount(&server)
        .await;
    Mock::given(path("/two"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/three"))
        .mount(&server)
        .await;
    Mock::given(path("/three"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = sandbox()
        .get(&format!("{}/one", server.uri()), &RequestOptions::new())
        .await;
    assert_eq!(response.status, 302);
    assert_eq!(
        response.headers.get("location").map(String::as_str),
        Some("/three")
    );
}

#[tokio::test]
async fn redirects_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let sandbox = loopback_sandbox(NetworkSandboxConfig {
        follow_redirects: false,
        ..NetworkSandboxConfig::default()
    });
    let response = sandbox
        .get(&format!("{}/old", server.uri()), &RequestOptions::new())
        .await;
    assert_eq!(response.status, 302);
    assert!(!response.success);
}

#[tokio::test]
async fn redirect_into_blocked_range_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(path("/bounce"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "http://169.254.169.254/latest/meta-data/"),
        )
        .mount(&server)
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let sandbox = sandbox().with_observer(observer.clone());
    let response = sandbox
        .get(&format!("{}/bounce", server.uri()), &RequestOptions::new())
        .await;

    assert!(response.blocked);
    assert!(!response.success);
    assert_eq!(response.status, 0);
    assert!(response.error.is_some());
    assert!(observer.events().iter().any(|e| matches!(
        e,
        ObserverEvent::SandboxRejected { target, .. } if target.contains("169.254.169.254")
    )));
}

#[tokio::test]
async fn see_other_style_redirect_downgrades_post_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/done"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via get"))
        .mount(&server)
        .await;

    let response = sandbox()
        .post(
            &format!("{}/submit", server.uri()),
            &RequestOptions::new().text("payload"),
        )
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "via get");
}

#[tokio::test]
async fn temporary_redirect_keeps_method_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/retry"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/retry"))
        .and(body_json(json!({"n": 1})))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let response = sandbox()
        .post(
            &format!("{}/submit", server.uri()),
            &RequestOptions::new().json(json!({"n": 1})),
        )
        .await;
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn credentials_are_dropped_on_cross_host_redirect() {
    let server = MockServer::start().await;
    let port = server.address().port();
    Mock::given(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("http://localhost:{port}/landing").as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(path("/landing"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sandbox = sandbox().with_resolver(Arc::new(
        StaticResolver::new().with_host("localhost", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
    ));
    let response = sandbox
        .get(
            &format!("http://127.0.0.1:{port}/start"),
            &RequestOptions::new().auth(Auth::Bearer {
                token: "secret".into(),
            }),
        )
        .await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn caller_credential_headers_are_dropped_on_cross_host_redirect() {
    let server = MockServer::start().await;
    let port = server.address().port();
    Mock::given(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("http://localhost:{port}/landing").as_str()),
        )
        .mount(&server)
        .await;
    for name in ["authorization", "cookie", "proxy-authorization"] {
        Mock::given(path("/landing"))
            .and(header_exists(name))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
    }
    Mock::given(path("/landing"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sandbox = sandbox().with_resolver(Arc::new(
        StaticResolver::new().with_host("localhost", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
    ));
    let response = sandbox
        .get(
            &format!("http://127.0.0.1:{port}/start"),
            &RequestOptions::new()
                .header("Authorization", "Bearer secret")
                .header("Cookie", "session=abc")
                .header("Proxy-Authorization", "Basic Zm9vOmJhcg=="),
        )
        .await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn caller_credential_headers_survive_same_host_redirect() {
    let server = MockServer::start().await;
    Mock::given(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/landing"))
        .mount(&server)
        .await;
    Mock::given(path("/landing"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = sandbox()
        .get(
            &format!("{}/start", server.uri()),
            &RequestOptions::new().header("Authorization", "Bearer secret"),
        )
        .await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn hostnames_connect_only_to_the_checked_addresses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pinned"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    // `.invalid` never resolves through system DNS, so the request can only
    // reach the mock server through the pinned address.
    let sandbox = sandbox().with_resolver(Arc::new(
        StaticResolver::new().with_host("pinned.invalid", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]),
    ));
    let port = server.address().port();
    let response = sandbox
        .get(
            &format!("http://pinned.invalid:{port}/pinned"),
            &RequestOptions::new(),
        )
        .await;
    assert_eq!(response.status, 204);
    assert!(response.error.is_none());
}

#[tokio::test]
async fn oversized_body_is_truncated_and_not_parsed() {
    let server = MockServer::start().await;
    let big = json!({"data": "x".repeat(200)}).to_string();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(big, "application/json"))
        .mount(&server)
        .await;

    let sandbox = loopback_sandbox(NetworkSandboxConfig {
        max_response_bytes: 32,
        ..NetworkSandboxConfig::default()
    });
    let response = sandbox.get(&server.uri(), &RequestOptions::new()).await;
    assert_eq!(response.status, 200);
    assert!(response.body.starts_with("{\"data\":\"xxxx"));
    assert!(response.body.contains("[body truncated at 32 bytes]"));
    assert!(response.json.is_none());
}

#[tokio::test]
async fn private_targets_are_refused_before_connecting() {
    let sandbox = NetworkSandbox::new(NetworkSandboxConfig::default())
        .with_policy(AddressPolicy::standard())
        .with_resolver(Arc::new(StaticResolver::new().with_host(
            "mixed.example",
            vec![
                IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)),
            ],
        )));

    for url in [
        "http://169.254.169.254/latest/meta-data/",
        "http://127.0.0.1:1/",
        "http://[::1]/",
        "http://0x7f000001/",
        "http://mixed.example/",
        "file:///etc/passwd",
    ] {
        let response = sandbox.get(url, &RequestOptions::new()).await;
        assert!(response.blocked, "{url} should be blocked");
        assert_eq!(response.status, 0, "{url}");
        assert!(!sandbox.validate(url).await.allowed, "{url}");
    }
}

#[tokio::test]
async fn http_tool_goes_through_the_sandbox() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(body_json(json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"echoed": true})))
        .mount(&server)
        .await;

    let ctx = ExecutionContext::builder()
        .network(Arc::new(sandbox()))
        .build();
    let body = Value::Map(map(&[("hello", Value::from("world"))]));
    let result = ctx
        .call_tool(
            "http_request",
            map(&[
                ("url", Value::from(format!("{}/echo", server.uri()))),
                ("method", Value::from(HttpMethod::Post.to_string())),
                ("body", body),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(result.get("status"), Some(&Value::Integer(200)));
    assert_eq!(result.get("success"), Some(&Value::Bool(true)));
    assert_eq!(
        result.get("json").and_then(|j| j.get("echoed")),
        Some(&Value::Bool(true))
    );
}
