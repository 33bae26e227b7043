//! End-to-end dispatch through the demo application without a socket.
//!
//! Requests are fed to the dispatcher with in-memory bodies so every step of
//! the pipeline (route, decode, bind, invoke, encode) is exercised.

use serde_json::json;
use tinyroute::demo::demo_app;
use tinyroute::{Dispatcher, Response, RuntimeConfig};

mod common;
use common::dispatch::call;

fn demo() -> Dispatcher {
    demo_app(RuntimeConfig::default()).unwrap().into_dispatcher()
}

fn ok(dispatcher: &Dispatcher, method: &str, target: &str) -> Response {
    call(dispatcher, method, target, None, b"").unwrap()
}

fn error_msg(response: &Response) -> &str {
    response.body["error_msg"].as_str().unwrap_or_default()
}

#[test]
fn test_query_binding_uses_default_age() {
    let res = ok(&demo(), "GET", "/a/1/params?name=b");
    assert_eq!(res, Response::new(200, json!("1: hemlo, a b")));
}

#[test]
fn test_query_binding_with_age() {
    let res = ok(&demo(), "GET", "/Mr/7/params?name=Bean&age=33");
    assert_eq!(res.body, json!("7: hemlo, Mr Bean of age 33"));
}

#[test]
fn test_missing_required_argument() {
    let res = ok(&demo(), "GET", "/a/1/params");
    assert_eq!(res.status, 500);
    assert_eq!(res.body, json!({"error_msg": "Argument 'name' is required"}));
}

#[test]
fn test_path_capture_must_convert() {
    let res = ok(&demo(), "GET", "/a/one/params?name=b");
    assert_eq!(res.status, 500);
    assert!(
        error_msg(&res).starts_with("Argument 'uid' must be int"),
        "{}",
        error_msg(&res)
    );
}

#[test]
fn test_path_capture_beats_query() {
    let res = ok(&demo(), "GET", "/a/1/params?name=b&uid=99&title=x");
    assert_eq!(res.body, json!("1: hemlo, a b"));
}

#[test]
fn test_tuple_reply_sets_status() {
    let res = ok(&demo(), "GET", "/poshel");
    assert_eq!(res, Response::new(400, json!("away with your football")));
    assert_eq!(res.reason(), "Bad Request");
}

#[test]
fn test_patch_route() {
    let res = ok(&demo(), "PATCH", "/patch");
    assert_eq!(res, Response::new(200, json!("patching something")));
}

#[test]
fn test_invalid_status_code_is_not_a_response() {
    let err = call(&demo(), "GET", "/invalid_code", None, b"").unwrap_err();
    assert_eq!(err.status, 600);
    assert_eq!(err.handler, "invalid_code");
    assert_eq!(
        err.to_string(),
        "invalid response code 600 for endpoint invalid_code"
    );
}

#[test]
fn test_unknown_path_is_not_found() {
    let res = ok(&demo(), "GET", "/nowhere");
    assert_eq!(
        res,
        Response::new(404, json!({"error_msg": "No such endpoint"}))
    );
}

#[test]
fn test_method_mismatch_is_not_found() {
    let res = ok(&demo(), "POST", "/poshel");
    assert_eq!(res.status, 404);
    assert_eq!(error_msg(&res), "No such endpoint");
}

#[test]
fn test_urlencoded_body() {
    let res = call(
        &demo(),
        "POST",
        "/a/1/params",
        Some("application/x-www-form-urlencoded"),
        b"name=b+c&age=5",
    )
    .unwrap();
    assert_eq!(res.body, json!("1: hemlo, a b c of age 5"));
}

#[test]
fn test_form_field_overrides_query_field() {
    let res = call(
        &demo(),
        "POST",
        "/a/1/params?name=query&age=1",
        Some("application/x-www-form-urlencoded"),
        b"name=form",
    )
    .unwrap();
    assert_eq!(res.body, json!("1: hemlo, a form of age 1"));
}

#[test]
fn test_invalid_utf8_escape_in_query() {
    let res = ok(&demo(), "GET", "/a/1/params?name=%FF%FE");
    assert_eq!(res.status, 500);
    assert_eq!(error_msg(&res), "request data is not valid UTF-8");
}

#[test]
fn test_invalid_utf8_escape_in_form_body() {
    let res = call(
        &demo(),
        "POST",
        "/a/1/params",
        Some("application/x-www-form-urlencoded"),
        b"name=%FF",
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert_eq!(error_msg(&res), "request data is not valid UTF-8");
}

#[test]
fn test_malformed_urlencoded_body() {
    let res = call(
        &demo(),
        "POST",
        "/a/1/params",
        Some("application/x-www-form-urlencoded"),
        b"name",
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(error_msg(&res).starts_with("malformed field"), "{}", error_msg(&res));
}

#[test]
fn test_multipart_body() {
    let body = concat!(
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"name\"\r\n",
        "\r\n",
        "Multi\r\n",
        "--XyZ\r\n",
        "Content-Disposition: form-data; name=\"age\"\r\n",
        "\r\n",
        "40\r\n",
        "--XyZ--\r\n",
    );
    let res = call(
        &demo(),
        "POST",
        "/a/1/params",
        Some("multipart/form-data; boundary=XyZ"),
        body.as_bytes(),
    )
    .unwrap();
    assert_eq!(res.body, json!("1: hemlo, a Multi of age 40"));
}

#[test]
fn test_multipart_repeated_field_does_not_bind_to_scalar() {
    let body = concat!(
        "--b\r\n",
        "Content-Disposition: form-data; name=\"name\"\r\n",
        "\r\n",
        "one\r\n",
        "--b\r\n",
        "Content-Disposition: form-data; name=\"name\"\r\n",
        "\r\n",
        "two\r\n",
        "--b--\r\n",
    );
    let res = call(
        &demo(),
        "POST",
        "/a/1/params",
        Some("multipart/form-data; boundary=b"),
        body.as_bytes(),
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(error_msg(&res).contains("received 2 values"), "{}", error_msg(&res));
}

#[test]
fn test_json_schema_object() {
    let res = call(
        &demo(),
        "POST",
        "/person",
        Some("application/json"),
        br#"{"name":"Al","age":30}"#,
    )
    .unwrap();
    assert_eq!(res, Response::new(200, json!("hemlo, Al of age 30")));
}

#[test]
fn test_json_schema_object_optional_field() {
    let res = call(
        &demo(),
        "POST",
        "/person",
        Some("application/json; charset=utf-8"),
        br#"{"name":"Al"}"#,
    )
    .unwrap();
    assert_eq!(res.body, json!("hemlo, Al"));
}

#[test]
fn test_json_list_binds_each_element() {
    let body = br#"[{"name":"Al","age":30},{"name":"Bo"},{"name":"Cy","age":12}]"#;
    let d = demo();

    let all = call(&d, "POST", "/people", Some("application/json"), body).unwrap();
    assert_eq!(
        all.body,
        json!({"count": 3, "names": ["Al", "Bo", "Cy"]})
    );

    let adults = call(
        &d,
        "POST",
        "/people?adults_only=true",
        Some("application/json"),
        body,
    )
    .unwrap();
    assert_eq!(adults.body, json!({"count": 1, "names": ["Al"]}));
}

#[test]
fn test_json_object_for_list_parameter_fails() {
    let res = call(
        &demo(),
        "POST",
        "/people",
        Some("application/json"),
        br#"{"name":"Al"}"#,
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(
        error_msg(&res).starts_with("Argument 'people' must be list[Person]"),
        "{}",
        error_msg(&res)
    );
}

#[test]
fn test_json_element_with_wrong_field_type_fails() {
    let res = call(
        &demo(),
        "POST",
        "/people",
        Some("application/json"),
        br#"[{"name":"Al","age":"old"}]"#,
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(error_msg(&res).starts_with("Argument 'people'"), "{}", error_msg(&res));
}

#[test]
fn test_invalid_json_is_decode_failure() {
    let res = call(
        &demo(),
        "POST",
        "/person",
        Some("application/json"),
        b"{not json",
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(error_msg(&res).starts_with("invalid JSON body"), "{}", error_msg(&res));
}

#[test]
fn test_structured_parameter_without_document_is_missing() {
    let res = ok(&demo(), "POST", "/person");
    assert_eq!(res.body, json!({"error_msg": "Argument 'person' is required"}));
}

#[test]
fn test_unsupported_content_type_with_body() {
    let res = call(&demo(), "POST", "/person", Some("text/plain"), b"hello").unwrap();
    assert_eq!(res.status, 500);
    assert_eq!(error_msg(&res), "unsupported content type \"text/plain\"");
}

#[test]
fn test_body_over_limit_is_rejected() {
    let config = RuntimeConfig {
        max_body_bytes: 8,
        ..RuntimeConfig::default()
    };
    let d = demo_app(config).unwrap().into_dispatcher();
    let res = call(
        &d,
        "POST",
        "/person",
        Some("application/json"),
        br#"{"name":"Alexander"}"#,
    )
    .unwrap();
    assert_eq!(res.status, 500);
    assert!(error_msg(&res).contains("exceeds the 8 byte limit"), "{}", error_msg(&res));
}

#[test]
fn test_concurrent_dispatch_shares_route_table() {
    let d = demo();
    let workers: Vec<_> = (0..8)
        .map(|i| {
            let d = d.clone();
            std::thread::spawn(move || {
                let target = format!("/t/{i}/params?name=n{i}");
                call(&d, "GET", &target, None, b"").unwrap().body
            })
        })
        .collect();
    for (i, worker) in workers.into_iter().enumerate() {
        assert_eq!(worker.join().unwrap(), json!(format!("{i}: hemlo, t n{i}")));
    }
}
