use super::{RouteError, Router};
use crate::handler::HandlerDescriptor;
use http::Method;

fn handler(name: &str) -> HandlerDescriptor {
    HandlerDescriptor::new(name, |_args: &crate::Args| Ok(()))
}

#[test]
fn test_root_path() {
    let (re, params) = Router::path_to_regex("/").unwrap();
    assert!(re.is_match("/"));
    assert!(!re.is_match(""));
    assert!(params.is_empty());
}

#[test]
fn test_parameterized_path() {
    let (re, params) = Router::path_to_regex("/:title/:uid/params").unwrap();
    assert!(re.is_match("/foo/42/params"));
    assert!(!re.is_match("/foo/42"));
    assert!(!re.is_match("/foo/42/params/extra"));
    assert!(!re.is_match("/foo/bar/42/params"));
    let names: Vec<&str> = params.iter().map(|p| p.as_ref()).collect();
    assert_eq!(names, ["title", "uid"]);
}

#[test]
fn test_literals_are_escaped() {
    let (re, _) = Router::path_to_regex("/v1.0/items").unwrap();
    assert!(re.is_match("/v1.0/items"));
    assert!(!re.is_match("/v1x0/items"));
}

#[test]
fn test_trailing_slash_is_significant() {
    let (re, _) = Router::path_to_regex("/poshel").unwrap();
    assert!(!re.is_match("/poshel/"));
}

#[test]
fn test_invalid_templates() {
    assert!(matches!(
        Router::path_to_regex("poshel"),
        Err(RouteError::MissingLeadingSlash(_))
    ));
    assert!(matches!(
        Router::path_to_regex("/a/:"),
        Err(RouteError::InvalidCaptureName { .. })
    ));
    assert!(matches!(
        Router::path_to_regex("/a/:1st"),
        Err(RouteError::InvalidCaptureName { .. })
    ));
    assert!(matches!(
        Router::path_to_regex("/:id/x/:id"),
        Err(RouteError::DuplicateCapture { ref name, .. }) if name == "id"
    ));
}

#[test]
fn test_empty_method_set_rejected() {
    let mut router = Router::new();
    let err = router
        .register("/patch", Vec::<Method>::new(), handler("patch"))
        .unwrap_err();
    assert!(matches!(err, RouteError::EmptyMethodSet(_)));
    assert!(router.is_empty());
}

#[test]
fn test_captures_in_template_order() {
    let mut router = Router::new();
    router
        .register("/:title/:uid/params", [Method::GET], handler("hemlo"))
        .unwrap();
    let m = router.route(&Method::GET, "/foo/42/params").unwrap();
    assert_eq!(m.handler.name(), "hemlo");
    assert_eq!(m.template.as_ref(), "/:title/:uid/params");
    let captures: Vec<(&str, &str)> = m
        .path_params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_str()))
        .collect();
    assert_eq!(captures, [("title", "foo"), ("uid", "42")]);
}

#[test]
fn test_method_mismatch_is_not_found() {
    let mut router = Router::new();
    router.register("/poshel", [Method::GET], handler("poshel")).unwrap();
    assert!(router.route(&Method::POST, "/poshel").is_none());
}

#[test]
fn test_first_registered_match_wins() {
    let mut router = Router::new();
    router.register("/:any", [Method::GET], handler("catch_all")).unwrap();
    router.register("/poshel", [Method::GET], handler("poshel")).unwrap();
    let m = router.route(&Method::GET, "/poshel").unwrap();
    assert_eq!(m.handler.name(), "catch_all");
}

#[test]
fn test_method_mismatch_falls_through_to_later_route() {
    let mut router = Router::new();
    router.register("/items", [Method::GET], handler("list")).unwrap();
    router.register("/items", [Method::POST], handler("create")).unwrap();
    assert_eq!(
        router.route(&Method::POST, "/items").unwrap().handler.name(),
        "create"
    );
}

#[test]
fn test_describe_lists_routes_in_order() {
    let mut router = Router::new();
    router
        .register("/patch", [Method::PATCH], handler("patch"))
        .unwrap();
    router
        .register("/poshel", [Method::GET, Method::GET], handler("poshel"))
        .unwrap();
    assert_eq!(
        router.describe(),
        ["PATCH /patch -> patch()", "GET /poshel -> poshel()"]
    );
    assert_eq!(router.len(), 2);
}
