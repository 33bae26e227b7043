//! The demo application served by `tinyroute serve`.

use crate::response::Json;
use crate::router::RouteError;
use crate::{endpoint, App, RuntimeConfig};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: Option<i64>,
}

crate::schema_object!(Person);

#[endpoint]
pub fn hemlo(title: String, uid: i64, name: String, #[default(0)] age: i64) -> String {
    if age != 0 {
        format!("{uid}: hemlo, {title} {name} of age {age}")
    } else {
        format!("{uid}: hemlo, {title} {name}")
    }
}

#[endpoint]
pub fn poshel() -> (&'static str, u16) {
    ("away with your football", 400)
}

#[endpoint]
pub fn patch() -> &'static str {
    "patching something"
}

/// Deliberately returns a status outside the legality table.
#[endpoint]
pub fn invalid_code() -> (&'static str, u16) {
    ("invalid code", 600)
}

#[endpoint]
pub fn person(person: Person) -> String {
    match person.age {
        Some(age) => format!("hemlo, {} of age {age}", person.name),
        None => format!("hemlo, {}", person.name),
    }
}

#[endpoint]
pub fn people(people: Vec<Person>, #[default(false)] adults_only: bool) -> Json<Value> {
    let names: Vec<&str> = people
        .iter()
        .filter(|p| !adults_only || p.age.is_some_and(|age| age >= 18))
        .map(|p| p.name.as_str())
        .collect();
    Json(json!({ "count": names.len(), "names": names }))
}

/// Build the demo app with every demo route registered.
///
/// # Errors
///
/// Only if a demo template fails to compile.
pub fn demo_app(config: RuntimeConfig) -> Result<App, RouteError> {
    let mut app = App::with_config(config);
    app.register("/:title/:uid/params", [Method::GET, Method::POST], hemlo_handler())?
        .register("/poshel", [Method::GET], poshel_handler())?
        .register("/patch", [Method::PATCH], patch_handler())?
        .register("/invalid_code", [Method::GET], invalid_code_handler())?
        .register("/people", [Method::POST], people_handler())?
        .register("/person", [Method::POST], person_handler())?;
    Ok(app)
}
