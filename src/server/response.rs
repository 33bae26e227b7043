use crate::response::Response;

/// Write an encoded response; the body is always JSON.
pub fn write_json_response(res: &mut may_minihttp::Response, response: &Response) {
    res.status_code(usize::from(response.status), response.reason());
    res.header("Content-Type: application/json");
    res.body_vec(response.to_json_bytes());
}
