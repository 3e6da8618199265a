//! Verify request rendering, response parsing and SSO signing against the
//! JSON vectors stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so key order does not
//! matter.

use serde_json::Value;
use zendesk_core::models::schema_for;
use zendesk_core::request::{parse_record, Request};
use zendesk_core::sso::{encode_jwt, remote_login_url, Claims, RemoteLogin};
use zendesk_core::{ApiError, Config, HttpMethod, HttpResponse, Record, Schema};

fn schema(case: &Value) -> &'static Schema {
    let collection = case["collection"].as_str().unwrap();
    schema_for(collection).unwrap_or_else(|| panic!("unknown collection: {collection}"))
}

fn statuses(case: &Value) -> Vec<u16> {
    case["expected_statuses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|status| status.as_u64().unwrap() as u16)
        .collect()
}

fn params(case: &Value) -> Record {
    case["params"].as_object().cloned().unwrap_or_default()
}

fn build(case: &Value) -> Request {
    let schema = schema(case);
    let id = case["id"].as_u64();
    match case["operation"].as_str().unwrap() {
        "index" => Request::index(schema),
        "show" => Request::show(schema, id.unwrap()),
        "create" => Request::create(schema, &params(case)),
        "update" => Request::update(schema, id.unwrap(), &params(case)),
        "destroy" => Request::destroy(schema, id.unwrap()),
        "scoped" => Request::scoped(schema, id.unwrap(), case["tail"].as_str().unwrap()),
        "current_user" => Request::current_user(),
        other => panic!("unknown operation: {other}"),
    }
}

#[test]
fn request_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let settings = &vectors["config"];
    let config = Config::new(
        settings["url"].as_str().unwrap(),
        settings["username"].as_str().unwrap(),
    )
    .with_token(settings["token"].as_str().unwrap());
    let authorization = vectors["authorization"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];

        let request = build(case);
        assert_eq!(request.expected, statuses(case).as_slice(), "{name}: statuses");

        let http = request.to_http(&config).unwrap();
        assert_eq!(
            Some(http.method),
            HttpMethod::parse(expected["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(http.url, expected["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(http.header("authorization"), Some(authorization), "{name}: authorization");
        assert_eq!(http.header("accept"), Some("application/json"), "{name}: accept");

        match http.body.as_deref() {
            Some(body) => {
                let body: Value = serde_json::from_str(body).unwrap();
                assert_eq!(body, expected["body"], "{name}: body");
                assert_eq!(http.header("content-type"), Some("application/json"), "{name}: content-type");
            }
            None => assert!(expected["body"].is_null(), "{name}: body"),
        }
    }
}

#[test]
fn response_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let simulated = &case["response"];
        let response = HttpResponse {
            status: simulated["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: simulated["body"].as_str().unwrap().to_string(),
        };
        let result = parse_record(response, schema(case), &statuses(case));
        let expected = &case["expected"];

        if let Some(ok) = expected.get("ok") {
            let record = result.unwrap_or_else(|e| panic!("{name}: {e}"));
            match (record, ok) {
                (None, Value::Null) => {}
                (Some(record), Value::Object(fields)) => {
                    for (key, value) in fields {
                        assert_eq!(record.get(key), Some(value), "{name}: {key}");
                    }
                }
                (record, ok) => panic!("{name}: got {record:?}, expected {ok}"),
            }
            continue;
        }

        let err = result.unwrap_err();
        let matched = match expected["error"].as_str().unwrap() {
            "not_found" => matches!(err, ApiError::NotFound),
            "invalid" => matches!(err, ApiError::Invalid { ref body } if body.contains("RecordInvalid")),
            "http" => matches!(err, ApiError::HttpError { status: 500, .. }),
            "deserialization" => matches!(err, ApiError::DeserializationError(_)),
            other => panic!("unknown error kind: {other}"),
        };
        assert!(matched, "{name}: unexpected error {err:?}");
    }
}

#[test]
fn sso_vectors() {
    let raw = include_str!("../../test-vectors/sso.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["remote"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let login = RemoteLogin {
            name: input["name"].as_str().unwrap(),
            email: input["email"].as_str().unwrap(),
            token: input["token"].as_str().unwrap(),
            timestamp: input["timestamp"].as_i64().unwrap(),
        };
        assert_eq!(login.hash(), case["hash"].as_str().unwrap(), "{name}: hash");
        let url = remote_login_url("https://acme.zendesk.com", &login, None).unwrap();
        assert_eq!(url, case["url"].as_str().unwrap(), "{name}: url");
    }

    for case in vectors["jwt"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let claims: Claims = serde_json::from_value(case["claims"].clone()).unwrap();
        let token = encode_jwt(&claims, case["secret"].as_str().unwrap()).unwrap();
        assert_eq!(token, case["token"].as_str().unwrap(), "{name}: token");
    }
}
