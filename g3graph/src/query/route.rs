/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use serde_json::{Map, Value, json};

use super::QueryAdapter;

const GRAPH_DATA_PATH: &str = "/graph_data";

fn json_response(status: StatusCode, body: Value) -> Response<String> {
    let mut rsp = Response::new(body.to_string());
    *rsp.status_mut() = status;
    rsp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    rsp
}

fn error_response(status: StatusCode) -> Response<String> {
    let reason = status.canonical_reason().unwrap_or("error");
    json_response(status, json!({ "error": reason }))
}

/// Serve the graph data endpoints.
///
/// * `GET /graph_data` lists all keys.
/// * `GET /graph_data/<key>[?p=i0,i1,...]` returns the rows of one key.
pub fn route(adapter: &QueryAdapter, req: &Request<()>) -> Response<String> {
    let Some(rest) = req.uri().path().strip_prefix(GRAPH_DATA_PATH) else {
        return error_response(StatusCode::NOT_FOUND);
    };
    let key = match rest {
        "" | "/" => None,
        s => match s.strip_prefix('/') {
            Some(encoded) => match percent_encoding::percent_decode_str(encoded).decode_utf8() {
                Ok(key) => Some(key.into_owned()),
                Err(_) => return error_response(StatusCode::BAD_REQUEST),
            },
            None => return error_response(StatusCode::NOT_FOUND),
        },
    };

    if req.method() != Method::GET {
        let mut rsp = error_response(StatusCode::METHOD_NOT_ALLOWED);
        rsp.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
        return rsp;
    }

    match key {
        None => json_response(StatusCode::OK, json!({ "keys": adapter.list_keys() })),
        Some(key) => {
            let selector = req.uri().query().and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(k, _)| k == "p")
                    .map(|(_, v)| v.into_owned())
            });
            let rows = adapter.query(&key, selector.as_deref());
            let mut body = Map::new();
            body.insert(key, json!(rows));
            json_response(StatusCode::OK, Value::Object(body))
        }
    }
}
