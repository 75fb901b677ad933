use axum::body;
use axum::response::Response;
use serde::de::DeserializeOwned;

/// Reads the whole body of [response] and parses it as JSON into `T`. Panics with the raw
/// body on failure so the test output shows what came back.
pub async fn deserialize_body<T: DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!("response body was not the expected JSON ({err}): {bytes:?}")
    })
}

/// Pulls the `error_code` out of an error response
pub async fn error_code(response: Response) -> String {
    let body: serde_json::Value = deserialize_body(response).await;
    body["error_code"]
        .as_str()
        .unwrap_or_else(|| panic!("response had no error code: {body}"))
        .to_owned()
}
