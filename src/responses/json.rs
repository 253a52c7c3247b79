use crate::errors::ServerError;
use crate::responses::download::attachment;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use serde::Serialize;

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, ServerError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ServerError::BadRequest(format!("Could not encode JSON: {e}")))
}

pub fn json_response<T: Serialize + ?Sized>(value: &T) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(encode(value)?))
        .map_err(|_| ServerError::InternalError)
}

pub fn json_download<T: Serialize + ?Sized>(value: &T, filename: &str) -> ResultResp {
    attachment(encode(value)?, mime::APPLICATION_JSON.as_ref(), filename)
}
