//! Request dispatch: build one request per unit and issue it.

use futures_util::StreamExt;
use serde_json::Value;

use crate::config::RunnerConfig;
use crate::error::UnitError;
use crate::models::{RequestArgs, RequestData, ResponseBody, SuiteInfo};
use crate::services::transport::{Transport, UnitRequest};

/// Resolve the request body. A stream contributes its first emission.
pub async fn resolve_body(data: Option<RequestData>) -> Result<Option<Value>, UnitError> {
    match data {
        None => Ok(None),
        Some(RequestData::Value(Value::Null)) => Ok(None),
        Some(RequestData::Value(value)) => Ok(Some(value)),
        Some(RequestData::Stream(mut stream)) => match stream.next().await {
            Some(Ok(value)) if value.is_null() => Ok(None),
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(e)) => Err(UnitError::RequestData(e.to_string())),
            None => Err(UnitError::RequestData(
                "data stream completed without a value".to_string(),
            )),
        },
    }
}

/// Build the request for a unit from its suite, its args and the configuration.
pub fn build_request(
    suite: &SuiteInfo,
    args: RequestArgs,
    body: Option<Value>,
    config: &RunnerConfig,
) -> UnitRequest {
    let RequestArgs {
        method,
        headers,
        cookies: unit_cookies,
        query,
    } = args;

    let mut cookies = config.cookies.clone().unwrap_or_default();
    cookies.extend(unit_cookies);

    UnitRequest {
        url: config.request_url(&suite.url),
        method: method.unwrap_or_else(|| suite.method.clone()),
        headers,
        cookies,
        query,
        body,
        timeout: suite.timeout,
    }
}

/// Issue the unit's HTTP call and pluck the response when a path is given.
pub async fn send_request<R, T>(
    transport: &T,
    suite: &SuiteInfo,
    config: &RunnerConfig,
    args: RequestArgs,
    data: Option<RequestData>,
    resp_pluck: Option<&[String]>,
) -> Result<R, UnitError>
where
    R: ResponseBody,
    T: Transport<R> + ?Sized,
{
    let body = resolve_body(data).await?;
    let request = build_request(suite, args, body, config);
    let response = transport.send(request).await?;

    Ok(match resp_pluck {
        Some(path) => response.pluck(path),
        None => response,
    })
}
