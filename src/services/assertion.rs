//! Assertion engine: run a unit's callback and expectations against its response.
//!
//! Both checks must pass. They run concurrently on the same task, and the
//! first failure ends the unit.

use futures_util::StreamExt;
use futures_util::future::try_join;

use crate::error::{AssertionError, UnitError};
use crate::models::{Callback, Expectation, ResponseBody};

/// Verify a response against a unit's expectation and callback.
pub async fn run_assert<R: ResponseBody>(
    response: R,
    expect: Expectation<R>,
    callback: Option<Callback<R>>,
) -> Result<(), UnitError> {
    try_join(
        expect_callback(&response, callback),
        expect_response(&response, expect),
    )
    .await?;
    Ok(())
}

/// Invoke the callback; an asynchronous callback passes only when its future completes with `Ok`.
pub async fn expect_callback<R: ResponseBody>(
    response: &R,
    callback: Option<Callback<R>>,
) -> Result<(), UnitError> {
    match callback {
        None => Ok(()),
        Some(Callback::Invalid(value)) => Err(UnitError::CallbackNotCallable(value)),
        Some(Callback::Sync(f)) => f(response).map_err(UnitError::Callback),
        Some(Callback::Async(f)) => f(response.clone()).await.map_err(UnitError::Callback),
    }
}

/// Compare the response with every expected value, in order.
pub async fn expect_response<R: ResponseBody>(
    response: &R,
    expect: Expectation<R>,
) -> Result<(), UnitError> {
    match expect {
        Expectation::Absent => Ok(()),
        Expectation::Value(expected) => Ok(expect_value(response, &expected)?),
        Expectation::Stream(mut expected) => {
            while let Some(item) = expected.next().await {
                let value = item.map_err(UnitError::ExpectStream)?;
                expect_value(response, &value)?;
            }
            Ok(())
        }
    }
}

/// Strict deep equality.
pub fn expect_value<R: ResponseBody>(actual: &R, expected: &R) -> Result<(), AssertionError> {
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionError::mismatch(expected, actual))
    }
}
