//! Unit payload model: one request plus the checks applied to its response.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use crate::error::BoxError;

/// Response value handed to assertions.
///
/// The runner never inspects responses beyond equality and plucking, so any
/// transport output type can be used as long as it provides both.
pub trait ResponseBody: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Extract the nested value at `path`.
    fn pluck(&self, path: &[String]) -> Self;
}

impl ResponseBody for Value {
    /// Object keys and array indices are followed in order. A missing segment yields `null`.
    fn pluck(&self, path: &[String]) -> Self {
        let mut current = self;
        for key in path {
            let next = match current {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }
}

/// Transport-specific request options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestArgs {
    /// Overrides the suite method
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Merged over the configured cookies
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// Request body source.
pub enum RequestData {
    Value(Value),
    /// The first emission is sent.
    Stream(BoxStream<'static, Result<Value, BoxError>>),
}

impl fmt::Debug for RequestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Expected response, either once or as an asynchronous sequence.
pub enum Expectation<R> {
    /// No comparison is required.
    Absent,
    Value(R),
    /// Every emitted value must match, in emission order.
    Stream(BoxStream<'static, Result<R, BoxError>>),
}

impl<R> Default for Expectation<R> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<R: fmt::Debug> fmt::Debug for Expectation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

type SyncCallback<R> = Arc<dyn Fn(&R) -> Result<(), BoxError> + Send + Sync>;
type AsyncCallback<R> = Arc<dyn Fn(R) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Verification function run against the response.
pub enum Callback<R> {
    Sync(SyncCallback<R>),
    /// Success is decided when the returned future completes.
    Async(AsyncCallback<R>),
    /// A callback slot holding a value that cannot be invoked, e.g. from a data file.
    Invalid(String),
}

impl<R: 'static> Callback<R> {
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&R) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Self::Async(Arc::new(move |response: R| f(response).boxed()))
    }
}

impl<R> fmt::Debug for Callback<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync(..)"),
            Self::Async(_) => f.write_str("Async(..)"),
            Self::Invalid(value) => f.debug_tuple("Invalid").field(value).finish(),
        }
    }
}

/// One request and its checks.
#[derive(Debug)]
pub struct UnitPayload<R = Value> {
    /// Falls back to the 1-based position when absent
    pub name: Option<String>,
    pub args: RequestArgs,
    pub data: Option<RequestData>,
    pub expect: Expectation<R>,
    pub callback: Option<Callback<R>>,
    /// Path into the response extracted before assertion
    pub resp_pluck: Option<Vec<String>>,
}

impl<R> Default for UnitPayload<R> {
    fn default() -> Self {
        UnitPayload {
            name: None,
            args: RequestArgs::default(),
            data: None,
            expect: Expectation::Absent,
            callback: None,
            resp_pluck: None,
        }
    }
}

impl<R: Send + 'static> UnitPayload<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_args(mut self, args: RequestArgs) -> Self {
        self.args = args;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(RequestData::Value(data));
        self
    }

    pub fn with_data_stream<S>(mut self, data: S) -> Self
    where
        S: Stream<Item = Result<Value, BoxError>> + Send + 'static,
    {
        self.data = Some(RequestData::Stream(data.boxed()));
        self
    }

    pub fn with_expect(mut self, expect: R) -> Self {
        self.expect = Expectation::Value(expect);
        self
    }

    pub fn with_expect_stream<S>(mut self, expect: S) -> Self
    where
        S: Stream<Item = Result<R, BoxError>> + Send + 'static,
    {
        self.expect = Expectation::Stream(expect.boxed());
        self
    }

    pub fn with_callback(mut self, callback: Callback<R>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_pluck<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resp_pluck = Some(path.into_iter().map(Into::into).collect());
        self
    }
}
