//! Test runner: discovery, run-status resolution and strictly sequential unit execution.
//!
//! Loading is the only concurrent phase. Once the whole batch is loaded and
//! resolved, suites are expanded and units run one after another: a unit's
//! request and assertions complete before the next unit is produced.

use std::marker::PhantomData;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, future};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::ConfigHandle;
use crate::error::{RunError, RunResult, TransportError, UnitError};
use crate::models::{
    LoadedSuite, ResponseBody, RunStatus, RunUnit, SuiteInfo, TestResult, UnitPayload,
};
use crate::services::aggregator::{UnitTiming, handle_result};
use crate::services::discovery::load_dir_or_file;
use crate::services::expander::{InvalidSuite, expand_suite};
use crate::services::loader::{FileSuiteSource, SuiteSource};
use crate::services::transport::{ReqwestTransport, Transport};
use crate::services::{assertion, dispatcher};

/// Runs suites from a suite source against a transport.
pub struct Runner<R, S, T> {
    source: S,
    transport: T,
    config: ConfigHandle,
    _response: PhantomData<fn() -> R>,
}

/// Runner for JSON suite files over HTTP.
pub type HttpRunner<S = FileSuiteSource> = Runner<Value, S, ReqwestTransport>;

impl HttpRunner {
    /// Runner reading JSON suite files and sending requests with reqwest.
    pub fn http(config: ConfigHandle) -> Result<Self, TransportError> {
        Ok(Runner::new(
            FileSuiteSource::new(),
            ReqwestTransport::new()?,
            config,
        ))
    }
}

impl<R, S, T> Runner<R, S, T>
where
    R: ResponseBody,
    S: SuiteSource<R>,
    T: Transport<R>,
{
    pub fn new(source: S, transport: T, config: ConfigHandle) -> Self {
        Runner {
            source,
            transport,
            config,
            _response: PhantomData,
        }
    }

    /// Configuration handle read at discovery and dispatch time.
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a suite file or every suite under a directory.
    ///
    /// Yields one result per unit in execution order. Discovery and load
    /// failures end the stream with a single error and no results.
    pub fn start(&self, root: impl AsRef<Path>) -> BoxStream<'_, RunResult<TestResult>> {
        let root = root.as_ref().to_path_buf();

        stream::once(async move {
            let load_concurrent = self.config.get().load_concurrent;
            info!("Starting run from {}", root.display());
            load_dir_or_file(&self.source, &root, load_concurrent).await
        })
        .flat_map(move |loaded| match loaded {
            Ok(suites) => stream::iter(suites)
                .flat_map(move |suite| self.start_suite(suite))
                .map(Ok::<_, RunError>)
                .left_stream(),
            Err(e) => {
                error!("Suite discovery failed: {}", e);
                stream::once(future::ready(Err(e))).right_stream()
            }
        })
        .boxed()
    }

    /// Run the units of one suite in declaration order.
    ///
    /// A skipped suite reports every unit as skipped, even when it has no
    /// payload or fails validation. With `bail` set, no further units are
    /// produced after the first failure.
    pub fn start_suite(&self, suite: LoadedSuite<R>) -> BoxStream<'_, TestResult> {
        let units = match expand_suite(suite) {
            Ok(units) => units,
            Err(InvalidSuite { suite, error }) => {
                // Skipped suites are never checked
                let error = if suite.run_status == RunStatus::Skip {
                    debug!("Skipping suite '{}'", suite.name);
                    None
                } else {
                    warn!("Suite '{}' cannot run: {}", suite.name, error);
                    Some(error)
                };
                let timing = UnitTiming {
                    start_time: Utc::now(),
                    duration_ms: 0,
                };
                let result = handle_result(&suite, "1", error, timing);
                return stream::once(future::ready(result)).boxed();
            }
        };

        let bail = units.suite().bail;
        debug!(
            "Running suite '{}' ({} units)",
            units.suite().name,
            units.size_hint().0
        );

        stream::unfold((units, false), move |(mut units, halted)| async move {
            if halted {
                return None;
            }
            let unit = units.next()?;
            let result = self.start_unit(unit).await;
            let halt = bail && result.is_failed();
            if halt && units.size_hint().0 > 0 {
                warn!(
                    "Suite '{}' bailed after unit '{}' failed",
                    result.suite_name, result.unit_name
                );
            }
            Some((result, (units, halt)))
        })
        .boxed()
    }

    /// Run one unit: dispatch, assert and report. Never fails.
    ///
    /// Units of a skipped suite report `skipped` without touching the transport.
    pub async fn start_unit(&self, unit: RunUnit<R>) -> TestResult {
        let start_time = Utc::now();
        let clock = Instant::now();
        let unit_name = unit.unit_name();
        let RunUnit { suite, payload, .. } = unit;

        let error = if suite.run_status == RunStatus::Skip {
            debug!("Skipping unit '{}' of suite '{}'", unit_name, suite.name);
            None
        } else {
            self.execute(&suite, payload).await.err()
        };

        match error {
            Some(ref e) => warn!("Unit '{}' of suite '{}' failed: {}", unit_name, suite.name, e),
            None => debug!("Unit '{}' of suite '{}' finished", unit_name, suite.name),
        }

        let timing = UnitTiming {
            start_time,
            duration_ms: clock.elapsed().as_millis() as i64,
        };
        handle_result(&suite, &unit_name, error, timing)
    }

    async fn execute(&self, suite: &SuiteInfo, payload: UnitPayload<R>) -> Result<(), UnitError> {
        validate(suite)?;

        let UnitPayload {
            args,
            data,
            expect,
            callback,
            resp_pluck,
            ..
        } = payload;

        let config = self.config.get();
        let response = dispatcher::send_request(
            &self.transport,
            suite,
            &config,
            args,
            data,
            resp_pluck.as_deref(),
        )
        .await?;

        assertion::run_assert(response, expect, callback).await
    }
}

fn validate(suite: &SuiteInfo) -> Result<(), UnitError> {
    if suite.name.trim().is_empty() {
        return Err(UnitError::Validation("suite name is required".to_string()));
    }
    if suite.url.trim().is_empty() {
        return Err(UnitError::Validation(format!(
            "url is required for suite '{}'",
            suite.name
        )));
    }
    Ok(())
}
