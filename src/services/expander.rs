//! Suite expansion into run units.

use std::iter::Enumerate;
use std::sync::Arc;
use std::vec;

use crate::error::UnitError;
use crate::models::{LoadedSuite, Payload, RunUnit, SuiteInfo, UnitPayload};

/// A suite that cannot be expanded.
#[derive(Debug)]
pub struct InvalidSuite {
    pub suite: Arc<SuiteInfo>,
    pub error: UnitError,
}

/// Units of one suite, produced one at a time in declaration order.
#[derive(Debug)]
pub struct RunUnits<R> {
    suite: Arc<SuiteInfo>,
    entries: Enumerate<vec::IntoIter<UnitPayload<R>>>,
}

impl<R> RunUnits<R> {
    pub fn suite(&self) -> &Arc<SuiteInfo> {
        &self.suite
    }
}

impl<R> Iterator for RunUnits<R> {
    type Item = RunUnit<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, payload) = self.entries.next()?;
        Some(RunUnit {
            suite: Arc::clone(&self.suite),
            payload,
            position: index + 1,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Expand a suite into one unit per payload entry.
pub fn expand_suite<R>(suite: LoadedSuite<R>) -> Result<RunUnits<R>, InvalidSuite> {
    let info = Arc::new(suite.info);
    let payloads = match suite.payload {
        Some(Payload::List(payloads)) => payloads,
        Some(Payload::Single(payload)) => vec![payload],
        None => {
            let error = UnitError::MissingPayload(info.name.clone());
            return Err(InvalidSuite { suite: info, error });
        }
    };

    Ok(RunUnits {
        suite: info,
        entries: payloads.into_iter().enumerate(),
    })
}
