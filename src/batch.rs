//! Processing of many independent signals in parallel.
//!
//! Each job builds its own engine instance, so jobs share no state and the
//! result of a job is the same as running it alone.

use rayon::prelude::*;

use crate::common::Sample;
use crate::config::EngineConfig;
use crate::driver::StreamingDriver;
use crate::error::Result;

/// One signal to process with a freshly built engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub desired: Vec<Sample>,
    /// Required by reference based engines, ignored otherwise.
    pub reference: Option<Vec<Sample>>,
    pub config: EngineConfig,
}

impl BatchJob {
    pub fn with_reference(desired: Vec<Sample>, reference: Vec<Sample>, config: EngineConfig) -> Self {
        BatchJob {
            desired,
            reference: Some(reference),
            config,
        }
    }

    pub fn single(input: Vec<Sample>, config: EngineConfig) -> Self {
        BatchJob {
            desired: input,
            reference: None,
            config,
        }
    }

    pub fn run(&self, driver: &StreamingDriver) -> Result<Vec<Sample>> {
        let mut engine = self.config.build()?;
        match &self.reference {
            Some(reference) => driver.run(&self.desired, reference, &mut engine),
            None => driver.run_single(&self.desired, &mut engine),
        }
    }
}

/// Runs all `jobs` on the rayon thread pool. Results are in job order and a
/// failing job does not affect the others.
pub fn run_batch(jobs: &[BatchJob]) -> Vec<Result<Vec<Sample>>> {
    run_batch_with(jobs, &StreamingDriver::new())
}

/// Like [`run_batch`], using `driver` for every job. A cancel flag on the
/// driver cancels all jobs still running.
pub fn run_batch_with(jobs: &[BatchJob], driver: &StreamingDriver) -> Vec<Result<Vec<Sample>>> {
    log::debug!("Running batch of {} jobs", jobs.len());
    jobs.par_iter().map(|job| job.run(driver)).collect()
}
