//! In-memory state store used by workflow tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{Error, StateStore};
use crate::deployer::DeploymentRecord;

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    current: Mutex<Option<DeploymentRecord>>,
    pub save_count: AtomicUsize,
    pub clear_count: AtomicUsize,
}

impl MemoryStateStore {
    pub fn current(&self) -> Option<DeploymentRecord> {
        self.current.lock().expect("state lock").clone()
    }

    pub fn saves(&self) -> usize { self.save_count.load(Ordering::SeqCst) }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<DeploymentRecord>, Error> { Ok(self.current()) }

    fn save(&self, record: &DeploymentRecord) -> Result<(), Error> {
        *self.current.lock().expect("state lock") = Some(record.clone());
        let _count = self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.current.lock().expect("state lock") = None;
        let _count = self.clear_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
