use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use hookexec::errors::RunError;
use hookexec::lifecycle::Runner;

/// A fake lifecycle runner that:
/// - records its name in a shared log when run
/// - succeeds, or fails with a start error when built with `failing`.
pub struct FakeRunner {
    name: String,
    fail: bool,
    executed: Arc<Mutex<Vec<String>>>,
}

impl FakeRunner {
    pub fn new(name: &str, executed: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: false,
            executed,
        })
    }

    pub fn failing(name: &str, executed: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: true,
            executed,
        })
    }
}

impl Runner for FakeRunner {
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>> {
        Box::pin(async move {
            {
                let mut guard = self.executed.lock().unwrap();
                guard.push(self.name.clone());
            }

            if self.fail {
                return Err(RunError::Start {
                    program: self.name.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "fake failure"),
                });
            }
            Ok(())
        })
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
