use std::fmt;
use std::str::FromStr;

/// A named point in the host's life at which bound commands run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleEvent {
    Startup,
    Shutdown,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Startup => "startup",
            LifecycleEvent::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "startup" => Ok(LifecycleEvent::Startup),
            "shutdown" => Ok(LifecycleEvent::Shutdown),
            _ => Err("at can only contain startup or shutdown".to_string()),
        }
    }
}
