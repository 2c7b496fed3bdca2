// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HookexecError, Result};
use crate::types::LifecycleEvent;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HookexecError;

    fn try_from(mut raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_commands(&raw)?;
        validate_handlers(&raw)?;
        apply_startup_default(&mut raw);
        Ok(ConfigFile::new_unchecked(raw.commands, raw.handler))
    }
}

fn ensure_has_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.commands.is_empty() && cfg.handler.is_empty() {
        return Err(HookexecError::config(
            "config must contain at least one [[command]] or [handler.<name>] section",
        ));
    }
    Ok(())
}

/// A command is either lifecycle-bound or request-triggered, never both.
fn validate_handlers(cfg: &RawConfigFile) -> Result<()> {
    for (name, handler) in cfg.handler.iter() {
        if !handler.at.is_empty() {
            return Err(HookexecError::config(format!(
                "handler '{name}' cannot be bound to startup or shutdown"
            )));
        }
    }
    Ok(())
}

/// `[[command]]` entries are not bound to a route, so they run at startup
/// unless told otherwise.
fn apply_startup_default(cfg: &mut RawConfigFile) {
    for cmd in cfg.commands.iter_mut() {
        if cmd.at.is_empty() {
            cmd.at.push(LifecycleEvent::Startup.as_str().to_string());
        }
    }
}
