// src/handler.rs

//! Request-triggered execution, independent of any HTTP stack.
//!
//! The transport layer builds [`Placeholders`] from the inbound request, calls
//! [`CommandHandler::handle`] and writes the returned status code and JSON
//! body.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

use crate::command::Command;
use crate::exec;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_.\-]+)\}").expect("placeholder pattern is valid")
});

/// Values substituted for `{name}` tokens in a handler's arguments.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: HashMap<String, String>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace known tokens in `input`; unknown tokens are kept verbatim.
    pub fn apply(&self, input: &str) -> String {
        PLACEHOLDER
            .replace_all(input, |caps: &Captures<'_>| match self.values.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Substituted copy of `args`.
    pub fn apply_all(&self, args: &[String]) -> Vec<String> {
        args.iter().map(|arg| self.apply(arg)).collect()
    }
}

/// JSON payload returned to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: StatusBody,
}

impl HandlerResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: StatusBody {
                status: Some("success".to_string()),
                error: None,
            },
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: StatusBody {
                status: None,
                error: Some(message.into()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code < 400
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A route-bound command.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    name: String,
    command: Arc<Command>,
}

impl CommandHandler {
    pub fn new(name: impl Into<String>, command: Arc<Command>) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Run the command once for an inbound request.
    ///
    /// Background commands only report whether the process started.
    pub async fn handle(&self, placeholders: &Placeholders) -> HandlerResponse {
        let args = (!placeholders.is_empty())
            .then(|| placeholders.apply_all(self.command.args()));

        debug!(handler = %self.name, "handling request");

        match exec::run(&self.command, args).await {
            Ok(_) => HandlerResponse::success(),
            Err(err) => HandlerResponse::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_placeholders() {
        let placeholders = Placeholders::new()
            .with("branch", "main")
            .with("http.request.host", "example.com");

        assert_eq!(placeholders.apply("deploy-{branch}"), "deploy-main");
        assert_eq!(
            placeholders.apply("{http.request.host}:{branch}"),
            "example.com:main"
        );
    }

    #[test]
    fn leaves_unknown_placeholders_alone() {
        let placeholders = Placeholders::new().with("a", "1");
        assert_eq!(placeholders.apply("{a}{b}{}"), "1{b}{}");
    }

    #[test]
    fn apply_all_copies_the_arguments() {
        let original = vec!["{x}".to_string(), "plain".to_string()];
        let placeholders = Placeholders::new().with("x", "y");

        let substituted = placeholders.apply_all(&original);

        assert_eq!(substituted, vec!["y".to_string(), "plain".to_string()]);
        assert_eq!(original[0], "{x}");
    }

    #[test]
    fn renders_status_payloads() {
        assert_eq!(HandlerResponse::success().to_json(), r#"{"status":"success"}"#);

        let failure = HandlerResponse::failure("boom");
        assert_eq!(failure.status_code, 500);
        assert!(!failure.is_success());
        assert_eq!(failure.to_json(), r#"{"error":"boom"}"#);
    }
}
