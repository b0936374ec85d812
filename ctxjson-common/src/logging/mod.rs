// Logging utilities for the ctxjson serializer
//
// This module provides a small structured logging layer on top of `log`:
// - Component-based prefixes (Marshaler, Selector, Resolver, ...)
// - Marshal-context tracking through logger inheritance
// - Record path tracing for nested and promoted fields
// - An `env_logger` backed configuration for binaries and tests

use log::Level;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Arguments, Display, Formatter};

/// Predefined components for logging categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Marshaler,
    Selector,
    Resolver,
    Encoder,
    Custom(&'static str),
}

impl Component {
    /// Get the string representation of the component
    pub fn as_str(&self) -> &str {
        match self {
            Component::Marshaler => "Marshaler",
            Component::Selector => "Selector",
            Component::Resolver => "Resolver",
            Component::Encoder => "Encoder",
            Component::Custom(name) => name,
        }
    }
}

// Display helpers so the `*_args` methods never allocate a prefix String
struct ComponentPrefixDisplay {
    parent: Option<Component>,
    component: Component,
}

impl Display for ComponentPrefixDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.parent {
            Some(parent) if parent != Component::Marshaler => {
                write!(f, "{}.{}", parent.as_str(), self.component.as_str())
            }
            _ => write!(f, "{}", self.component.as_str()),
        }
    }
}

// Full bracketed prefix of a non-root logger: `Selector.Resolver|path=Person.address`
struct LoggerPrefix<'a>(&'a Logger);

impl Display for LoggerPrefix<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let logger = self.0;
        ComponentPrefixDisplay {
            parent: logger.parent_component,
            component: logger.component,
        }
        .fmt(f)?;
        if let Some(path) = logger.record_path() {
            write!(f, "|path={path}")?;
        }
        Ok(())
    }
}

/// A component-specific logger carrying the active marshal context
#[derive(Clone, Debug)]
pub struct Logger {
    /// Component this logger is for
    component: Component,
    /// Marshal context the messages belong to
    context: String,
    /// Parent component for hierarchical logging (if any)
    parent_component: Option<Component>,
    /// Dotted path of the record currently being traversed
    record_path: Option<String>,
}

impl Logger {
    /// Create a new root logger for a component and a marshal context.
    /// Only the entry point of a marshal call should create roots.
    pub fn new_root(component: Component, context: &str) -> Self {
        Self {
            component,
            context: context.to_string(),
            parent_component: None,
            record_path: None,
        }
    }

    /// Create a child logger with the same context but a different component
    pub fn with_component(&self, component: Component) -> Self {
        Self {
            component,
            context: self.context.clone(),
            parent_component: Some(self.component),
            record_path: self.record_path.clone(),
        }
    }

    /// Create a logger scoped to a record path, e.g. `Person.address`
    pub fn with_record_path(&self, path: impl Into<String>) -> Self {
        Self {
            component: self.component,
            context: self.context.clone(),
            parent_component: self.parent_component,
            record_path: Some(path.into()),
        }
    }

    /// The marshal context this logger reports
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The record path if one was set
    pub fn record_path(&self) -> Option<&str> {
        self.record_path.as_deref()
    }

    fn is_root(&self) -> bool {
        self.component == Component::Marshaler && self.parent_component.is_none()
    }

    fn log_args(&self, level: Level, args: Arguments) {
        if !log::log_enabled!(level) {
            return;
        }
        // The root marshaler carries no component prefix
        if self.is_root() && self.record_path.is_none() {
            log::log!(level, "[ctx={}] {}", self.context, args);
        } else {
            log::log!(level, "[ctx={}][{}] {}", self.context, LoggerPrefix(self), args);
        }
    }

    /// Log a debug message using fmt::Arguments (avoids allocating a message String)
    pub fn debug_args(&self, args: Arguments) {
        self.log_args(Level::Debug, args);
    }

    /// Log a warning using fmt::Arguments
    pub fn warn_args(&self, args: Arguments) {
        self.log_args(Level::Warn, args);
    }
}

/// Log levels accepted by [`LoggingConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Logging configuration applied through `env_logger`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used for every module
    pub default_level: LogLevel,
    /// Route output through the test harness capture
    pub test_mode: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            test_mode: false,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Install the global logger. Calling this more than once is harmless:
    /// the first installation wins.
    pub fn apply(&self) {
        let _ = env_logger::builder()
            .is_test(self.test_mode)
            .filter_level(self.default_level.to_level_filter())
            .try_init();
    }
}
