// src/readers/registry.rs

//! A [`Registry`] maps a lower-cased name to a handler class.
//!
//! There is one `Registry` of parser classes ([`ParserRegistry`]) and each
//! parser that supports plugins owns a `Registry` of its plugin classes. A
//! registry is built once, at start of the process, and then only read.
//! A duplicate name is a programmer error; [`Registry::register`] refuses it
//! with [`RegistrationError::DuplicateName`] and the caller stops.
//!
//! Entries keep their registration order. Candidate parsers for a file are
//! tried in that order, see [`Dispatcher`].
//!
//! [`Dispatcher`]: crate::readers::dispatcher::Dispatcher

use crate::readers::dispatcher::FileParser;
use crate::readers::filter::FilterExpression;

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HandlerDescriptor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Describes a parser or a plugin.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HandlerDescriptor {
    /// unique name, e.g. `"syslog"`
    pub name: &'static str,
    /// human readable description of the format, e.g. `"System log (syslog) file"`
    pub data_format: &'static str,
    /// encoding the format is always in, overrides the code page
    pub encoding: Option<&'static str>,
    /// the handler is a parser owning a family of plugins
    pub supports_plugins: bool,
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_format)
    }
}

/// A class of handler that can be registered.
pub trait HandlerClass {
    fn descriptor(&self) -> &HandlerDescriptor;
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum RegistrationError {
    #[error("handler {0:?} is already registered")]
    DuplicateName(String),
    #[error("handler {0:?} is not registered")]
    NotFound(String),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Registration-ordered mapping of lower-cased name to handler class.
pub struct Registry<C> {
    entries: Vec<(String, C)>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Registry {
            entries: Vec::new(),
        }
    }
}

impl<C: HandlerClass> fmt::Debug for Registry<C> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

impl<C: HandlerClass> Registry<C> {
    pub fn new() -> Registry<C> {
        Registry::default()
    }

    fn position(
        &self,
        name: &str,
    ) -> Option<usize> {
        let name: String = name.to_lowercase();

        self.entries
            .iter()
            .position(|(name_, _)| *name_ == name)
    }

    /// Register `class` under its lower-cased descriptor name.
    pub fn register(
        &mut self,
        class: C,
    ) -> Result<(), RegistrationError> {
        let name: String = class.descriptor().name.to_lowercase();
        defñ!("({:?})", name);
        if self.position(&name).is_some() {
            return Err(RegistrationError::DuplicateName(name));
        }
        self.entries.push((name, class));

        Ok(())
    }

    /// Remove and return the class registered as `name`.
    pub fn deregister(
        &mut self,
        name: &str,
    ) -> Result<C, RegistrationError> {
        defñ!("({:?})", name);
        match self.position(name) {
            Some(index) => Ok(self.entries.remove(index).1),
            None => Err(RegistrationError::NotFound(name.to_lowercase())),
        }
    }

    /// The class registered as `name`, any case.
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<&C> {
        self.position(name)
            .map(|index| &self.entries[index].1)
    }

    /// `(name, class)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &C)> {
        self.entries
            .iter()
            .map(|(name, class)| (name.as_str(), class))
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ParserClass
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Creates a parser instance with the passed plugin names enabled.
pub type ParserConstructor = Box<dyn Fn(&[String]) -> Box<dyn FileParser> + Send + Sync>;

/// A registrable parser: its descriptor, the descriptors of the plugins it
/// owns, and a constructor of fresh instances.
pub struct ParserClass {
    descriptor: HandlerDescriptor,
    plugins: Vec<HandlerDescriptor>,
    constructor: ParserConstructor,
}

impl fmt::Debug for ParserClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ParserClass")
            .field("descriptor", &self.descriptor)
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

impl ParserClass {
    /// A parser without plugins.
    pub fn new(
        descriptor: HandlerDescriptor,
        constructor: fn() -> Box<dyn FileParser>,
    ) -> ParserClass {
        ParserClass {
            descriptor,
            plugins: Vec::new(),
            constructor: Box::new(move |_| constructor()),
        }
    }

    /// A parser owning the family of `plugins`.
    pub fn with_plugins(
        descriptor: HandlerDescriptor,
        plugins: Vec<HandlerDescriptor>,
        constructor: ParserConstructor,
    ) -> ParserClass {
        ParserClass {
            descriptor,
            plugins,
            constructor,
        }
    }

    /// Plugin names in the plugin registration order.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins
            .iter()
            .map(|plugin| plugin.name)
            .collect()
    }

    pub fn plugins(&self) -> &[HandlerDescriptor] {
        &self.plugins
    }

    /// A fresh parser instance with `plugins` enabled.
    pub fn create(
        &self,
        plugins: &[String],
    ) -> Box<dyn FileParser> {
        (self.constructor)(plugins)
    }
}

impl HandlerClass for ParserClass {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }
}

/// A parser chosen by a [`FilterExpression`], with its enabled plugins.
#[derive(Debug)]
pub struct ResolvedParser<'r> {
    pub name: String,
    pub class: &'r ParserClass,
    /// enabled plugin names; empty for a parser without plugins
    pub plugins: Vec<String>,
}

impl ResolvedParser<'_> {
    pub fn create(&self) -> Box<dyn FileParser> {
        self.class.create(&self.plugins)
    }
}

impl fmt::Display for ResolvedParser<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        if self.plugins.is_empty() {
            return write!(f, "{}", self.name);
        }

        write!(f, "{}/{{{}}}", self.name, self.plugins.join(","))
    }
}

pub type ParserRegistry = Registry<ParserClass>;

impl Registry<ParserClass> {
    /// The parsers, and their plugins, selected by `filter`, in registration
    /// order.
    ///
    /// * with no includes every parser is a candidate, otherwise only the
    ///   included ones
    /// * a parser excluded as a whole is never a candidate
    /// * plugins are narrowed by plugin-scoped includes then reduced by
    ///   plugin-scoped excludes
    /// * a parser with plugins that ends up with none enabled is dropped
    ///
    /// Names in `filter` that are not registered select nothing.
    pub fn resolve_filter(
        &self,
        filter: &FilterExpression,
    ) -> Vec<ResolvedParser<'_>> {
        defn!("({})", filter);
        let includes = filter.includes();
        let excludes = filter.excludes();
        let mut resolved: Vec<ResolvedParser<'_>> = Vec::with_capacity(self.len());
        for (name, class) in self.iter() {
            let included = includes.get(name);
            if !includes.is_empty() && included.is_none() {
                continue;
            }
            let excluded = excludes.get(name);
            if let Some(excluded) = excluded {
                if excluded.is_empty() {
                    defo!("excluded {:?}", name);
                    continue;
                }
            }
            let mut plugins: Vec<String> = Vec::new();
            if !class.plugins().is_empty() {
                for plugin in class.plugin_names() {
                    let plugin: String = plugin.to_lowercase();
                    if let Some(included) = included {
                        if !included.is_empty() && !included.contains(&plugin) {
                            continue;
                        }
                    }
                    if let Some(excluded) = excluded {
                        if excluded.contains(&plugin) {
                            continue;
                        }
                    }
                    plugins.push(plugin);
                }
                if plugins.is_empty() {
                    defo!("no plugins left for {:?}", name);
                    continue;
                }
            }
            resolved.push(ResolvedParser {
                name: String::from(name),
                class,
                plugins,
            });
        }
        defx!("{} parsers", resolved.len());

        resolved
    }
}
