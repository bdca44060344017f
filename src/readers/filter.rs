// src/readers/filter.rs

//! A [`FilterExpression`] selects parsers and plugins, e.g.
//! `"linux,!text/syslog"`.
//!
//! ## Grammar
//!
//! * tokens are separated by `,`; whitespace around a token is ignored and
//!   names are lower-cased
//! * `name` includes the parser `name`
//! * `!name` excludes it
//! * `name/plugin` scopes the include or exclude to one plugin of parser
//!   `name`
//! * a `name` that is a [`Presets`] name is replaced by the tokens of the
//!   preset
//!
//! ## Reduction
//!
//! After presets are expanded the includes and excludes are reduced so an
//! exclude never removes something explicitly included. Reduction only ever
//! removes excludes. A reduced expression printed by its [`Display`] and
//! parsed again is the same expression.
//!
//! [`Display`]: std::fmt::Display

use crate::common::CHAIN_SEP;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Plugin names of one parser. Empty means the whole parser.
pub type PluginNames = BTreeSet<String>;

/// Parser name to [`PluginNames`].
pub type FilterMap = BTreeMap<String, PluginNames>;

/// Named bundles of filter tokens, e.g. `linux` is
/// `text/syslog,jsonl/docker_container_log`. A preset may name other presets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Presets {
    presets: BTreeMap<String, Vec<String>>,
}

impl Presets {
    pub fn new() -> Presets {
        Presets::default()
    }

    /// Add (or replace) preset `name` as `tokens`.
    pub fn add(
        &mut self,
        name: &str,
        tokens: &[&str],
    ) {
        self.presets.insert(
            name.trim().to_lowercase(),
            tokens
                .iter()
                .map(|token| token.trim().to_lowercase())
                .collect(),
        );
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.presets
            .contains_key(&name.trim().to_lowercase())
    }

    /// The tokens of preset `name`. An unknown preset is an empty set.
    pub fn tokens(
        &self,
        name: &str,
    ) -> &[String] {
        match self.presets.get(&name.trim().to_lowercase()) {
            Some(tokens) => tokens.as_slice(),
            None => &[],
        }
    }

    /// Preset names and their tokens, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.presets
            .iter()
            .map(|(name, tokens)| (name.as_str(), tokens.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Parsed and reduced include and exclude sets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterExpression {
    includes: FilterMap,
    excludes: FilterMap,
}

impl FilterExpression {
    /// An expression that selects every parser.
    pub fn all() -> FilterExpression {
        FilterExpression::default()
    }

    /// Parse `expression`, expanding `presets`, then reduce.
    pub fn parse(
        expression: &str,
        presets: &Presets,
    ) -> FilterExpression {
        defn!("({:?})", expression);
        let mut filter = FilterExpression::default();
        let mut expanding: Vec<String> = Vec::new();
        for token in expression.split(',') {
            filter.add_token(token, false, presets, &mut expanding);
        }
        filter.reduce();
        defx!("{}", filter);

        filter
    }

    fn add_token(
        &mut self,
        token: &str,
        negate: bool,
        presets: &Presets,
        expanding: &mut Vec<String>,
    ) {
        let token: String = token.trim().to_lowercase();
        let (exclude, name): (bool, &str) = match token.strip_prefix('!') {
            Some(rest) => (!negate, rest.trim()),
            None => (negate, token.as_str()),
        };
        if name.is_empty() {
            return;
        }
        let (parser, plugin): (&str, Option<&str>) = match name.split_once(CHAIN_SEP) {
            Some((parser, plugin)) => (parser.trim(), Some(plugin.trim())),
            None => (name, None),
        };
        if plugin.is_none() && presets.contains(parser) {
            // a preset naming itself, directly or not, expands once
            if expanding.iter().any(|p| p == parser) {
                defo!("preset {:?} already expanding", parser);
                return;
            }
            expanding.push(String::from(parser));
            for token_ in presets.tokens(parser) {
                self.add_token(token_, exclude, presets, expanding);
            }
            expanding.pop();
            return;
        }
        if parser.is_empty() {
            return;
        }
        let map: &mut FilterMap = match exclude {
            true => &mut self.excludes,
            false => &mut self.includes,
        };
        match plugin {
            None | Some("") => {
                // whole parser
                map.insert(String::from(parser), PluginNames::new());
            }
            Some(plugin) => match map.get_mut(parser) {
                // already the whole parser
                Some(plugins) if plugins.is_empty() => {}
                Some(plugins) => {
                    plugins.insert(String::from(plugin));
                }
                None => {
                    map.insert(String::from(parser), PluginNames::from([String::from(plugin)]));
                }
            },
        }
    }

    /// Remove excludes that would remove something explicitly included, and
    /// excludes that cannot remove anything.
    fn reduce(&mut self) {
        let includes: &FilterMap = &self.includes;
        let include_all: bool = includes.is_empty();
        self.excludes.retain(|parser, excluded| {
            match includes.get(parser) {
                // only included parsers are candidates anyway
                None => include_all,
                // the whole parser is included, so only a plugin-scoped
                // exclude remains meaningful
                Some(included) if included.is_empty() => !excluded.is_empty(),
                // specific plugins are included; only those run, and an
                // exclude may not remove them
                Some(_) => false,
            }
        });
    }

    pub fn includes(&self) -> &FilterMap {
        &self.includes
    }

    pub fn excludes(&self) -> &FilterMap {
        &self.excludes
    }

    /// Selects everything.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

fn fmt_map(
    f: &mut fmt::Formatter,
    map: &FilterMap,
    prefix: &str,
    first: &mut bool,
) -> fmt::Result {
    for (parser, plugins) in map.iter() {
        if plugins.is_empty() {
            if !*first {
                write!(f, ",")?;
            }
            write!(f, "{}{}", prefix, parser)?;
            *first = false;
            continue;
        }
        for plugin in plugins.iter() {
            if !*first {
                write!(f, ",")?;
            }
            write!(f, "{}{}{}{}", prefix, parser, CHAIN_SEP, plugin)?;
            *first = false;
        }
    }

    Ok(())
}

/// Canonical form: includes then excludes, each ordered by name.
impl fmt::Display for FilterExpression {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        let mut first: bool = true;
        fmt_map(f, &self.includes, "", &mut first)?;
        fmt_map(f, &self.excludes, "!", &mut first)
    }
}
