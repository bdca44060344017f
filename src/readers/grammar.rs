// src/readers/grammar.rs

//! Line grammars and their combined alternation, [`CombinedGrammar`].
//!
//! A text plugin declares an ordered list of [`LineGrammar`]s, each a key and
//! a regular expression with named capture groups. The list is compiled once,
//! per plugin instance, into a `CombinedGrammar`. Scanning a buffer of text
//! returns the match that starts earliest and, of those, ends last. The key of
//! the matching alternative tags the match.
//!
//! Several grammars may overlap on a prefix, e.g. a plain line grammar and a
//! grammar for the same line with a trailing repeat count. Longest match
//! keeps the more specific one.

use crate::common::FileOffset;

use std::collections::BTreeMap;
use std::fmt;

use ::regex::{Regex, RegexSet};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::thiserror::Error;

/// A named line grammar. `pattern` is a [`regex`] pattern; its named
/// capture groups become the fields of a [`ParseRecord`].
///
/// [`regex`]: https://docs.rs/regex/1.11.1/regex/
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineGrammar {
    pub key: &'static str,
    pub pattern: &'static str,
}

/// Ordered list of line grammars.
pub type LineGrammars = &'static [LineGrammar];

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("line grammar {key:?} is invalid: {source}")]
    Invalid {
        key: String,
        #[source]
        source: ::regex::Error,
    },
    #[error("combined grammar is invalid: {0}")]
    InvalidSet(#[source] ::regex::Error),
    #[error("line grammar {0:?} is declared more than once")]
    DuplicateKey(String),
    #[error("no line grammars")]
    Empty,
    #[error("line grammars {0:?} matched the same text")]
    AmbiguousKey(Vec<String>),
}

/// Fields of a match, capture group name to captured text.
pub type Fields = BTreeMap<String, String>;

/// One grammar match, relative to the scanned text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrammarMatch<'g> {
    pub key: &'g str,
    /// byte index of the match start in the scanned text
    pub start: usize,
    /// byte index one past the match end in the scanned text
    pub end: usize,
    pub fields: Fields,
}

/// The result of one grammar match, placed in the file.
///
/// `start_offset` and `end_offset` are absolute byte offsets in the file,
/// `end_offset` is one past the last byte.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseRecord {
    pub key: String,
    pub fields: Fields,
    pub start_offset: FileOffset,
    pub end_offset: FileOffset,
}

impl ParseRecord {
    /// Field `name`. Capture groups that did not participate in the match
    /// are absent.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
    }
}

impl fmt::Display for ParseRecord {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}@[{}, {})", self.key, self.start_offset, self.end_offset)
    }
}

/// The compiled alternation of an ordered list of [`LineGrammar`]s.
///
/// The `RegexSet` answers "which alternatives match anywhere" in one pass;
/// only those alternatives are then searched for their position.
pub struct CombinedGrammar {
    set: RegexSet,
    grammars: Vec<(&'static str, Regex)>,
}

impl fmt::Debug for CombinedGrammar {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("CombinedGrammar")
            .field("keys", &self.keys())
            .finish()
    }
}

impl CombinedGrammar {
    pub fn new(line_grammars: &[LineGrammar]) -> Result<CombinedGrammar, GrammarError> {
        defn!("({} grammars)", line_grammars.len());
        if line_grammars.is_empty() {
            return Err(GrammarError::Empty);
        }
        let mut grammars: Vec<(&'static str, Regex)> = Vec::with_capacity(line_grammars.len());
        for line_grammar in line_grammars.iter() {
            if grammars
                .iter()
                .any(|(key, _)| *key == line_grammar.key)
            {
                return Err(GrammarError::DuplicateKey(String::from(line_grammar.key)));
            }
            let regex = match Regex::new(line_grammar.pattern) {
                Ok(val) => val,
                Err(err) => {
                    return Err(GrammarError::Invalid {
                        key: String::from(line_grammar.key),
                        source: err,
                    });
                }
            };
            grammars.push((line_grammar.key, regex));
        }
        let set = RegexSet::new(line_grammars.iter().map(|g| g.pattern)).map_err(GrammarError::InvalidSet)?;
        defx!();

        Ok(CombinedGrammar { set, grammars })
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.grammars
            .iter()
            .map(|(key, _)| *key)
            .collect()
    }

    /// Find the earliest match in `text`; of matches starting at the same
    /// index the longest wins.
    ///
    /// Returns `Ok(None)` if nothing matches. Two different alternatives
    /// matching the very same span is `GrammarError::AmbiguousKey`; the tie is
    /// not given to the first declared alternative. Keys select how a record
    /// is interpreted, so overlapping grammars are a defect of the plugin and
    /// the text engine reports the line as a failure.
    pub fn scan(
        &self,
        text: &str,
    ) -> Result<Option<GrammarMatch<'_>>, GrammarError> {
        let matched = self.set.matches(text);
        if !matched.matched_any() {
            return Ok(None);
        }
        // (index into `self.grammars`, start, end)
        let mut best: Option<(usize, usize, usize)> = None;
        let mut tied: Vec<usize> = Vec::new();
        for index in matched.iter() {
            let regex = &self.grammars[index].1;
            let m = match regex.find(text) {
                Some(m) => m,
                None => continue,
            };
            match best {
                None => {
                    best = Some((index, m.start(), m.end()));
                    tied.clear();
                }
                Some((_, start, end)) => {
                    if m.start() < start || (m.start() == start && m.end() > end) {
                        best = Some((index, m.start(), m.end()));
                        tied.clear();
                    } else if m.start() == start && m.end() == end {
                        tied.push(index);
                    }
                }
            }
        }
        let (index, start, _end) = match best {
            Some(val) => val,
            None => return Ok(None),
        };
        if !tied.is_empty() {
            let mut keys: Vec<String> = vec![String::from(self.grammars[index].0)];
            keys.extend(
                tied.iter()
                    .map(|i| String::from(self.grammars[*i].0)),
            );
            defo!("ambiguous {:?}", keys);
            return Err(GrammarError::AmbiguousKey(keys));
        }
        let (key, regex) = &self.grammars[index];
        // capture from the winning start; `captures_at` keeps look-around
        // context of the whole text
        let captures = match regex.captures_at(text, start) {
            Some(val) => val,
            None => return Ok(None),
        };
        let whole = match captures.get(0) {
            Some(val) => val,
            None => return Ok(None),
        };
        let mut fields = Fields::new();
        for name in regex.capture_names().flatten() {
            if let Some(m) = captures.name(name) {
                fields.insert(String::from(name), String::from(m.as_str()));
            }
        }

        Ok(Some(GrammarMatch {
            key: *key,
            start: whole.start(),
            end: whole.end(),
            fields,
        }))
    }
}
