/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;

use crate::rules::Declaration;
use crate::serializer::serialize_identifier;
use crate::values::ParserValueList;
use crate::ToCss;

/// `only` or `not` in front of a media query.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
#[allow(missing_docs)]
pub enum MediaRestrictor {
    None,
    Only,
    Not,
}

/// `(feature)` or `(feature: value)`.
#[derive(PartialEq, Debug, Clone)]
pub struct MediaQueryExp {
    /// The feature name, ASCII-lowercased.
    pub media_feature: String,
    /// The value after the colon.
    pub value: Option<ParserValueList<'static>>,
}

impl ToCss for MediaQueryExp {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("(")?;
        serialize_identifier(&self.media_feature, dest)?;
        if let Some(ref value) = self.value {
            dest.write_str(": ")?;
            value.to_css(dest)?;
        }
        dest.write_str(")")
    }
}

/// One query of a media query list.
#[derive(PartialEq, Debug, Clone)]
pub struct MediaQuery {
    #[allow(missing_docs)]
    pub restrictor: MediaRestrictor,
    /// ASCII-lowercased; `all` when only expressions were given.
    pub media_type: String,
    /// Joined by `and`.
    pub expressions: Vec<MediaQueryExp>,
}

impl MediaQuery {
    #[allow(missing_docs)]
    pub fn new(
        restrictor: MediaRestrictor,
        media_type: &str,
        expressions: Vec<MediaQueryExp>,
    ) -> MediaQuery {
        MediaQuery {
            restrictor,
            media_type: media_type.to_ascii_lowercase(),
            expressions,
        }
    }

    /// What an invalid query is replaced with.
    pub fn not_all() -> MediaQuery {
        MediaQuery::new(MediaRestrictor::Not, "all", Vec::new())
    }
}

impl ToCss for MediaQuery {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match self.restrictor {
            MediaRestrictor::Only => dest.write_str("only ")?,
            MediaRestrictor::Not => dest.write_str("not ")?,
            MediaRestrictor::None => {}
        }
        if self.expressions.is_empty() {
            return serialize_identifier(&self.media_type, dest);
        }
        if self.media_type != "all" || self.restrictor != MediaRestrictor::None {
            serialize_identifier(&self.media_type, dest)?;
            dest.write_str(" and ")?;
        }
        for (i, expression) in self.expressions.iter().enumerate() {
            if i > 0 {
                dest.write_str(" and ")?;
            }
            expression.to_css(dest)?;
        }
        Ok(())
    }
}

/// A comma-separated media query list. Empty matches everything.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct MediaQuerySet {
    #[allow(missing_docs)]
    pub queries: Vec<MediaQuery>,
}

impl MediaQuerySet {
    #[allow(missing_docs)]
    pub fn new() -> MediaQuerySet {
        MediaQuerySet::default()
    }

    #[allow(missing_docs)]
    pub fn add_media_query(&mut self, query: MediaQuery) {
        self.queries.push(query)
    }
}

impl ToCss for MediaQuerySet {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for (i, query) in self.queries.iter().enumerate() {
            if i > 0 {
                dest.write_str(", ")?;
            }
            query.to_css(dest)?;
        }
        Ok(())
    }
}

/// The condition of an `@supports` rule.
#[derive(PartialEq, Debug, Clone)]
pub enum SupportsCondition {
    /// `not <condition>`
    Not(Box<SupportsCondition>),
    /// `<condition> and <condition> ...`
    And(Vec<SupportsCondition>),
    /// `<condition> or <condition> ...`
    Or(Vec<SupportsCondition>),
    /// `(name: value)`
    Declaration(Declaration),
}

impl SupportsCondition {
    fn write_in_parens<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        if let SupportsCondition::Declaration(_) = *self {
            return self.to_css(dest);
        }
        dest.write_str("(")?;
        self.to_css(dest)?;
        dest.write_str(")")
    }
}

impl ToCss for SupportsCondition {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            SupportsCondition::Not(ref condition) => {
                dest.write_str("not ")?;
                condition.write_in_parens(dest)
            }
            SupportsCondition::And(ref conditions) | SupportsCondition::Or(ref conditions) => {
                let keyword = if let SupportsCondition::And(_) = *self {
                    " and "
                } else {
                    " or "
                };
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        dest.write_str(keyword)?;
                    }
                    condition.write_in_parens(dest)?;
                }
                Ok(())
            }
            SupportsCondition::Declaration(ref declaration) => {
                dest.write_str("(")?;
                declaration.to_css(dest)?;
                dest.write_str(")")
            }
        }
    }
}
