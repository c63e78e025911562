/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::mem;
use std::slice;

use crate::error::ValueListError;
use crate::serializer::{serialize_identifier, serialize_name, serialize_string, write_numeric};
use crate::string::ParserString;
use crate::tokenizer::{Numeric, Token, Unit};
use crate::ToCss;

/// One component of a property value.
#[derive(PartialEq, Debug, Clone)]
pub enum ParserValue<'i> {
    /// An identifier.
    Ident(ParserString<'i>),
    /// A quoted string, without the quotes.
    String(ParserString<'i>),
    /// The content of `url()`.
    Uri(ParserString<'i>),
    /// A plain number.
    Number(Numeric),
    /// A percentage, not divided by 100.
    Percentage(Numeric),
    /// A number with a known unit.
    Dimension(Numeric, Unit),
    /// A number followed by an identifier that is not a known unit.
    ///
    /// Whether the unit is acceptable is decided by the property parser.
    DimensionList(Numeric, ParserString<'i>),
    /// `,`, `/`, and inside functions `+`, `-`, `*`;
    /// `(` and `)` around a flattened parenthesised group.
    Operator(char),
    /// A function with its arguments.
    Function(Box<ParserFunction<'i>>),
    /// A `[ ... ]` group.
    ValueList(Box<ParserValueList<'i>>),
    /// `#` followed by a name, without the `#`.
    HexColor(ParserString<'i>),
    /// A unicode range, start and end included.
    UnicodeRange(u32, u32),
}

fn finite(numeric: Numeric) -> Numeric {
    if numeric.value.is_finite() {
        numeric
    } else {
        Numeric {
            value: 0.,
            int_value: None,
            ..numeric
        }
    }
}

impl<'i> ParserValue<'i> {
    /// A number value. A non-finite value is stored as 0.
    pub fn number(numeric: Numeric) -> ParserValue<'i> {
        ParserValue::Number(finite(numeric))
    }

    /// A percentage value. A non-finite value is stored as 0.
    pub fn percentage(numeric: Numeric) -> ParserValue<'i> {
        ParserValue::Percentage(finite(numeric))
    }

    /// A dimension value. A non-finite value is stored as 0.
    pub fn dimension(numeric: Numeric, unit: Unit) -> ParserValue<'i> {
        ParserValue::Dimension(finite(numeric), unit)
    }

    /// The value a single token stands for, if it stands for one on its own.
    ///
    /// Functions, blocks and whitespace are assembled by the grammar driver.
    pub fn from_token(token: Token<'i>) -> Option<ParserValue<'i>> {
        Some(match token {
            Token::Ident(name) => ParserValue::Ident(name),
            Token::QuotedString(value) => ParserValue::String(value),
            Token::Url(value) => ParserValue::Uri(value),
            Token::Number(numeric) => ParserValue::number(numeric),
            Token::Percentage(numeric) => ParserValue::percentage(numeric),
            Token::Dimension(numeric, unit) => ParserValue::dimension(numeric, unit),
            Token::UnknownDimension(numeric, unit) => {
                ParserValue::DimensionList(finite(numeric), unit)
            }
            Token::Hash(name) | Token::IdHash(name) => ParserValue::HexColor(name),
            Token::UnicodeRange(start, end) => ParserValue::UnicodeRange(start, end),
            Token::Comma => ParserValue::Operator(','),
            Token::Delim(c) => ParserValue::Operator(c),
            _ => return None,
        })
    }

    /// The numeric payload of numbers, percentages and dimensions.
    pub fn numeric(&self) -> Option<&Numeric> {
        match *self {
            ParserValue::Number(ref n)
            | ParserValue::Percentage(ref n)
            | ParserValue::Dimension(ref n, _)
            | ParserValue::DimensionList(ref n, _) => Some(n),
            _ => None,
        }
    }

    /// Whether this is the operator `c`.
    #[inline]
    pub fn is_operator(&self, c: char) -> bool {
        *self == ParserValue::Operator(c)
    }

    /// Detach from the source buffer.
    pub fn into_owned(self) -> ParserValue<'static> {
        match self {
            ParserValue::Ident(s) => ParserValue::Ident(s.into_owned()),
            ParserValue::String(s) => ParserValue::String(s.into_owned()),
            ParserValue::Uri(s) => ParserValue::Uri(s.into_owned()),
            ParserValue::Number(n) => ParserValue::Number(n),
            ParserValue::Percentage(n) => ParserValue::Percentage(n),
            ParserValue::Dimension(n, unit) => ParserValue::Dimension(n, unit),
            ParserValue::DimensionList(n, unit) => ParserValue::DimensionList(n, unit.into_owned()),
            ParserValue::Operator(c) => ParserValue::Operator(c),
            ParserValue::Function(function) => {
                ParserValue::Function(Box::new((*function).into_owned()))
            }
            ParserValue::ValueList(list) => ParserValue::ValueList(Box::new((*list).into_owned())),
            ParserValue::HexColor(s) => ParserValue::HexColor(s.into_owned()),
            ParserValue::UnicodeRange(start, end) => ParserValue::UnicodeRange(start, end),
        }
    }
}

impl<'i> ToCss for ParserValue<'i> {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        match *self {
            ParserValue::Ident(ref name) => serialize_identifier(&name.to_str(), dest),
            ParserValue::String(ref value) => serialize_string(&value.to_str(), dest),
            ParserValue::Uri(ref value) => {
                dest.write_str("url(")?;
                serialize_string(&value.to_str(), dest)?;
                dest.write_str(")")
            }
            ParserValue::Number(ref numeric) => write_numeric(numeric, dest),
            ParserValue::Percentage(ref numeric) => {
                write_numeric(numeric, dest)?;
                dest.write_str("%")
            }
            ParserValue::Dimension(ref numeric, unit) => {
                write_numeric(numeric, dest)?;
                dest.write_str(unit.as_str())
            }
            ParserValue::DimensionList(ref numeric, ref unit) => {
                write_numeric(numeric, dest)?;
                let unit = unit.to_str();
                // Disambiguate with scientific notation.
                if unit == "e" || unit == "E" || unit.starts_with("e-") || unit.starts_with("E-") {
                    dest.write_str("\\65 ")?;
                    serialize_name(&unit[1..], dest)
                } else {
                    serialize_identifier(&unit, dest)
                }
            }
            ParserValue::Operator(c) => dest.write_char(c),
            ParserValue::Function(ref function) => function.to_css(dest),
            ParserValue::ValueList(ref list) => {
                dest.write_str("[")?;
                list.to_css(dest)?;
                dest.write_str("]")
            }
            ParserValue::HexColor(ref name) => {
                dest.write_str("#")?;
                serialize_name(&name.to_str(), dest)
            }
            ParserValue::UnicodeRange(start, end) => {
                write!(dest, "U+{:X}", start)?;
                if end != start {
                    write!(dest, "-{:X}", end)?;
                }
                Ok(())
            }
        }
    }
}

/// A function call inside a value: `name(args)`.
#[derive(PartialEq, Debug, Clone)]
pub struct ParserFunction<'i> {
    /// The name, without the `(`.
    pub name: ParserString<'i>,
    /// The arguments, operators included.
    pub args: ParserValueList<'i>,
}

impl<'i> ParserFunction<'i> {
    /// Detach from the source buffer.
    pub fn into_owned(self) -> ParserFunction<'static> {
        ParserFunction {
            name: self.name.into_owned(),
            args: self.args.into_owned(),
        }
    }
}

impl<'i> ToCss for ParserFunction<'i> {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        serialize_identifier(&self.name.to_str(), dest)?;
        dest.write_str("(")?;
        self.args.to_css(dest)?;
        dest.write_str(")")
    }
}

/// An ordered run of values with a cursor.
///
/// The cursor is always in `0..=len()`; at `len()` it points past the last value.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParserValueList<'i> {
    values: Vec<ParserValue<'i>>,
    current: usize,
}

impl<'i> ParserValueList<'i> {
    /// An empty list.
    pub fn new() -> ParserValueList<'i> {
        ParserValueList {
            values: Vec::new(),
            current: 0,
        }
    }

    /// Append a value.
    pub fn add_value(&mut self, value: ParserValue<'i>) {
        self.values.push(value)
    }

    /// Insert a value before `index`, which may be `len()`.
    ///
    /// The cursor keeps pointing at the same value.
    pub fn insert_value_at(
        &mut self,
        index: usize,
        value: ParserValue<'i>,
    ) -> Result<(), ValueListError> {
        if index > self.values.len() {
            return Err(ValueListError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            });
        }
        self.values.insert(index, value);
        if index <= self.current {
            self.current += 1;
        }
        Ok(())
    }

    /// Remove and return the value at `index`.
    ///
    /// The cursor keeps pointing at the same value; when that value is the
    /// one removed, it points at the value that followed it.
    pub fn delete_value_at(&mut self, index: usize) -> Result<ParserValue<'i>, ValueListError> {
        if index >= self.values.len() {
            return Err(ValueListError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            });
        }
        let value = self.values.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        Ok(value)
    }

    /// The value at the cursor, `None` past the end.
    #[inline]
    pub fn current(&self) -> Option<&ParserValue<'i>> {
        self.values.get(self.current)
    }

    /// The value at the cursor, mutably.
    #[inline]
    pub fn current_mut(&mut self) -> Option<&mut ParserValue<'i>> {
        self.values.get_mut(self.current)
    }

    /// Advance the cursor (never past `len()`) and return the value there.
    pub fn next(&mut self) -> Option<&ParserValue<'i>> {
        if self.current < self.values.len() {
            self.current += 1;
        }
        self.current()
    }

    /// Move the cursor back and return the value there.
    ///
    /// At 0 the cursor does not move and `None` is returned.
    pub fn previous(&mut self) -> Option<&ParserValue<'i>> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.current()
    }

    /// Move the cursor to `index`, which must point at a value.
    pub fn set_current_index(&mut self, index: usize) -> Result<(), ValueListError> {
        if index >= self.values.len() {
            return Err(ValueListError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    /// The position of the cursor.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The value at `index`, if any.
    #[inline]
    pub fn value_at(&self, index: usize) -> Option<&ParserValue<'i>> {
        self.values.get(index)
    }

    /// The value at `index`, mutably.
    #[inline]
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut ParserValue<'i>> {
        self.values.get_mut(index)
    }

    /// Number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the values in order, regardless of the cursor.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, ParserValue<'i>> {
        self.values.iter()
    }

    /// Move every value of `other` to the end of this list.
    /// `other` is left empty with its cursor at 0.
    pub fn steal_values(&mut self, other: &mut ParserValueList<'i>) {
        self.values.append(&mut other.values);
        other.current = 0;
    }

    /// Empty the list and hand every value to the caller,
    /// nested functions and lists included.
    pub fn release_values(&mut self) -> Vec<ParserValue<'i>> {
        self.current = 0;
        mem::take(&mut self.values)
    }

    /// Empty the list, dropping every value and everything nested in it.
    pub fn destroy_and_clear(&mut self) {
        self.current = 0;
        self.values.clear();
    }

    /// Detach from the source buffer.
    pub fn into_owned(self) -> ParserValueList<'static> {
        ParserValueList {
            values: self.values.into_iter().map(ParserValue::into_owned).collect(),
            current: self.current,
        }
    }
}

impl<'i> ToCss for ParserValueList<'i> {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let mut previous: Option<&ParserValue> = None;
        for value in &self.values {
            if let Some(previous) = previous {
                let tight = value.is_operator(',')
                    || value.is_operator(')')
                    || previous.is_operator('(');
                if !tight {
                    dest.write_str(" ")?;
                }
            }
            value.to_css(dest)?;
            previous = Some(value);
        }
        Ok(())
    }
}

impl<'a, 'i> IntoIterator for &'a ParserValueList<'i> {
    type Item = &'a ParserValue<'i>;
    type IntoIter = slice::Iter<'a, ParserValue<'i>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
