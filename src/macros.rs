/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::mem::MaybeUninit;

/// Expands to a `match` expression with string patterns,
/// matching case-insensitively in the ASCII range.
///
/// The patterns must not contain ASCII upper case letters. (They must be already be lower-cased.)
///
/// # Example
///
/// ```rust
/// # fn main() {}  // Make doctest not wrap everything in its own main
/// # fn dummy(at_rule_name: &str) -> Option<u8> {
/// cssgrammar::match_ignore_ascii_case! { at_rule_name,
///     "media" => Some(1),
///     "supports" => Some(2),
///     "keyframes" | "-webkit-keyframes" => Some(3),
///     _ => None,
/// }
/// # }
/// ```
#[macro_export]
macro_rules! match_ignore_ascii_case {
    ( $input:expr,
        $(
            $( #[$meta: meta] )*
            $( $pattern: pat )|+ $( if $guard: expr )? => $then: expr
        ),+
        $(,)?
    ) => {
        {
            // The dummy module puts the proc macro in item position.
            mod cssgrammar_internal {
                $crate::_cssgrammar_internal_max_len! {
                    $( $( $pattern )+ )+
                }
            }
            $crate::_cssgrammar_internal_to_lowercase!($input, cssgrammar_internal::MAX_LENGTH => lowercase);
            // "A" never equals a pattern: none of them contain ASCII upper case letters.
            match lowercase.unwrap_or("A") {
                $(
                    $( #[$meta] )*
                    $( $pattern )|+ $( if $guard )? => $then,
                )+
            }
        }
    };
}

/// Define a type `$name` whose `get(&str) -> Option<&'static $ValueType>` function
/// finds the input in a [`phf` map](https://github.com/sfackler/rust-phf),
/// matching case-insensitively in the ASCII range.
///
/// ## Example:
///
/// ```rust
/// # fn main() {}  // Make doctest not wrap everything in its own main
/// fn unit_scale(input: &str) -> Option<f32> {
///     cssgrammar::ascii_case_insensitive_phf_map! {
///         scale -> f32 = {
///             "px" => 1.,
///             "in" => 96.,
///             "cm" => 37.795277,
///         }
///     }
///     scale::get(input).cloned()
/// }
/// ```
#[macro_export]
macro_rules! ascii_case_insensitive_phf_map {
    ($name: ident -> $ValueType: ty = { $( $key: tt => $value: expr ),+ }) => {
        ascii_case_insensitive_phf_map!($name -> $ValueType = { $( $key => $value, )+ })
    };
    ($name: ident -> $ValueType: ty = { $( $key: tt => $value: expr, )+ }) => {
        use $crate::_cssgrammar_internal_phf as phf;

        mod cssgrammar_internal {
            $crate::_cssgrammar_internal_max_len! {
                $( $key )+
            }
        }

        static MAP: phf::Map<&'static str, $ValueType> = phf::phf_map! {
            $(
                $key => $value,
            )*
        };

        // Associated functions on a unit struct, because items of an inner
        // module cannot name types from the enclosing function.
        #[allow(non_camel_case_types)]
        struct $name;
        impl $name {
            #[allow(dead_code)]
            fn entries() -> impl Iterator<Item = (&'static &'static str, &'static $ValueType)> {
                MAP.entries()
            }

            fn get(input: &str) -> Option<&'static $ValueType> {
                $crate::_cssgrammar_internal_to_lowercase!(input, cssgrammar_internal::MAX_LENGTH => lowercase);
                MAP.get(lowercase?)
            }
        }
    }
}

/// Implementation detail of match_ignore_ascii_case! and ascii_case_insensitive_phf_map! macros.
///
/// **This macro is not part of the public API. It can change or be removed between any versions.**
///
/// Define a local variable named `$output`
/// to the result of calling `_cssgrammar_internal_to_lowercase`
/// with a stack-allocated buffer of length `$BUFFER_SIZE`.
#[macro_export]
#[doc(hidden)]
macro_rules! _cssgrammar_internal_to_lowercase {
    ($input: expr, $BUFFER_SIZE: expr => $output: ident) => {
        #[allow(unsafe_code)]
        let mut buffer = unsafe {
            ::std::mem::MaybeUninit::<[::std::mem::MaybeUninit<u8>; $BUFFER_SIZE]>::uninit()
                .assume_init()
        };
        let input: &str = $input;
        let $output = $crate::_cssgrammar_internal_to_lowercase(&mut buffer, input);
    };
}

/// Implementation detail of match_ignore_ascii_case! and ascii_case_insensitive_phf_map! macros.
///
/// **This function is not part of the public API. It can change or be removed between any versions.**
///
/// If `input` is larger than buffer, return `None`.
/// Otherwise, return `input` ASCII-lowercased, using `buffer` as temporary space if necessary.
#[doc(hidden)]
#[allow(non_snake_case)]
#[inline]
pub fn _cssgrammar_internal_to_lowercase<'a>(
    buffer: &'a mut [MaybeUninit<u8>],
    input: &'a str,
) -> Option<&'a str> {
    let buffer = buffer.get_mut(..input.len())?;

    #[cold]
    fn make_ascii_lowercase<'a>(
        buffer: &'a mut [MaybeUninit<u8>],
        input: &'a str,
        first_uppercase: usize,
    ) -> &'a str {
        // `u8` has the same layout as `MaybeUninit<u8>`.
        let input_bytes =
            unsafe { &*(input.as_bytes() as *const [u8] as *const [MaybeUninit<u8>]) };

        buffer.copy_from_slice(input_bytes);

        // Same layout, and every byte is now initialized.
        let buffer = unsafe { &mut *(buffer as *mut [MaybeUninit<u8>] as *mut [u8]) };

        buffer[first_uppercase..].make_ascii_lowercase();
        // A copy of well-formed UTF-8, ASCII-lowercased, is still well-formed.
        unsafe { ::std::str::from_utf8_unchecked(buffer) }
    }

    Some(
        match input.bytes().position(|byte| matches!(byte, b'A'..=b'Z')) {
            Some(first_uppercase) => make_ascii_lowercase(buffer, input, first_uppercase),
            None => input,
        },
    )
}
