// src/debug/printers.rs

//! A hodge-podge of printer macros and helpers for diagnostics, test builds,
//! and debug builds.
//!
//! Extraction warnings produced while parsing a file are *data* and go to the
//! [`Mediator`]. These macros are for the program's own diagnostics.
//!
//! [`Mediator`]: crate::readers::mediator::Mediator

use std::io::Write; // for `write!` and `std::io::Stdout.flush`

#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, WriteColor};
#[doc(hidden)]
#[allow(unused_imports)]
use ::utf8_iter::Utf8CharsEx; // provides `.chars()` on `&[u8]`

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `d`ebug `e`println! an `err`or
#[macro_export]
macro_rules! de_err {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            eprint!("ERROR: ");
            #[cfg(any(debug_assertions,test))]
            eprintln!($($args)*)
        }
    }
}
pub use de_err;

/// `d`ebug `e`println! an `warn`ing
#[macro_export]
macro_rules! de_wrn {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            eprint!("WARNING: ");
            #[cfg(any(debug_assertions,test))]
            eprintln!($($args)*)
        }
    }
}
pub use de_wrn;

/// `e`println! an `err`or
#[macro_export]
macro_rules! e_err {
    (
        $($args:tt)*
    ) => {
        {
            eprint!("ERROR: ");
            eprintln!($($args)*)
        }
    }
}
pub use e_err;

/// `e`println! a `warn`ing
#[macro_export]
macro_rules! e_wrn {
    (
        $($args:tt)*
    ) => {
        {
            eprint!("WARNING: ");
            eprintln!($($args)*)
        }
    }
}
pub use e_wrn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// helper functions - various print and write
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The Unicode _Control Pictures_ symbol of a C0 control character or DEL,
/// e.g. `'\n'` returns `'␊'`. Other characters are returned as-is.
///
/// Keeps the printed width of a control character to one, so a line window
/// in trace output stays readable.
pub fn char_to_char_noraw(c: char) -> char {
    match c as u32 {
        // U+2400 SYMBOL FOR NULL through U+241F SYMBOL FOR UNIT SEPARATOR
        val @ 0..=0x1F => char::from_u32(0x2400 + val).unwrap_or(c),
        0x7F => '\u{2421}',
        _ => c,
    }
}

/// Bytes, possibly invalid UTF-8, as a `String` with control characters
/// replaced.
#[doc(hidden)]
#[allow(non_snake_case)]
pub fn buffer_to_String_noraw(buffer: &[u8]) -> String {
    buffer
        .chars()
        .map(char_to_char_noraw)
        .collect()
}

/// `str_buf` with control characters replaced.
#[doc(hidden)]
#[allow(non_snake_case)]
pub fn str_to_String_noraw(str_buf: &str) -> String {
    str_buf
        .chars()
        .map(char_to_char_noraw)
        .collect()
}

/// Print `message` to stderr prefixed with a colored `label`.
/// Falls back to plain text if color is not possible.
pub fn eprint_colored(
    label: &str,
    color: Color,
    message: &str,
    color_choice: ColorChoice,
) {
    let mut stderr = ::termcolor::StandardStream::stderr(color_choice);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    if stderr.set_color(&spec).is_err() {
        eprintln!("{}{}", label, message);
        return;
    }
    let _ = write!(&mut stderr, "{}", label);
    let _ = stderr.reset();
    let _ = writeln!(&mut stderr, "{}", message);
}

/// Flush stdout then stderr, so test and trace output interleave in order.
#[doc(hidden)]
#[allow(dead_code)]
#[cfg(any(debug_assertions, test))]
pub fn flush_stdouterr() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}
