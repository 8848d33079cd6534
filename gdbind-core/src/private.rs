/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Support code for the entry point and for tests. Not part of the public API.

use std::sync::{atomic, Arc, Mutex};

pub use crate::sys::out;

#[cfg(feature = "trace")]
pub use crate::meta::trace;

/// Level:
/// - 0: no error printing (during `expect_panic` in test)
/// - 1: errors from engine callbacks only
/// - 2: normal printing
static ERROR_PRINT_LEVEL: atomic::AtomicU8 = atomic::AtomicU8::new(2);

pub fn set_error_print_level(level: u8) -> u8 {
    assert!(level <= 2);
    ERROR_PRINT_LEVEL.swap(level, atomic::Ordering::Relaxed)
}

pub(crate) fn has_error_print_level(level: u8) -> bool {
    assert!(level <= 2);
    ERROR_PRINT_LEVEL.load(atomic::Ordering::Relaxed) >= level
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Panic handling

#[derive(Debug)]
struct PanicLocation {
    line: u32,
    file: String,
}

pub fn extract_panic_message(err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("(panic of type ID {:?})", err.type_id())
    }
}

fn format_panic_message(msg: String) -> String {
    // If the message contains newlines, print all of the lines after a line break, and indent them.
    let lbegin = "\n  ";
    let indented = msg.replace('\n', lbegin);

    if indented.len() != msg.len() {
        format!("[panic]{lbegin}{indented}")
    } else {
        format!("[panic]  {msg}")
    }
}

/// Executes `code`. If a panic is thrown, it is caught and an error message is printed to the engine.
///
/// Returns `Err(message)` if a panic occurred, and `Ok(result)` with the result of `code` otherwise. Panics must not unwind
/// into the engine, so every `extern "C"` callback goes through this.
pub fn handle_panic<E, F, R, S>(error_context: E, code: F) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R + std::panic::UnwindSafe,
    S: std::fmt::Display,
{
    let location: Arc<Mutex<Option<PanicLocation>>> = Arc::new(Mutex::new(None));

    // Back up previous hook, set new one.
    let prev_hook = std::panic::take_hook();
    {
        let location = location.clone();
        std::panic::set_hook(Box::new(move |panic_info| {
            if let Some(loc) = panic_info.location() {
                if let Ok(mut guard) = location.lock() {
                    *guard = Some(PanicLocation {
                        file: loc.file().to_string(),
                        line: loc.line(),
                    });
                }
            }
        }));
    }

    // Run code that may panic, restore hook.
    let panic = std::panic::catch_unwind(code);
    std::panic::set_hook(prev_hook);

    let err = match panic {
        Ok(result) => return Ok(result),
        Err(err) => err,
    };

    let print = has_error_print_level(1);
    if print {
        let where_ = match location.lock().ok().and_then(|mut guard| guard.take()) {
            Some(loc) => format!("{}:{}", loc.file, loc.line),
            None => "unknown location".to_string(),
        };

        crate::godot_error!("Rust function panicked at {where_}.\n  Context: {}", error_context());
    }

    let msg = format_panic_message(extract_panic_message(err));
    if print {
        crate::godot_error!("{msg}");
    }

    Err(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_is_caught() {
        let level = set_error_print_level(0);
        let result = handle_panic(|| "test", || panic!("first line\nsecond line"));
        set_error_print_level(level);

        assert_eq!(result.unwrap_err(), "[panic]\n  first line\n  second line");
    }

    #[test]
    fn result_passes_through() {
        assert_eq!(handle_panic(|| "test", || 42), Ok(42));
    }
}
