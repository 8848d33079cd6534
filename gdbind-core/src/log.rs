/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Printing and logging functionality.
//!
//! Messages go to the engine's debugger and terminal once the binding is initialized, and to stderr before that (or in unit
//! tests, where no engine is loaded).

// https://stackoverflow.com/a/40234666
#[macro_export]
#[doc(hidden)]
macro_rules! inner_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! inner_godot_msg {
    ($godot_fn:ident; $fmt:literal $(, $args:expr)* $(,)?) => {{
        let msg = format!("{}\0", format_args!($fmt $(, $args)*));

        // Check whether engine is loaded, otherwise fall back to stderr.
        if $crate::sys::is_initialized() {
            let function = format!("{}\0", $crate::inner_function!());

            // SAFETY: binding initialized; all strings are null-terminated and outlive the call.
            unsafe {
                $crate::sys::interface_fn!($godot_fn)(
                    $crate::sys::c_str(msg.as_bytes()),
                    $crate::sys::c_str(function.as_bytes()),
                    $crate::sys::c_str(concat!(file!(), "\0").as_bytes()),
                    line!() as i32,
                    false as $crate::sys::GDExtensionBool, // whether to create a toast notification in editor
                );
            }
        } else {
            eprintln!("[{}] {}", stringify!($godot_fn), &msg[..msg.len() - 1]);
        }
    }};
}

/// Pushes a warning message to the engine's debugger and to the OS terminal.
#[macro_export]
macro_rules! godot_warn {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(print_warning; $fmt $(, $args)*)
    };
}

/// Pushes an error message to the engine's debugger and to the OS terminal.
#[macro_export]
macro_rules! godot_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(print_error; $fmt $(, $args)*)
    };
}

/// Prints an informational message.
///
/// The interface has no plain print function, so this goes to stdout.
#[macro_export]
macro_rules! godot_print {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        println!($fmt $(, $args)*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn falls_back_without_engine() {
        // No binding in unit tests; must not touch the interface.
        crate::godot_warn!("warning {}", 1);
        crate::godot_error!("error {}", 2);
        crate::godot_print!("print");
    }

    #[test]
    fn function_name() {
        let name = crate::inner_function!();
        assert!(name.ends_with("tests::function_name"), "{name}");
    }
}
