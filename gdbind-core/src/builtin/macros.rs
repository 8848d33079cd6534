/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

#![macro_use]

/// Plain `#[repr(C)]` values: copied bitwise into and out of call frame slots.
macro_rules! impl_frame_value {
    ($($Type:ty),+ $(,)?) => {
        $(
            impl<'a> $crate::meta::FrameArg<'a> for $Type {
                fn push_to(self, frame: &mut $crate::meta::Frame<'a>) {
                    frame.push_value(self);
                }
            }

            impl $crate::meta::FrameReturn for $Type {
                unsafe fn from_slot(
                    slot: &$crate::meta::Slot,
                    _ownership: $crate::obj::Ownership,
                    _scope: $crate::lifetime::Scope,
                ) -> Result<Self, $crate::meta::error::CallErrorReason> {
                    Ok($crate::meta::read_slot::<$Type>(slot))
                }
            }
        )+
    };
}

/// Builtin types that own engine memory: the Rust value is a key into a scope.
macro_rules! impl_managed_builtin {
    (
        $( #[$attr:meta] )*
        pub struct $Type:ident => $Kind:ident;
    ) => {
        $( #[$attr] )*
        pub struct $Type {
            key: $crate::lifetime::HandleKey,
        }

        impl $Type {
            /// Creates an empty value in the [ambient scope](crate::lifetime::Scope::ambient).
            #[allow(clippy::new_without_default)]
            #[track_caller]
            pub fn new() -> Self {
                Self::new_in($crate::lifetime::Scope::ambient())
            }

            /// Creates an empty value, owned by `scope`.
            #[track_caller]
            pub fn new_in(scope: $crate::lifetime::Scope) -> Self {
                // SAFETY: builtin values can only be created once the binding is initialized.
                let handle = unsafe { $crate::builtin::new_default_handle($crate::lifetime::HandleKind::$Kind) };
                <Self as $crate::lifetime::Managed>::from_handle_in(handle, scope)
            }
        }

        impl $crate::lifetime::Managed for $Type {
            const KIND: $crate::lifetime::HandleKind = $crate::lifetime::HandleKind::$Kind;

            fn from_key(key: $crate::lifetime::HandleKey) -> Self {
                Self { key }
            }

            fn key(&self) -> $crate::lifetime::HandleKey {
                self.key
            }
        }

        impl<'a> $crate::meta::FrameArg<'a> for &$Type {
            #[track_caller]
            fn push_to(self, frame: &mut $crate::meta::Frame<'a>) {
                frame.push_borrowed(self.key);
            }
        }

        impl $crate::meta::FrameReturn for $Type {
            fn owned_kind(_ownership: $crate::obj::Ownership) -> Option<$crate::lifetime::HandleKind> {
                // Builtin returns are always copies that the caller owns.
                Some($crate::lifetime::HandleKind::$Kind)
            }

            unsafe fn prepare_slot(slot: &mut $crate::meta::Slot) {
                $crate::builtin::prepare_builtin_slot(slot, $crate::lifetime::HandleKind::$Kind);
            }

            unsafe fn from_slot(
                slot: &$crate::meta::Slot,
                _ownership: $crate::obj::Ownership,
                scope: $crate::lifetime::Scope,
            ) -> Result<Self, $crate::meta::error::CallErrorReason> {
                // The engine wrote a fresh copy into the slot, owned by the caller.
                let handle = $crate::lifetime::ErasedHandle::new(
                    $crate::lifetime::HandleKind::$Kind,
                    $crate::meta::handle_words(slot),
                );

                $crate::meta::register_return(handle, scope).map(<Self as $crate::lifetime::Managed>::from_key)
            }
        }

        impl std::fmt::Debug for $Type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($Type), "({})"), self.key)
            }
        }
    };
}
