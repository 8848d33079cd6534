/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::meta::{Frame, FrameArg};

/// Represents a parameter list as Rust tuple where each tuple element is one parameter.
///
/// Used to call engine methods: each element is pushed into a [`Frame`] in order.
pub trait ParamTuple<'a>: Sized {
    /// The number of elements in this parameter list.
    const LEN: usize;

    /// Appends all parameters to `frame`, left to right.
    #[doc(hidden)]
    fn push_args(self, frame: &mut Frame<'a>);
}

macro_rules! count_idents {
    () => { 0 };
    ($id:ident $($rest:ident)*) => { 1 + count_idents!($($rest)*)};
}

macro_rules! impl_param_tuple {
    ($(($n:tt): $P:ident),*) => {
        impl<'a, $($P),*> ParamTuple<'a> for ($($P,)*) where $($P: FrameArg<'a>),* {
            const LEN: usize = count_idents!($($P)*);

            #[allow(unused_variables)]
            fn push_args(self, frame: &mut Frame<'a>) {
                $(
                    frame.arg(self.$n);
                )*
            }
        }
    };
}

impl_param_tuple!();
impl_param_tuple!((0): P0);
impl_param_tuple!((0): P0, (1): P1);
impl_param_tuple!((0): P0, (1): P1, (2): P2);
impl_param_tuple!((0): P0, (1): P1, (2): P2, (3): P3);
impl_param_tuple!((0): P0, (1): P1, (2): P2, (3): P3, (4): P4);
impl_param_tuple!((0): P0, (1): P1, (2): P2, (3): P3, (4): P4, (5): P5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_in_order() {
        assert_eq!(<() as ParamTuple<'_>>::LEN, 0);
        assert_eq!(<(i32, bool, f64) as ParamTuple<'_>>::LEN, 3);

        let mut frame = Frame::new();
        (1i32, true, 0.5f64).push_args(&mut frame);

        assert_eq!(frame.arg_count(), 3);
    }
}
