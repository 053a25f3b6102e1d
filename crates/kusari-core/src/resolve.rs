//! Arity and type resolution for the values crossing step boundaries.
//!
//! [`Values`] describes a value tuple. [`IntoStep`] reads a closure's
//! parameter list: every parameter before the trailing [`Next`] is an
//! input, and the `Next`'s tuple is the output.

use crate::next::Next;

/// An ordered tuple of values passed from one step to the next.
///
/// Implemented for tuples of up to eight `Send + 'static` elements,
/// including the empty tuple.
///
/// ```
/// use kusari_core::Values;
///
/// assert_eq!(<()>::ARITY, 0);
/// assert_eq!(<(i32, String)>::ARITY, 2);
/// assert_eq!(<(u8,)>::type_names(), vec!["u8"]);
/// ```
pub trait Values: Send + 'static {
    /// Number of values in the tuple.
    const ARITY: usize;

    /// Type name of each value, in order.
    fn type_names() -> Vec<&'static str>;
}

/// A callable usable as a step whose inputs are `In` and whose outputs
/// are `Out`, resolved from its own parameter list.
///
/// Implemented for every `FnOnce(A1, .., An, Next<Out>)` with up to eight
/// inputs, with `In = (A1, .., An)`.
///
/// ```
/// use kusari_core::{IntoStep, Next, Values};
///
/// fn resolved<F, In, Out>(_: &F) -> (usize, usize)
/// where
///     F: IntoStep<In, Out>,
///     In: Values,
///     Out: Values,
/// {
///     (In::ARITY, Out::ARITY)
/// }
///
/// let step = |a: i32, b: i32, next: Next<(i32,)>| next.ok((a + b,));
/// assert_eq!(resolved(&step), (2, 1));
/// ```
pub trait IntoStep<In: Values, Out: Values>: Send + 'static {
    /// Invokes the step with its inputs spread over its parameters.
    fn call(self, input: In, next: Next<Out>);
}

macro_rules! one {
    ($T:ident) => {
        1
    };
}

macro_rules! impl_resolve {
    ($($A:ident),*) => {
        impl<$($A: Send + 'static),*> Values for ($($A,)*) {
            const ARITY: usize = 0 $(+ one!($A))*;

            fn type_names() -> Vec<&'static str> {
                vec![$(std::any::type_name::<$A>()),*]
            }
        }

        impl<F, Out, $($A),*> IntoStep<($($A,)*), Out> for F
        where
            F: FnOnce($($A,)* Next<Out>) + Send + 'static,
            Out: Values,
            $($A: Send + 'static,)*
        {
            #[allow(non_snake_case)]
            fn call(self, input: ($($A,)*), next: Next<Out>) {
                let ($($A,)*) = input;
                self($($A,)* next)
            }
        }
    };
}

impl_resolve!();
impl_resolve!(A1);
impl_resolve!(A1, A2);
impl_resolve!(A1, A2, A3);
impl_resolve!(A1, A2, A3, A4);
impl_resolve!(A1, A2, A3, A4, A5);
impl_resolve!(A1, A2, A3, A4, A5, A6);
impl_resolve!(A1, A2, A3, A4, A5, A6, A7);
impl_resolve!(A1, A2, A3, A4, A5, A6, A7, A8);

#[cfg(test)]
mod tests {
    use super::*;

    fn arities<F, In, Out>(_: &F) -> (usize, usize, Vec<&'static str>, Vec<&'static str>)
    where
        F: IntoStep<In, Out>,
        In: Values,
        Out: Values,
    {
        (In::ARITY, Out::ARITY, In::type_names(), Out::type_names())
    }

    #[test]
    fn test_tuple_arity() {
        assert_eq!(<()>::ARITY, 0);
        assert_eq!(<(i32,)>::ARITY, 1);
        assert_eq!(<(i32, i32, i32, i32, i32, i32, i32, i32)>::ARITY, 8);
        assert!(<()>::type_names().is_empty());
        assert_eq!(<(bool, u64)>::type_names(), vec!["bool", "u64"]);
    }

    #[test]
    fn test_resolves_value_free_step() {
        let step = |next: Next<()>| next.done();
        assert_eq!(arities(&step), (0, 0, vec![], vec![]));
    }

    #[test]
    fn test_resolves_inputs_and_outputs_from_parameters() {
        let step = |_x: i32, next: Next<(i32, i32)>| next.ok((2, 3));
        let (inputs, outputs, input_names, output_names) = arities(&step);
        assert_eq!(inputs, 1);
        assert_eq!(outputs, 2);
        assert_eq!(input_names, vec!["i32"]);
        assert_eq!(output_names, vec!["i32", "i32"]);
    }

    #[test]
    fn test_resolves_owned_non_copy_inputs() {
        let step = |_name: String, _tags: Vec<u8>, next: Next<(String,)>| {
            next.ok((String::new(),))
        };
        let (inputs, outputs, input_names, _) = arities(&step);
        assert_eq!((inputs, outputs), (2, 1));
        assert_eq!(input_names[0], std::any::type_name::<String>());
    }
}
