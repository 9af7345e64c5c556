//! Macros used internally by the crate.

/// Implements [`From`] for a type by converting through an intermediate type.
///
/// `forward_from!(Source => Intermediate => Target)` generates an `impl From<Source> for Target`
/// that first converts the value into `Intermediate`, then into `Target`. Useful when `?` needs
/// to perform two conversions in a row, which the compiler won't do on its own.
#[macro_export]
macro_rules! forward_from {
    ($src:ty => $mid:ty => $dst:ty) => {
        impl ::core::convert::From<$src> for $dst {
            fn from(value: $src) -> Self {
                ::core::convert::Into::<$mid>::into(value).into()
            }
        }
    };
}
