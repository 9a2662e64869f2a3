//! Utility macro for generating counter based identifiers, where each
//! generated value wraps a [`u32`] that is minted from a global atomic
//! counter. These are used all over the compiler to create unique ids
//! for interned names, sources and other kinds of indexed data.

/// Generate a unique id type backed by an [`std::sync::atomic::AtomicU32`]
/// counter. The invocation specifies the name of the generated type, the
/// name of the backing static counter, the visibility of the type and of
/// the generated methods, and optionally the set of derives to put on the
/// type.
#[macro_export]
macro_rules! counter {
    (
        name: $name:ident,
        counter_name: $counter_name:ident,
        visibility: $visibility:vis,
        method_visibility: $method_visibility:vis,
    ) => {
        $crate::counter! {
            name: $name,
            counter_name: $counter_name,
            visibility: $visibility,
            method_visibility: $method_visibility,
            derives: (Copy, Clone, Eq, PartialEq, Hash),
        }
    };
    (
        name: $name:ident,
        counter_name: $counter_name:ident,
        visibility: $visibility:vis,
        method_visibility: $method_visibility:vis,
        derives: ($($derive:ident),* $(,)?),
    ) => {
        static $counter_name: ::std::sync::atomic::AtomicU32 =
            ::std::sync::atomic::AtomicU32::new(0);

        #[derive($($derive),*)]
        $visibility struct $name(u32);

        impl $name {
            /// Mint a fresh id by bumping the global counter.
            #[allow(clippy::new_without_default)]
            $method_visibility fn new() -> Self {
                Self($counter_name.fetch_add(1, ::std::sync::atomic::Ordering::SeqCst))
            }

            /// Get the raw value backing this id.
            $method_visibility fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::convert::From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl ::std::convert::From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}
