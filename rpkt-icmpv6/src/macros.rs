macro_rules! header_field_range_accessors {
    ( $(($get_range: ident, $get_range_mut: ident, $left: literal..$right: literal $(,)?)),* $(,)? )
    => {
        $(
            #[inline]
            fn $get_range(buf: &[u8]) -> &[u8] {
                &buf[$left..$right]
            }
        )*

        $(
            #[inline]
            fn $get_range_mut(buf: &mut [u8]) -> &mut [u8] {
                &mut buf[$left..$right]
            }
        )*
    }
}

macro_rules! header_field_val_accessors {
    ( $(($get_val: ident, $get_val_mut: ident, $val: literal $(,)?)),* $(,)? )
    => {
        $(
            #[inline]
            fn $get_val(buf: &[u8]) -> &u8 {
                &buf[$val]
            }
        )*

        $(
            #[inline]
            fn $get_val_mut(buf: &mut [u8]) -> &mut u8 {
                &mut buf[$val]
            }
        )*
    }
}

// Generate an "open" enum: a newtype over an integer with named constants.
// Values without a named constant are carried verbatim.
macro_rules! enum_sim {
    (
        $(#[$enum_attr: meta])*
        pub struct $tname:ident ($size_t:ty) {
            $(
                $(#[$arm_attr: meta])*
                $enum_arm:ident = $num_exp:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        $(#[$enum_attr])*
        pub struct $tname($size_t);

        impl $tname {
            $(
                $(#[$arm_attr])*
                pub const $enum_arm: Self = Self($num_exp);
            )+

            /// Get the raw value.
            #[inline]
            pub const fn raw(&self) -> $size_t {
                self.0
            }

            /// Get the name of the constant matching this value, if there is one.
            pub fn name(&self) -> Option<&'static str> {
                $(
                    if *self == Self::$enum_arm {
                        return Some(stringify!($enum_arm));
                    }
                )+
                None
            }
        }

        impl ::core::convert::From<$size_t> for $tname {
            #[inline]
            fn from(value: $size_t) -> $tname {
                $tname(value)
            }
        }

        impl ::core::convert::From<$tname> for $size_t {
            #[inline]
            fn from(value: $tname) -> $size_t {
                value.0
            }
        }

        impl ::core::fmt::Display for $tname {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{}({})", name, self.0),
                    None => write!(f, "UNKNOWN({})", self.0),
                }
            }
        }
    };
}
