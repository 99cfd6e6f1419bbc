//! `mode_table!` generator.

/// Declare a closed enum together with its name table.
///
/// Each variant is listed with its canonical name; the declaration order is
/// the ordinal order. The generated enum implements [`ModeName`],
/// `Display` (canonical name), `FromStr` (case-insensitive) and serde
/// `Deserialize` (canonical name).
///
/// [`ModeName`]: crate::mode::ModeName
macro_rules! mode_table {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident in $family:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $crate::mode::ModeName for $name {
            const FAMILY: $crate::mode::ModeFamily = $crate::mode::ModeFamily::$family;
            const ALL: &'static [Self] = &[$($name::$variant),+];
            const NAMES: &'static [&'static str] = &[$($text),+];

            #[inline]
            fn ordinal(self) -> usize {
                self as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str($crate::mode::ModeName::name(*self))
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::mode::UnknownMode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <Self as $crate::mode::ModeName>::from_name(s)
            }
        }
    };
}
