//! Macros for declaring machine state enums.

/// Generate a `State` implementation for a plain enum.
///
/// Variants listed under `fault:` report `is_fault() == true`, variants under
/// `busy:` report `is_busy() == true`. Extra derives can be passed as
/// attributes on the enum.
///
/// # Example
///
/// ```
/// use vendomat::state_enum;
/// use vendomat::core::State;
///
/// state_enum! {
///     pub enum DoorState {
///         Closed,
///         Opening,
///         Jammed,
///     }
///     fault: [Jammed]
///     busy: [Opening]
/// }
///
/// assert_eq!(DoorState::Opening.name(), "Opening");
/// assert!(DoorState::Jammed.is_fault());
/// assert!(DoorState::Opening.is_busy());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(fault: [$($fault:ident),* $(,)?])?
        $(busy: [$($busy:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn is_fault(&self) -> bool {
                match self {
                    $($(Self::$fault => true,)*)?
                    _ => false,
                }
            }

            fn is_busy(&self) -> bool {
                match self {
                    $($(Self::$busy => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
