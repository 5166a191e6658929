//! Macros for ergonomic state machine construction.

/// Declare a fieldless enum of state ids.
///
/// Each variant converts into [`StateId`](crate::core::StateId) and
/// [`Target`](crate::core::Target), so the enum can be used anywhere an id
/// or a transition target is expected.
///
/// # Example
///
/// ```
/// use tickmind::core::{StateId, Target};
/// use tickmind::state_ids;
///
/// state_ids! {
///     pub enum Guard {
///         Idle = 1,
///         Attack = 2,
///         Return = 3,
///     }
/// }
///
/// assert_eq!(StateId::from(Guard::Attack), StateId(2));
/// assert_eq!(Target::from(Guard::Return), Target::Goto(StateId(3)));
/// assert_eq!(Guard::Idle.name(), "Idle");
/// ```
#[macro_export]
macro_rules! state_ids {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $value
            ),*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::core::convert::From<$name> for $crate::core::StateId {
            fn from(id: $name) -> Self {
                $crate::core::StateId(id as u32)
            }
        }

        impl ::core::convert::From<$name> for $crate::core::Target {
            fn from(id: $name) -> Self {
                $crate::core::Target::Goto($crate::core::StateId::from(id))
            }
        }
    };
}
