//! Typed ids for agents, items, storage groups and item kinds.
//!
//! The host hands out agent and item ids; the planner only stores and
//! compares them.  Group ids are dense indices into the storage map.

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Placeholder for "no such id" in error values.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// The id at position `i` of a dense host table.
            #[inline]
            pub fn from_index(i: usize) -> $name {
                $name(i as $inner)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// A host agent (the hauler).
    pub struct AgentId(u32);
}

typed_id! {
    /// A transportable item stack owned by the host.
    pub struct ItemId(u32);
}

typed_id! {
    /// A storage group (stockpile zone or storage building).
    pub struct GroupId(u32);
}

typed_id! {
    /// Item type identifier.  Stacks of the same kind share storage cells and
    /// unload together.
    pub struct ItemKind(u16);
}
