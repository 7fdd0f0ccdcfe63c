use std::fmt::Debug;

pub type NodeId = u32;
pub type EdgeId = u32;
pub type PortalId = u32;
pub type Label = i32;
pub type Weight = u32;

pub const INFINITY: Weight = u32::MAX / 2;

pub type NodeIds = Vec<NodeId>;
pub type EdgeIds = Vec<EdgeId>;
pub type Labels = Vec<Label>;

/// numeric type used for edge weights and path distances
///
/// `INFINITY` marks "no path" and has to be larger than every finite path sum of the graph.
/// `link` adds two distances and never produces anything above `INFINITY`, so unreachable
/// distances stay unreachable when they are combined with a portal distance.
pub trait Distance: Copy + Clone + Ord + Eq + Debug + Send + Sync {

    const ZERO: Self;
    const INFINITY: Self;

    fn link(self, other: Self) -> Self;
    fn is_negative(&self) -> bool;

    fn is_infinite(&self) -> bool {
        *self >= Self::INFINITY
    }
}

macro_rules! unsigned_distance {
    ($($t:ty),*) => {
        $(
            impl Distance for $t {
                const ZERO: Self = 0;
                const INFINITY: Self = <$t>::MAX / 2;

                fn link(self, other: Self) -> Self {
                    self.saturating_add(other).min(Self::INFINITY)
                }

                fn is_negative(&self) -> bool {
                    false
                }
            }
        )*
    };
}

macro_rules! signed_distance {
    ($($t:ty),*) => {
        $(
            impl Distance for $t {
                const ZERO: Self = 0;
                const INFINITY: Self = <$t>::MAX / 2;

                fn link(self, other: Self) -> Self {
                    self.saturating_add(other).min(Self::INFINITY)
                }

                fn is_negative(&self) -> bool {
                    *self < 0
                }
            }
        )*
    };
}

unsigned_distance!(u32, u64, usize);
signed_distance!(i32, i64);
