use std::hash::Hash;

/// A valid node index.
///
/// Strongly typed so that node and edge indices cannot be mixed up when both
/// are used to index bookkeeping vectors during a traversal.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct NodeIndex(usize);

/// A valid edge index.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct EdgeIndex(usize);

macro_rules! impl_graph_index {
    ($GraphIndexType:ident) => {
        impl $GraphIndexType {
            /// Get this index as `usize`.
            pub fn as_usize(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $GraphIndexType {
            fn from(source: usize) -> Self {
                Self(source)
            }
        }

        impl std::fmt::Debug for $GraphIndexType {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::fmt::Display for $GraphIndexType {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl<T> std::ops::Index<$GraphIndexType> for Vec<T> {
            type Output = T;

            fn index(&self, index: $GraphIndexType) -> &Self::Output {
                &self[index.as_usize()]
            }
        }

        impl<T> std::ops::IndexMut<$GraphIndexType> for Vec<T> {
            fn index_mut(&mut self, index: $GraphIndexType) -> &mut Self::Output {
                &mut self[index.as_usize()]
            }
        }
    };
}

impl_graph_index!(NodeIndex);
impl_graph_index!(EdgeIndex);
