use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Node identifier, the same integer ids the edge list files carry.
pub type VInt = i64;

/// A community is a sorted list of node ids.
pub type Community = Vec<VInt>;

// Define the undirected edge, always stored with the smaller endpoint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub u: VInt, // The smaller endpoint.
    pub v: VInt, // The larger endpoint.
}

impl Edge {
    /// Create a normalised edge, the endpoint order of the input does not matter.
    pub fn new(a: VInt, b: VInt) -> Self {
        if a <= b {
            Edge { u: a, v: b }
        } else {
            Edge { u: b, v: a }
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.u == self.v
    }

    pub fn endpoints(&self) -> (VInt, VInt) {
        (self.u, self.v)
    }
}

impl From<(VInt, VInt)> for Edge {
    fn from(pair: (VInt, VInt)) -> Self {
        Edge::new(pair.0, pair.1)
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.u, self.v)
    }
}

#[cfg(test)]
mod test_types {
    use crate::types::Edge;

    #[test]
    fn test_edge_normalise() {
        let e1 = Edge::new(4, 3);
        let e2 = Edge::from((3, 4));
        assert_eq!(e1, e2);
        assert_eq!(e1.endpoints(), (3, 4));
        assert_eq!(format!("{}", e1), "(3, 4)");
        assert!(Edge::new(7, 7).is_self_loop());
    }

    #[test]
    fn test_edge_order() {
        // Lexicographic on (u, v), this is the tie-break order of the detector.
        let mut edges = vec![Edge::new(5, 2), Edge::new(1, 9), Edge::new(2, 3)];
        edges.sort();
        assert_eq!(edges, vec![Edge::new(1, 9), Edge::new(2, 3), Edge::new(2, 5)]);
    }
}
