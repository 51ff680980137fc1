use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an atom within one template.
///
/// Ids are the integers written in the template file. They are unique
/// within a template but carry no meaning across templates; relating
/// them is exactly what a [`Mapping`](crate::Mapping) does.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AtomId(pub u32);

impl AtomId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for AtomId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of a [`MoleculeGraph`](crate::MoleculeGraph).
///
/// `Atom` stores what the upstream extraction step knows about one atom
/// of a partial template. It is immutable once added to a graph.
///
/// # Examples
///
/// ```
/// use bondmap::{Atom, AtomId};
///
/// let oxygen = Atom::new(13, "O").with_coords([0.0, 1.2, -0.4]);
/// assert_eq!(oxygen.id, AtomId(13));
/// assert_eq!(oxygen.element_type, "O");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Template-local identifier.
    pub id: AtomId,
    /// Element or force-field type token (`"C"`, `"H"`, `"3"`, ...).
    ///
    /// Two atoms can only be mapped onto each other when their tokens
    /// fall in the same [`EquivalenceClasses`](crate::EquivalenceClasses)
    /// class.
    pub element_type: String,
    /// Cartesian coordinates, when the template provides them.
    #[serde(default)]
    pub coords: Option<[f64; 3]>,
}

impl Atom {
    pub fn new(id: u32, element_type: impl Into<String>) -> Self {
        Self {
            id: AtomId(id),
            element_type: element_type.into(),
            coords: None,
        }
    }

    pub fn with_coords(mut self, coords: [f64; 3]) -> Self {
        self.coords = Some(coords);
        self
    }
}

impl crate::traits::HasElementType for Atom {
    fn element_type(&self) -> &str {
        &self.element_type
    }
}
