mod mesh_contact_reduction;
mod neighbor_map;

pub use mesh_contact_reduction::{reduce_trimesh_contacts, ChildRange, ReductionError};
pub(crate) use neighbor_map::NeighborMap;
