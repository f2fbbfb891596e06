//! Entity records: residents, towns, nations, territories
//!
//! These are plain data records. All cross-references between them are id
//! lookups maintained by the mutation entry points in `world` and `systems`;
//! nothing here mutates another entity.

pub mod nation;
pub mod resident;
pub mod territory;
pub mod town;

pub use self::nation::Nation;
pub use self::resident::Resident;
pub use self::territory::Territory;
pub use self::town::Town;
