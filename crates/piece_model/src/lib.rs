//! # Piece Model
//!
//! Converts an imported 3D scene graph into a native piece hierarchy for
//! rendering, animation and collision.
//!
//! ## Features
//!
//! - **Transform decomposition**: importer matrices split into offset,
//!   isotropic scale and a baked rotation, with metadata overrides
//! - **Two-pass hierarchy**: parents may be renamed or declared by metadata
//!   and are resolved once every piece exists
//! - **Marker pieces**: `SpringHeight` / `SpringRadius` nodes set model
//!   properties and are removed from the tree
//! - **Bounds & collision**: model-space offsets, model bounds and a box
//!   collision volume per piece
//! - **Pluggable importers**: anything implementing [`SceneImporter`]; an
//!   OBJ backend ships behind the `obj` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use piece_model::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     piece_model::foundation::logging::init();
//!
//!     let loader = ModelLoader::obj(LoaderConfig::default());
//!     let model = loader.load("objects3d/tank.obj")?;
//!
//!     for (_, piece) in model.pieces() {
//!         println!("{} at {:?}", piece.name, piece.goffset);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]

pub mod config;
pub mod foundation;
pub mod import;
pub mod loader;
pub mod metadata;
pub mod model;

pub use import::SceneImporter;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, LoaderConfig},
        foundation::math::{Mat4, Vec3},
        import::{ImportedScene, SceneImporter, SceneMesh, SceneNode},
        loader::{ModelError, ModelLoader},
        metadata::Metadata,
        model::{CollisionVolume, Model, ModelVertex, Piece, PieceId, AABB},
    };

    #[cfg(feature = "obj")]
    pub use crate::import::ObjImporter;
}
