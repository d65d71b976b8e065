//! Scene-to-piece-hierarchy conversion
//!
//! [`ModelLoader`] drives the whole pipeline for one model file:
//!
//! 1. locate and parse the model's metafile (missing or broken metafiles
//!    fall back to defaults)
//! 2. import the scene through a [`SceneImporter`]
//! 3. resolve texture slots
//! 4. build one piece per scene node, consuming marker nodes
//! 5. link parents and children by name
//! 6. propagate model-space offsets, bounds and collision volumes
//! 7. apply model-level metadata overrides

mod builder;
mod dimensions;
mod geometry;
mod hierarchy;
mod markers;
mod textures;
mod transform;


pub use builder::{ROOT_PIECE_NAME, UNNAMED_PIECE_NAME};
pub use markers::{Marker, MarkerProperties, HEIGHT_MARKER, RADIUS_MARKER};

use std::path::Path;

use thiserror::Error;

use crate::config::LoaderConfig;
use crate::foundation::logging::{debug, error, info, MODEL};
use crate::import::{ImportError, ImportedScene, SceneImporter};
use crate::metadata::Metadata;
use crate::model::Model;

use builder::PieceBuilder;

/// Model loading errors
#[derive(Error, Debug)]
pub enum ModelError {
    /// The scene importer failed; no model was produced
    #[error("Failed to import model '{path}': {source}")]
    Import {
        /// Path of the model file
        path: String,
        /// Importer diagnostic
        #[source]
        source: ImportError,
    },
    /// No piece survived as the model root
    #[error("Model '{0}' has no root piece")]
    MissingRoot(String),
}

/// Loads model files into piece hierarchies
#[derive(Debug, Clone)]
pub struct ModelLoader<I: SceneImporter> {
    config: LoaderConfig,
    importer: I,
}

impl<I: SceneImporter> ModelLoader<I> {
    /// Create a loader using `importer` for scene files
    pub fn new(config: LoaderConfig, importer: I) -> Self {
        Self { config, importer }
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Import and convert the model at `path`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Model, ModelError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().into_owned();

        let metadata = self.load_metadata(path);

        let scene = self
            .importer
            .import_scene(path)
            .map_err(|source| ModelError::Import { path: name.clone(), source })?;

        self.load_scene(&name, &scene, &metadata)
    }

    /// Convert an already imported scene
    ///
    /// `name` is the model's source path; its directory is searched for
    /// textures.
    pub fn load_scene(
        &self,
        name: &str,
        scene: &ImportedScene,
        metadata: &Metadata,
    ) -> Result<Model, ModelError> {
        let model_table = metadata.root();
        let mut model = Model::new(name);

        let model_dir = Path::new(name).parent().unwrap_or_else(|| Path::new(""));
        textures::find_textures(&mut model, scene, model_table, model_dir, &self.config);
        info!(target: MODEL, "Loading textures. Tex1: '{}' Tex2: '{}'", model.tex1, model.tex2);

        info!(target: MODEL, "Loading pieces from root node '{}'", scene.root.name);
        let markers = PieceBuilder::new(&mut model, scene, model_table).build();

        if model.root_id().is_none() {
            error!(target: MODEL, "Model '{}' lost its root piece", name);
            return Err(ModelError::MissingRoot(name.to_string()));
        }

        info!(target: MODEL, "Processing pieces of '{}'", name);
        hierarchy::build_piece_hierarchy(&mut model);
        dimensions::calculate_model_dimensions(&mut model);
        dimensions::calculate_model_properties(&mut model, model_table, &markers);

        debug!(target: MODEL, "model->name: {}", model.name);
        debug!(target: MODEL, "model->numobjects: {}", model.piece_count());
        debug!(target: MODEL, "model->radius: {}", model.radius);
        debug!(target: MODEL, "model->height: {}", model.height);
        debug!(target: MODEL, "model->drawRadius: {}", model.draw_radius);
        debug!(target: MODEL, "model->mins: {:?}", model.mins);
        debug!(target: MODEL, "model->maxs: {:?}", model.maxs);
        debug!(target: MODEL, "model->relMidPos: {:?}", model.rel_mid_pos);
        info!(target: MODEL, "Model '{}' imported", name);

        Ok(model)
    }

    fn load_metadata(&self, path: &Path) -> Metadata {
        let meta_path = Metadata::find_for_model(path, &self.config.metadata_extensions);
        let Some(meta_path) = meta_path else {
            info!(target: MODEL, "No meta-file for '{}'. Using defaults.", path.display());
            return Metadata::empty();
        };

        match Metadata::load(&meta_path) {
            Ok(metadata) => {
                info!(target: MODEL, "Using meta-file '{}'", meta_path.display());
                metadata
            }
            Err(e) => {
                error!(
                    target: MODEL,
                    "Failed to parse meta-file '{}': {}. Using defaults.",
                    meta_path.display(),
                    e
                );
                Metadata::empty()
            }
        }
    }
}

#[cfg(feature = "obj")]
impl ModelLoader<crate::import::ObjImporter> {
    /// Loader for Wavefront OBJ files
    pub fn obj(config: LoaderConfig) -> Self {
        Self::new(config, crate::import::ObjImporter::new())
    }
}
