//! Scene importer interface
//!
//! The piece pipeline consumes a generic scene graph: a single-rooted tree of
//! nodes with local transforms and mesh references, plus the meshes they
//! refer to. Any file format backend can produce one by implementing
//! [`SceneImporter`].

#[cfg(feature = "obj")]
pub mod obj_importer;

#[cfg(feature = "obj")]
pub use obj_importer::ObjImporter;

use std::path::Path;

use thiserror::Error;

use crate::foundation::math::{Mat4, Vec2, Vec3};

/// Maximum number of texture-coordinate channels carried per vertex
pub const MAX_UV_CHANNELS: usize = 2;

/// Scene import errors
#[derive(Error, Debug)]
pub enum ImportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
    /// The file parsed but produced nothing usable
    #[error("Empty scene: {0}")]
    EmptyScene(String),
}

/// A format backend that turns a model file into a scene graph
pub trait SceneImporter {
    /// Read and parse `path`
    fn import_scene(&self, path: &Path) -> Result<ImportedScene, ImportError>;
}

/// One node of the imported scene tree
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Node name as authored (may be empty)
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Mat4,
    /// Indices into [`ImportedScene::meshes`]
    pub meshes: Vec<usize>,
    /// Child nodes in authoring order
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create a node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::identity(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Attach a mesh reference
    pub fn with_mesh(mut self, mesh_index: usize) -> Self {
        self.meshes.push(mesh_index);
        self
    }

    /// Append a child node
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::subtree_len).sum::<usize>()
    }
}

/// A triangulated mesh as produced by the importer
///
/// Per-vertex attribute arrays are parallel to `positions`. A normal whose
/// components are NaN marks a vertex without a valid normal. Tangents are
/// used only when both `tangents` and `bitangents` are populated. Texture
/// coordinate channels are contiguous from zero; an empty channel ends the
/// list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals
    pub normals: Vec<Vec3>,
    /// Tangents (texture s-axis)
    pub tangents: Vec<Vec3>,
    /// Bitangents (texture t-axis)
    pub bitangents: Vec<Vec3>,
    /// Texture coordinates per channel
    pub tex_coords: Vec<Vec<Vec2>>,
    /// Faces as lists of vertex indices into this mesh
    pub faces: Vec<Vec<u32>>,
}

impl SceneMesh {
    /// Whether the mesh carries a tangent frame
    pub fn has_tangents_and_bitangents(&self) -> bool {
        !self.tangents.is_empty() && !self.bitangents.is_empty()
    }

    /// Whether texture-coordinate channel `channel` is present
    pub fn has_tex_coords(&self, channel: usize) -> bool {
        self.tex_coords.get(channel).is_some_and(|uvs| !uvs.is_empty())
    }
}

/// Texture references of an imported material
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    /// Material name
    pub name: String,
    /// Specular texture file
    pub specular_texture: Option<String>,
    /// Texture of a type the importer could not classify
    pub unknown_texture: Option<String>,
    /// Diffuse texture file
    pub diffuse_texture: Option<String>,
}

/// Complete result of importing one model file
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedScene {
    /// Root of the node tree
    pub root: SceneNode,
    /// Meshes referenced by the nodes
    pub meshes: Vec<SceneMesh>,
    /// Materials in file order
    pub materials: Vec<SceneMaterial>,
}

impl ImportedScene {
    /// Create a scene from a node tree and its meshes
    pub fn new(root: SceneNode, meshes: Vec<SceneMesh>) -> Self {
        Self {
            root,
            meshes,
            materials: Vec::new(),
        }
    }
}
