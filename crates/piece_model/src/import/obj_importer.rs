//! Wavefront OBJ scene importer
//!
//! OBJ has no node hierarchy, so every object in the file becomes a child of
//! a nameless root node with an identity transform.

use std::path::Path;

use super::{ImportError, ImportedScene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use crate::foundation::logging::{debug, warn, MODEL};
use crate::foundation::math::{Vec2, Vec3};

/// Imports `.obj` files (and their `.mtl` libraries) through `tobj`
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ObjImporter {
    /// Create a new OBJ importer
    pub fn new() -> Self {
        Self
    }

    fn convert_mesh(mesh: &tobj::Mesh) -> SceneMesh {
        let positions: Vec<Vec3> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();

        // single-index loading keeps normals/uvs parallel to positions when present
        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])).collect()
        } else {
            Vec::new()
        };

        let mut tex_coords = Vec::new();
        if !mesh.texcoords.is_empty() && mesh.texcoords.len() / 2 == positions.len() {
            tex_coords.push(
                mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])).collect(),
            );
        }

        let faces = mesh.indices.chunks(3).map(<[u32]>::to_vec).collect();

        SceneMesh {
            positions,
            normals,
            tex_coords,
            faces,
            ..Default::default()
        }
    }

    fn convert_material(material: &tobj::Material) -> SceneMaterial {
        SceneMaterial {
            name: material.name.clone(),
            specular_texture: material.specular_texture.clone(),
            unknown_texture: None,
            diffuse_texture: material.diffuse_texture.clone(),
        }
    }
}

impl SceneImporter for ObjImporter {
    fn import_scene(&self, path: &Path) -> Result<ImportedScene, ImportError> {
        if !path.is_file() {
            return Err(ImportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("model file not found: {}", path.display()),
            )));
        }

        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| ImportError::Parse(format!("{}: {}", path.display(), e)))?;

        let materials = materials.unwrap_or_else(|e| {
            warn!(target: MODEL, "No usable material library for '{}': {}", path.display(), e);
            Vec::new()
        });

        if models.is_empty() {
            return Err(ImportError::EmptyScene(path.display().to_string()));
        }

        debug!(
            target: MODEL,
            "Imported '{}' ({} objects / {} materials)",
            path.display(),
            models.len(),
            materials.len()
        );

        let mut root = SceneNode::new("");
        let mut meshes = Vec::with_capacity(models.len());
        for model in &models {
            root.children.push(SceneNode::new(model.name.clone()).with_mesh(meshes.len()));
            meshes.push(Self::convert_mesh(&model.mesh));
        }

        Ok(ImportedScene {
            root,
            meshes,
            materials: materials.iter().map(Self::convert_material).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_OBJECTS: &str = "\
o Hull
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.5 1.0
f 1/1 2/2 3/3
o Turret
v -0.5 1.0 0.0
v 0.5 1.0 0.0
v 0.0 2.0 0.0
f 4 5 6
";

    fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("piece_model_obj_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_objects_become_root_children() {
        let path = scratch_file("two_objects.obj", TWO_OBJECTS);
        let scene = ObjImporter::new().import_scene(&path).unwrap();

        assert_eq!(scene.root.name, "");
        let names: Vec<&str> = scene.root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hull", "Turret"]);
        assert_eq!(scene.meshes.len(), 2);

        let hull = &scene.meshes[scene.root.children[0].meshes[0]];
        assert_eq!(hull.positions.len(), 3);
        assert_eq!(hull.faces.len(), 1);
        assert!(hull.has_tex_coords(0));

        let turret = &scene.meshes[scene.root.children[1].meshes[0]];
        assert_eq!(turret.faces[0].len(), 3);
        assert!(!turret.has_tex_coords(0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = std::env::temp_dir().join("piece_model_obj_definitely_missing.obj");
        let result = ObjImporter::new().import_scene(&missing);

        assert!(matches!(result, Err(ImportError::Io(_))));
    }
}
