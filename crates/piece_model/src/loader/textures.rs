//! Texture slot resolution
//!
//! `tex1` holds diffuse (RGB) and team color (A); `tex2` holds glow (R),
//! reflectivity (G) and alpha (A). Metadata wins over the scene's first
//! material.

use std::path::Path;

use crate::config::LoaderConfig;
use crate::foundation::logging::{debug, MODEL};
use crate::import::ImportedScene;
use crate::metadata::MetaTable;
use crate::model::Model;

/// Prefix Blender writes in front of relative texture paths
const BLENDER_RELATIVE_PREFIX: &str = "//..";

/// Fill the texture slots and flags of `model`
pub(crate) fn find_textures(
    model: &mut Model,
    scene: &ImportedScene,
    model_table: MetaTable<'_>,
    model_dir: &Path,
    config: &LoaderConfig,
) {
    if let Some(material) = scene.materials.first() {
        let candidates = [
            &material.specular_texture,
            &material.unknown_texture,
            &material.diffuse_texture,
        ];
        for texture in candidates.into_iter().flatten() {
            if let Some(found) = find_texture(texture, model_dir, &config.texture_search_dirs) {
                model.tex1 = found;
            }
        }
    }

    for (key, slot) in [("tex1", &mut model.tex1), ("tex2", &mut model.tex2)] {
        let requested = model_table.get_string(key, "");
        if requested.is_empty() {
            continue;
        }
        // the file may live in an archive we cannot see, so keep the name
        *slot = find_texture(&requested, model_dir, &config.texture_search_dirs)
            .unwrap_or_else(|| strip_relative_prefix(&requested).to_string());
    }

    model.invert_tex_y_axis = model_table.get_bool("fliptextures", config.flip_textures);
    model.invert_tex_alpha = model_table.get_bool("invertteamcolor", config.invert_team_color);

    debug!(
        target: MODEL,
        "Texture slots of '{}': tex1 '{}' tex2 '{}'", model.name, model.tex1, model.tex2
    );
}

fn strip_relative_prefix(texture: &str) -> &str {
    match texture.strip_prefix(BLENDER_RELATIVE_PREFIX) {
        Some(rest) => rest.trim_start_matches(['/', '\\']),
        None => texture,
    }
}

/// Locate `texture` as given, under a search dir, or next to the model
fn find_texture(texture: &str, model_dir: &Path, search_dirs: &[String]) -> Option<String> {
    let texture = strip_relative_prefix(texture);
    if texture.is_empty() {
        return None;
    }

    if Path::new(texture).is_file() {
        return Some(texture.to_string());
    }

    search_dirs
        .iter()
        .map(|dir| Path::new(dir).join(texture))
        .chain(std::iter::once(model_dir.join(texture)))
        .find(|candidate| candidate.is_file())
        .map(|candidate| candidate.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use crate::import::{SceneMaterial, SceneNode};
    use crate::metadata::Metadata;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("piece_model_tex_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn scene_with_material(material: SceneMaterial) -> ImportedScene {
        let mut scene = ImportedScene::new(SceneNode::new("root"), Vec::new());
        scene.materials.push(material);
        scene
    }

    #[test]
    fn test_strip_relative_prefix() {
        assert_eq!(strip_relative_prefix("//../tex/a.png"), "tex/a.png");
        assert_eq!(strip_relative_prefix("a.png"), "a.png");
    }

    #[test]
    fn test_material_texture_found_next_to_model() {
        let dir = scratch_dir("material");
        std::fs::write(dir.join("hull_diffuse.png"), b"png").unwrap();
        let scene = scene_with_material(SceneMaterial {
            diffuse_texture: Some("//../hull_diffuse.png".to_string()),
            specular_texture: Some("missing_spec.png".to_string()),
            ..Default::default()
        });

        let mut model = Model::new("hull.obj");
        find_textures(&mut model, &scene, MetaTable::invalid(), &dir, &LoaderConfig::default());

        assert_eq!(model.tex1, dir.join("hull_diffuse.png").to_string_lossy());
        assert!(model.tex2.is_empty());
        assert!(model.invert_tex_y_axis);
        assert!(model.invert_tex_alpha);
    }

    #[test]
    fn test_search_dirs_before_model_dir() {
        let model_dir = scratch_dir("model_dir");
        let search_dir = scratch_dir("search_dir");
        std::fs::write(model_dir.join("skin.png"), b"png").unwrap();
        std::fs::write(search_dir.join("skin.png"), b"png").unwrap();
        let config = LoaderConfig {
            texture_search_dirs: vec![search_dir.to_string_lossy().into_owned()],
            ..Default::default()
        };
        let scene = scene_with_material(SceneMaterial {
            diffuse_texture: Some("skin.png".to_string()),
            ..Default::default()
        });

        let mut model = Model::new("m");
        find_textures(&mut model, &scene, MetaTable::invalid(), &model_dir, &config);

        assert_eq!(model.tex1, search_dir.join("skin.png").to_string_lossy());
    }

    #[test]
    fn test_metadata_wins_and_sets_flags() {
        let doc = Metadata::parse(
            "tex1 = \"arm_tex1.dds\"\ntex2 = \"arm_tex2.dds\"\nfliptextures = false\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let dir = scratch_dir("metadata");
        std::fs::write(dir.join("diffuse.png"), b"png").unwrap();
        let scene = scene_with_material(SceneMaterial {
            diffuse_texture: Some("diffuse.png".to_string()),
            ..Default::default()
        });

        let mut model = Model::new("m");
        find_textures(&mut model, &scene, doc.root(), &dir, &LoaderConfig::default());

        // not on disk, kept as written
        assert_eq!(model.tex1, "arm_tex1.dds");
        assert_eq!(model.tex2, "arm_tex2.dds");
        assert!(!model.invert_tex_y_axis);
        assert!(model.invert_tex_alpha);
    }

    #[test]
    fn test_config_flag_defaults() {
        let config = LoaderConfig {
            flip_textures: false,
            invert_team_color: false,
            ..Default::default()
        };
        let mut model = Model::new("m");
        let scene = ImportedScene::new(SceneNode::new("root"), Vec::new());
        find_textures(&mut model, &scene, MetaTable::invalid(), Path::new(""), &config);

        assert!(model.tex1.is_empty());
        assert!(!model.invert_tex_y_axis);
        assert!(!model.invert_tex_alpha);
    }
}
