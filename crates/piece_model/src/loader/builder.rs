//! First pass: one piece per scene node
//!
//! Builds pieces depth-first, pre-order. Parent links are recorded by name
//! only; [`super::hierarchy`] resolves them once every piece exists.

use std::collections::HashSet;

use super::geometry::load_piece_geometry;
use super::markers::{apply_marker, MarkerProperties};
use super::transform::load_piece_transformations;
use crate::foundation::logging::{debug, info, warn, PIECE};
use crate::import::{ImportedScene, SceneNode};
use crate::metadata::MetaTable;
use crate::model::{Model, Piece};

/// Name given to a nameless root node
pub const ROOT_PIECE_NAME: &str = "$$root$$";
/// Base name given to any other nameless node
pub const UNNAMED_PIECE_NAME: &str = "$$piece$$";

/// Recursive piece construction state for one model
pub(crate) struct PieceBuilder<'m, 's> {
    model: &'m mut Model,
    scene: &'s ImportedScene,
    pieces_table: MetaTable<'s>,
    // every name held by a live piece so far, including ancestors still
    // being built
    claimed_names: HashSet<String>,
    markers: MarkerProperties,
}

impl<'m, 's> PieceBuilder<'m, 's> {
    pub(crate) fn new(
        model: &'m mut Model,
        scene: &'s ImportedScene,
        model_table: MetaTable<'s>,
    ) -> Self {
        Self {
            model,
            scene,
            pieces_table: model_table.sub_table("pieces"),
            claimed_names: HashSet::new(),
            markers: MarkerProperties::default(),
        }
    }

    /// Build every piece reachable from the scene root
    ///
    /// Returns the model properties set by marker pieces.
    pub(crate) fn build(mut self) -> MarkerProperties {
        let scene = self.scene;
        self.load_piece(&scene.root, None, true);
        self.markers
    }

    fn load_piece(&mut self, node: &'s SceneNode, parent_name: Option<&str>, is_root: bool) {
        self.model.increment_piece_count();

        let mut piece = Piece::new(self.resolve_piece_name(&node.name, is_root));
        info!(
            target: PIECE,
            "Converting node '{}' to piece '{}' ({} meshes)",
            node.name,
            piece.name,
            node.meshes.len()
        );

        let piece_table = self.pieces_table.sub_table(&piece.name);
        load_piece_transformations(&mut piece, &node.transform, piece_table, is_root);

        if apply_marker(self.model, &piece, piece_table, &mut self.markers) {
            self.model.decrement_piece_count();
            self.claimed_names.remove(&piece.name);
            if !node.children.is_empty() {
                warn!(
                    target: PIECE,
                    "Discarding {} node(s) below special node '{}'",
                    node.subtree_len() - 1,
                    piece.name
                );
            }
            return;
        }

        load_piece_geometry(&mut piece, node, self.scene);

        piece.parent_name = if piece_table.key_exists("parent") {
            piece_table.get_string("parent", "")
        } else {
            parent_name.unwrap_or_default().to_string()
        };

        debug!(
            target: PIECE,
            "Loaded piece '{}' (parent '{}', {} vertices, {} indices)",
            piece.name,
            piece.parent_name,
            piece.vertices.len(),
            piece.vertex_draw_indices.len()
        );

        let name = piece.name.clone();
        let id = self.model.insert_piece(piece);
        if is_root {
            self.model.set_root_piece(id);
        }

        for child in &node.children {
            self.load_piece(child, Some(&name), false);
        }

        self.model.register_piece_name(id);
    }

    /// Pick a name no live piece holds yet and claim it
    fn resolve_piece_name(&mut self, node_name: &str, is_root: bool) -> String {
        let base = match node_name {
            "" if is_root => ROOT_PIECE_NAME,
            "" => UNNAMED_PIECE_NAME,
            name => name,
        };

        let mut name = base.to_string();
        let mut suffix = 0u32;
        while self.claimed_names.contains(&name) {
            name = format!("{base}{suffix:02}");
            suffix += 1;
        }

        self.claimed_names.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use crate::foundation::math::{Mat4, Vec3};
    use crate::metadata::Metadata;

    fn build(root: SceneNode, metadata: &Metadata) -> (Model, MarkerProperties) {
        let scene = ImportedScene::new(root, Vec::new());
        let mut model = Model::new("test");
        let markers = PieceBuilder::new(&mut model, &scene, metadata.root()).build();
        (model, markers)
    }

    fn names(model: &Model) -> Vec<String> {
        model.pieces().map(|(_, p)| p.name.clone()).collect()
    }

    #[test]
    fn test_pre_order_creation_and_parent_names() {
        let root = SceneNode::new("Base")
            .with_child(SceneNode::new("Turret").with_child(SceneNode::new("Barrel")))
            .with_child(SceneNode::new("Wheel"));
        let (model, _) = build(root, &Metadata::empty());

        assert_eq!(names(&model), vec!["Base", "Turret", "Barrel", "Wheel"]);
        assert_eq!(model.piece_count(), 4);
        assert_eq!(model.root_piece().map(|p| p.name.as_str()), Some("Base"));
        assert_eq!(model.find_piece("Base").map(|p| p.parent_name.as_str()), Some(""));
        assert_eq!(model.find_piece("Barrel").map(|p| p.parent_name.as_str()), Some("Turret"));
        assert_eq!(model.find_piece("Wheel").map(|p| p.parent_name.as_str()), Some("Base"));
        // linking is left to the second pass
        assert!(model.pieces().all(|(_, p)| p.parent.is_none() && p.children.is_empty()));
    }

    #[test]
    fn test_unnamed_nodes() {
        let root = SceneNode::new("")
            .with_child(SceneNode::new(""))
            .with_child(SceneNode::new(""));
        let (model, _) = build(root, &Metadata::empty());

        assert_eq!(names(&model), vec!["$$root$$", "$$piece$$", "$$piece$$00"]);
        assert_eq!(
            model.find_piece("$$piece$$00").map(|p| p.parent_name.as_str()),
            Some("$$root$$")
        );
    }

    #[test]
    fn test_duplicate_names_get_suffixes() {
        let root = SceneNode::new("R")
            .with_child(SceneNode::new("Turret").with_child(SceneNode::new("Turret")))
            .with_child(SceneNode::new("Turret"));
        let (model, _) = build(root, &Metadata::empty());

        assert_eq!(names(&model), vec!["R", "Turret", "Turret00", "Turret01"]);
        assert_eq!(model.piece_count(), 4);
        assert_eq!(model.find_piece("Turret00").map(|p| p.parent_name.as_str()), Some("Turret"));
        assert_eq!(model.piece_names().count(), 4);
    }

    #[test]
    fn test_metadata_parent_override() {
        let doc =
            Metadata::parse("[pieces.Barrel]\nparent = \"Wheel\"\n", ConfigFormat::Toml).unwrap();
        let root = SceneNode::new("Base")
            .with_child(SceneNode::new("Barrel"))
            .with_child(SceneNode::new("Wheel"));
        let (model, _) = build(root, &doc);

        assert_eq!(model.find_piece("Barrel").map(|p| p.parent_name.as_str()), Some("Wheel"));
    }

    #[test]
    fn test_marker_consumed_with_subtree() {
        let marker = SceneNode::new("SpringHeight")
            .with_transform(Mat4::new_translation(&Vec3::new(0.0, 42.0, 0.0)))
            .with_child(SceneNode::new("Lost"));
        let root = SceneNode::new("R").with_child(marker).with_child(SceneNode::new("Kept"));
        let (model, markers) = build(root, &Metadata::empty());

        assert_eq!(names(&model), vec!["R", "Kept"]);
        assert_eq!(model.piece_count(), 2);
        assert!(model.find_piece("SpringHeight").is_none());
        assert!(model.find_piece("Lost").is_none());
        assert_eq!(model.height, 42.0);
        assert_eq!(markers.height, Some(42.0));
    }

    #[test]
    fn test_repeated_marker_stays_a_marker() {
        let root = SceneNode::new("R")
            .with_child(SceneNode::new("SpringRadius"))
            .with_child(SceneNode::new("SpringRadius"));
        let (model, _) = build(root, &Metadata::empty());

        assert_eq!(names(&model), vec!["R"]);
        assert_eq!(model.piece_count(), 1);
    }

    #[test]
    fn test_root_marker_leaves_no_root() {
        let root = SceneNode::new("SpringHeight").with_child(SceneNode::new("A"));
        let (model, _) = build(root, &Metadata::empty());

        assert!(model.root_id().is_none());
        assert_eq!(model.piece_count(), 0);
    }
}
