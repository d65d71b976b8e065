//! Native model representation
//!
//! A [`Model`] owns every [`Piece`] in an arena keyed by [`PieceId`]. Parent
//! and child links are ids into that arena, so a piece that could not be
//! linked (a missing declared parent) stays owned by the model while sitting
//! outside the renderable hierarchy.

pub mod bounds;
pub mod collision;
pub mod piece;

pub use bounds::AABB;
pub use collision::{CollisionVolume, VolumeShape};
pub use piece::{AxisMapping, ModelVertex, Piece};

use std::collections::BTreeMap;

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Vec3;

new_key_type! {
    /// Stable handle of a piece inside its model
    pub struct PieceId;
}

/// Source format family of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Loaded through a generic scene importer
    #[default]
    Assimp,
}

/// A loaded model: piece hierarchy plus model-wide properties
#[derive(Debug, Clone)]
pub struct Model {
    /// Source path of the model file
    pub name: String,
    /// Source format family
    pub model_type: ModelType,

    /// Bounding radius used by simulation
    pub radius: f32,
    /// Model height
    pub height: f32,
    /// Midpoint relative to the model origin
    pub rel_mid_pos: Vec3,
    /// Minimum model-space extents
    pub mins: Vec3,
    /// Maximum model-space extents
    pub maxs: Vec3,
    /// Radius used for draw culling
    pub draw_radius: f32,

    /// Diffuse (RGB) + team color (A) texture
    pub tex1: String,
    /// Glow (R) + reflectivity (G) + alpha (A) texture
    pub tex2: String,
    /// Flip textures vertically
    pub invert_tex_y_axis: bool,
    /// Invert team color levels
    pub invert_tex_alpha: bool,

    pieces: SlotMap<PieceId, Piece>,
    piece_map: BTreeMap<String, PieceId>,
    root: Option<PieceId>,
    num_pieces: usize,
}

impl Model {
    /// Create an empty model for the given source path
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_type: ModelType::Assimp,
            radius: 0.0,
            height: 0.0,
            rel_mid_pos: Vec3::zeros(),
            mins: Vec3::zeros(),
            maxs: Vec3::zeros(),
            draw_radius: 0.0,
            tex1: String::new(),
            tex2: String::new(),
            invert_tex_y_axis: true,
            invert_tex_alpha: true,
            pieces: SlotMap::with_key(),
            piece_map: BTreeMap::new(),
            root: None,
            num_pieces: 0,
        }
    }

    /// Id of the root piece
    pub fn root_id(&self) -> Option<PieceId> {
        self.root
    }

    /// The root piece
    pub fn root_piece(&self) -> Option<&Piece> {
        self.root.and_then(|id| self.pieces.get(id))
    }

    /// Look up a piece id by name
    pub fn find_piece_id(&self, name: &str) -> Option<PieceId> {
        self.piece_map.get(name).copied()
    }

    /// Look up a piece by name
    pub fn find_piece(&self, name: &str) -> Option<&Piece> {
        self.find_piece_id(name).and_then(|id| self.pieces.get(id))
    }

    /// Piece by id
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    /// All pieces in creation order, including detached ones
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces.iter()
    }

    /// Names of all pieces, sorted
    pub fn piece_names(&self) -> impl Iterator<Item = &str> {
        self.piece_map.keys().map(String::as_str)
    }

    /// Number of live pieces
    pub fn piece_count(&self) -> usize {
        self.num_pieces
    }

    /// Children of a piece in link order
    pub fn children_of(&self, id: PieceId) -> impl Iterator<Item = &Piece> {
        self.pieces
            .get(id)
            .into_iter()
            .flat_map(|piece| piece.children.iter())
            .filter_map(|child| self.pieces.get(*child))
    }

    /// Parent of a piece
    pub fn parent_of(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)?.parent.and_then(|parent| self.pieces.get(parent))
    }

    /// Whether a live piece cannot be reached from the root
    ///
    /// True for a piece left without a parent and for everything linked
    /// below such a piece.
    pub fn is_detached(&self, id: PieceId) -> bool {
        if !self.pieces.contains_key(id) {
            return false;
        }
        let mut current = Some(id);
        // bounded walk, parent links are acyclic after linking
        for _ in 0..=self.pieces.len() {
            match current {
                Some(cursor) if Some(cursor) == self.root => return false,
                Some(cursor) => current = self.pieces.get(cursor).and_then(|piece| piece.parent),
                None => return true,
            }
        }
        true
    }

    /// Ids of every piece reachable from the root, in pre-order
    pub fn hierarchy_order(&self) -> Vec<PieceId> {
        let mut order = Vec::with_capacity(self.pieces.len());
        let mut stack: Vec<PieceId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(piece) = self.pieces.get(id) {
                stack.extend(piece.children.iter().rev());
            }
        }
        order
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    pub(crate) fn piece_ids(&self) -> Vec<PieceId> {
        self.pieces.keys().collect()
    }

    pub(crate) fn insert_piece(&mut self, piece: Piece) -> PieceId {
        self.pieces.insert(piece)
    }

    pub(crate) fn set_root_piece(&mut self, id: PieceId) {
        debug_assert!(self.root.is_none(), "model '{}' already has a root piece", self.name);
        self.root = Some(id);
    }

    pub(crate) fn register_piece_name(&mut self, id: PieceId) {
        if let Some(piece) = self.pieces.get(id) {
            self.piece_map.insert(piece.name.clone(), id);
        }
    }

    pub(crate) fn increment_piece_count(&mut self) {
        self.num_pieces += 1;
    }

    pub(crate) fn decrement_piece_count(&mut self) {
        self.num_pieces = self.num_pieces.saturating_sub(1);
    }

    /// Link `child` under `parent`; both must be live pieces
    pub(crate) fn attach(&mut self, child: PieceId, parent: PieceId) -> bool {
        if child == parent || !self.pieces.contains_key(child) {
            return false;
        }
        match self.pieces.get_mut(parent) {
            Some(parent_piece) => parent_piece.children.push(child),
            None => return false,
        }
        if let Some(child_piece) = self.pieces.get_mut(child) {
            child_piece.parent = Some(parent);
        }
        true
    }
}
