//! Property marker pieces
//!
//! Two reserved node names carry model properties instead of geometry. They
//! are applied while building and never become part of the hierarchy.

use crate::foundation::logging::{info, PIECE};
use crate::foundation::math::Vec3;
use crate::metadata::MetaTable;
use crate::model::{Model, Piece};

/// Node name whose Y offset sets the model height
pub const HEIGHT_MARKER: &str = "SpringHeight";
/// Node name whose offset and scale set the model midpoint and radius
pub const RADIUS_MARKER: &str = "SpringRadius";

/// Kind of property marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Sets the model height
    Height,
    /// Sets the model midpoint and radius
    Radius,
}

impl Marker {
    /// Marker kind for a resolved piece name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            HEIGHT_MARKER => Some(Self::Height),
            RADIUS_MARKER => Some(Self::Radius),
            _ => None,
        }
    }
}

/// Model properties set by marker pieces during the build pass
///
/// These become the defaults of the final property pass so a marker value
/// survives unless the model table overrides it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarkerProperties {
    /// Height from a height marker
    pub height: Option<f32>,
    /// Radius from a radius marker
    pub radius: Option<f32>,
    /// Midpoint from a radius marker
    pub mid_pos: Option<Vec3>,
}

/// Apply `piece` as a marker if its name is reserved
///
/// Returns `true` when the piece was consumed. `piece_table` is the piece's
/// own metadata section; a key present there suppresses the marker value.
pub(crate) fn apply_marker(
    model: &mut Model,
    piece: &Piece,
    piece_table: MetaTable<'_>,
    props: &mut MarkerProperties,
) -> bool {
    let Some(marker) = Marker::from_name(&piece.name) else {
        return false;
    };

    match marker {
        Marker::Height => {
            if !piece_table.key_exists("height") {
                model.height = piece.offset.y;
                props.height = Some(model.height);
                info!(
                    target: PIECE,
                    "Model height of {} set by special node '{}'", model.height, piece.name
                );
            }
        }
        Marker::Radius => {
            if !piece_table.key_exists("midpos") {
                model.rel_mid_pos = piece.compose_scale_rotation().transform_vector(&piece.offset);
                props.mid_pos = Some(model.rel_mid_pos);
                info!(
                    target: PIECE,
                    "Model midpos of {:?} set by special node '{}'", model.rel_mid_pos, piece.name
                );
            }
            if !piece_table.key_exists("radius") {
                // scales are isotropic, so any component will do
                model.radius = piece.scales.x;
                props.radius = Some(model.radius);
                info!(
                    target: PIECE,
                    "Model radius of {} set by special node '{}'", model.radius, piece.name
                );
            }
        }
    }
    true
}
