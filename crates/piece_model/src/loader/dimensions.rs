//! Model-space offsets, bounds and the final model properties

use super::markers::MarkerProperties;
use crate::foundation::logging::{trace, PIECE};
use crate::foundation::math::{utils, Vec3};
use crate::metadata::MetaTable;
use crate::model::{CollisionVolume, Model, PieceId, AABB};

/// Propagate `goffset` from the root down and collect the model bounds
///
/// Every piece reachable from the root also gets a box collision volume
/// fitted to its local geometry. Detached pieces are not visited.
pub(crate) fn calculate_model_dimensions(model: &mut Model) {
    let mut bounds = None;
    if let Some(root) = model.root_id() {
        update_piece_dimensions(model, root, Vec3::zeros(), &mut bounds);
    }

    let (mins, maxs) = bounds.map_or((Vec3::zeros(), Vec3::zeros()), |b| (b.min, b.max));
    model.mins = mins;
    model.maxs = maxs;
}

fn update_piece_dimensions(
    model: &mut Model,
    id: PieceId,
    parent_goffset: Vec3,
    bounds: &mut Option<AABB>,
) {
    let Some(piece) = model.piece_mut(id) else {
        return;
    };

    piece.goffset = piece.compose_scale_rotation().transform_vector(&piece.offset) + parent_goffset;

    if let Some(local) = piece.bounds {
        let global = local.translated(&piece.goffset);
        *bounds = Some(match bounds.take() {
            Some(current) => current.union(&global),
            None => global,
        });
    }

    // local geometry space; goffset is not applied
    piece.collision_volume = Some(match &piece.bounds {
        Some(local) => CollisionVolume::from_bounds(local),
        None => CollisionVolume::new_box(Vec3::zeros(), Vec3::zeros()),
    });

    trace!(target: PIECE, "Piece '{}' goffset {:?}", piece.name, piece.goffset);

    let goffset = piece.goffset;
    let children = piece.children.clone();
    for child in children {
        update_piece_dimensions(model, child, goffset, bounds);
    }
}

/// Apply the model-table overrides on top of the computed dimensions
///
/// Must run after [`calculate_model_dimensions`].
pub(crate) fn calculate_model_properties(
    model: &mut Model,
    model_table: MetaTable<'_>,
    markers: &MarkerProperties,
) {
    let mut mid_pos = markers.mid_pos.unwrap_or(model.rel_mid_pos);
    mid_pos.y = (model.maxs.y + model.mins.y) * 0.5;

    let extent = utils::vec_max(&model.maxs.abs(), &model.mins.abs());

    model.radius = model_table.get_float("radius", markers.radius.unwrap_or_else(|| extent.norm()));
    model.height = model_table.get_float("height", markers.height.unwrap_or(model.maxs.y));
    model.rel_mid_pos = model_table.get_float3("midpos", mid_pos);
    model.mins = model_table.get_float3("mins", model.mins);
    model.maxs = model_table.get_float3("maxs", model.maxs);

    model.draw_radius = model.radius;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use crate::foundation::math::{constants::HALF_PI, Mat4, Mat4Ext};
    use crate::metadata::Metadata;
    use crate::model::Piece;
    use approx::assert_relative_eq;

    fn unit_cube() -> Option<AABB> {
        Some(AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)))
    }

    /// root "R" (no geometry) -> "Turret" at (0,2,0) with a unit cube
    fn turret_model() -> (Model, PieceId, PieceId) {
        let mut model = Model::new("turret");
        let root = model.insert_piece(Piece::new("R"));
        model.set_root_piece(root);

        let mut turret = Piece::new("Turret");
        turret.offset = Vec3::new(0.0, 2.0, 0.0);
        turret.bounds = unit_cube();
        let turret = model.insert_piece(turret);
        model.attach(turret, root);

        (model, root, turret)
    }

    #[test]
    fn test_goffset_and_model_bounds() {
        let (mut model, root, turret) = turret_model();
        calculate_model_dimensions(&mut model);

        assert_eq!(model.piece(turret).unwrap().goffset, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(model.mins, Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(model.maxs, Vec3::new(1.0, 3.0, 1.0));

        let volume = model.piece(turret).unwrap().collision_volume.clone().unwrap();
        assert_eq!(volume.full_extents, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(volume.offset, Vec3::zeros());

        let root_volume = model.piece(root).unwrap().collision_volume.clone().unwrap();
        assert_eq!(root_volume.full_extents, Vec3::zeros());
    }

    #[test]
    fn test_goffset_accumulates_scale_and_rotation() {
        let (mut model, _, turret) = turret_model();
        {
            let piece = model.piece_mut(turret).unwrap();
            piece.scales = Vec3::new(2.0, 2.0, 2.0);
            piece.baked_rot_matrix = Mat4::rotation_z(HALF_PI);
            piece.has_identity_rotation = false;
        }
        let mut barrel = Piece::new("Barrel");
        barrel.offset = Vec3::new(1.0, 0.0, 0.0);
        let barrel = model.insert_piece(barrel);
        model.attach(barrel, turret);

        calculate_model_dimensions(&mut model);

        // (0,2,0) scaled by 2, rotated 90deg about Z
        let turret_goffset = model.piece(turret).unwrap().goffset;
        assert_relative_eq!(turret_goffset, Vec3::new(-4.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(
            model.piece(barrel).unwrap().goffset,
            turret_goffset + Vec3::new(1.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_detached_piece_ignored() {
        let (mut model, _, _) = turret_model();
        let mut stray = Piece::new("Stray");
        stray.offset = Vec3::new(100.0, 0.0, 0.0);
        stray.bounds = unit_cube();
        let stray = model.insert_piece(stray);

        calculate_model_dimensions(&mut model);

        assert_eq!(model.maxs.x, 1.0);
        assert!(model.piece(stray).unwrap().collision_volume.is_none());
    }

    #[test]
    fn test_model_without_geometry_has_zero_bounds() {
        let mut model = Model::new("empty");
        let root = model.insert_piece(Piece::new("R"));
        model.set_root_piece(root);

        calculate_model_dimensions(&mut model);

        assert_eq!(model.mins, Vec3::zeros());
        assert_eq!(model.maxs, Vec3::zeros());
    }

    #[test]
    fn test_property_defaults() {
        let (mut model, _, _) = turret_model();
        calculate_model_dimensions(&mut model);
        calculate_model_properties(&mut model, MetaTable::invalid(), &MarkerProperties::default());

        assert_relative_eq!(model.radius, Vec3::new(1.0, 3.0, 1.0).norm(), epsilon = 1e-6);
        assert_eq!(model.draw_radius, model.radius);
        assert_eq!(model.height, 3.0);
        assert_eq!(model.rel_mid_pos, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_marker_values_are_defaults() {
        let (mut model, _, _) = turret_model();
        let markers = MarkerProperties {
            height: Some(42.0),
            radius: Some(5.0),
            mid_pos: Some(Vec3::new(1.0, 9.0, -1.0)),
        };
        calculate_model_dimensions(&mut model);
        calculate_model_properties(&mut model, MetaTable::invalid(), &markers);

        assert_eq!(model.height, 42.0);
        assert_eq!(model.radius, 5.0);
        // Y always comes from the bounds
        assert_eq!(model.rel_mid_pos, Vec3::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn test_metadata_overrides() {
        let doc = Metadata::parse(
            "radius = 12.0\nheight = 8.0\nmidpos = [0.0, 1.0, 0.0]\n\
             mins = [-5.0, 0.0, -5.0]\nmaxs = [5.0, 10.0, 5.0]\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let (mut model, _, _) = turret_model();
        let markers = MarkerProperties {
            height: Some(42.0),
            ..Default::default()
        };
        calculate_model_dimensions(&mut model);
        calculate_model_properties(&mut model, doc.root(), &markers);

        assert_eq!(model.radius, 12.0);
        assert_eq!(model.draw_radius, 12.0);
        assert_eq!(model.height, 8.0);
        assert_eq!(model.rel_mid_pos, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(model.mins, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(model.maxs, Vec3::new(5.0, 10.0, 5.0));
    }
}
