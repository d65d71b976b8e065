//! Piece transform decomposition
//!
//! Importer matrices are T * R * S. The translation and scale end up in the
//! piece's `offset` and `scales`; only the rotation is baked into a matrix.

use crate::foundation::logging::{trace, warn, PIECE};
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, Transform, Vec3};
use crate::metadata::MetaTable;
use crate::model::{AxisMapping, Piece};

/// Squared-length tolerance for accepting a root basis override
const ROOT_AXIS_TOLERANCE: f32 = 0.01;

/// Tolerance of the baked-rotation orthonormality check
const ORTHONORMAL_TOLERANCE: f32 = 1e-3;

/// Fill the transform state of `piece` from its node matrix and metadata
pub(crate) fn load_piece_transformations(
    piece: &mut Piece,
    node_transform: &Mat4,
    piece_table: MetaTable<'_>,
    is_root: bool,
) {
    let imported = Transform::from_matrix(node_transform);

    // metadata-scaling
    let mut scales = piece_table.get_float3("scale", imported.scale);
    scales.x = piece_table.get_float("scalex", scales.x);
    scales.y = piece_table.get_float("scaley", scales.y);
    scales.z = piece_table.get_float("scalez", scales.z);

    if scales.x != scales.y || scales.y != scales.z {
        trace!(target: PIECE, "Non-uniform scale {:?} on '{}' collapsed to X", scales, piece.name);
        scales.y = scales.x;
        scales.z = scales.x;
    }
    piece.scales = scales;

    // metadata-translation
    let mut offset = piece_table.get_float3("offset", imported.position);
    offset.x = piece_table.get_float("offsetx", offset.x);
    offset.y = piece_table.get_float("offsety", offset.y);
    offset.z = piece_table.get_float("offsetz", offset.z);
    piece.offset = offset;

    // metadata-rotation: applied after modelling but before any animation
    let mut pose = piece_table.get_float3("rotate", Vec3::zeros());
    pose.x = piece_table.get_float("rotatex", pose.x);
    pose.y = piece_table.get_float("rotatey", pose.y);
    pose.z = piece_table.get_float("rotatez", pose.z);
    piece.pose_rotation = pose * constants::DEG_TO_RAD;

    let imported_angles =
        utils::quaternion_to_radian_angles(&imported.rotation) * constants::RAD_TO_DEG;
    trace!(
        target: PIECE,
        "({}) Imported offset {:?}, rotate {:?} (deg), scale {:?}",
        piece.name, imported.position, imported_angles, imported.scale
    );
    trace!(
        target: PIECE,
        "({}) Relative offset {:?}, rotate {:?} (deg), scale {:?}",
        piece.name, piece.offset, pose, piece.scales
    );

    let mut baked = imported.rotation.to_homogeneous();

    // exporters disagree on the up axis; the root basis may be overridden
    if is_root {
        let x_axis = piece_table.get_float3("xaxis", baked.basis_axis(0));
        let y_axis = piece_table.get_float3("yaxis", baked.basis_axis(1));
        let z_axis = piece_table.get_float3("zaxis", baked.basis_axis(2));

        let (x_sq, y_sq, z_sq) =
            (x_axis.norm_squared(), y_axis.norm_squared(), z_axis.norm_squared());
        if (x_sq - y_sq).abs() < ROOT_AXIS_TOLERANCE && (y_sq - z_sq).abs() < ROOT_AXIS_TOLERANCE {
            baked = Mat4::from_basis(&x_axis, &y_axis, &z_axis);
        } else {
            warn!(
                target: PIECE,
                "Ignoring root axis override of '{}': axes differ in length ({}, {}, {})",
                piece.name, x_sq, y_sq, z_sq
            );
        }
    }

    piece.rot_axis_signs = piece_table.get_float3("rotAxisSigns", Vec3::new(-1.0, -1.0, -1.0));

    let axis_map_index = piece_table.get_int("rotAxisMap", 0);
    piece.axis_map_type = AxisMapping::from_index(axis_map_index).unwrap_or_else(|| {
        warn!(
            target: PIECE,
            "Invalid rotAxisMap {} on '{}', using XYZ", axis_map_index, piece.name
        );
        AxisMapping::default()
    });

    piece.baked_rot_matrix = piece.compose_rotation(&baked, &piece.pose_rotation);
    piece.has_identity_rotation = piece.baked_rot_matrix == Mat4::identity();

    debug_assert!(
        utils::is_orthonormal(&piece.baked_rot_matrix, ORTHONORMAL_TOLERANCE),
        "baked rotation of piece '{}' is not orthonormal: {}",
        piece.name,
        piece.baked_rot_matrix
    );
}
