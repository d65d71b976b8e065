//! Geometry extraction
//!
//! Flattens every mesh referenced by a scene node into the piece's single
//! vertex/index space.

use crate::foundation::logging::{debug, trace, warn, PIECE};
use crate::import::{ImportedScene, SceneMesh, SceneNode, MAX_UV_CHANNELS};
use crate::model::{ModelVertex, Piece, AABB};

/// Append the geometry of every mesh on `node` to `piece`
pub(crate) fn load_piece_geometry(piece: &mut Piece, node: &SceneNode, scene: &ImportedScene) {
    for &mesh_index in &node.meshes {
        let Some(mesh) = scene.meshes.get(mesh_index) else {
            warn!(target: PIECE, "Node '{}' references missing mesh {}", node.name, mesh_index);
            continue;
        };

        debug!(
            target: PIECE,
            "Processing mesh {} ({} vertices, {} faces) normals: {} tangents: {} uvs: {}",
            mesh_index,
            mesh.positions.len(),
            mesh.faces.len(),
            !mesh.normals.is_empty(),
            mesh.has_tangents_and_bitangents(),
            mesh.has_tex_coords(0)
        );

        append_mesh(piece, mesh, mesh_index);
    }

    piece.has_geometry_data = !piece.vertices.is_empty();
}

fn append_mesh(piece: &mut Piece, mesh: &SceneMesh, mesh_index: usize) {
    piece.vertices.reserve(mesh.positions.len());
    piece.vertex_draw_indices.reserve(mesh.faces.len() * 3);

    // mesh-local vertex index -> piece-local vertex index
    let mut vertex_mapping = Vec::with_capacity(mesh.positions.len());

    let has_tangents = mesh.has_tangents_and_bitangents();
    let uv_channels = (0..MAX_UV_CHANNELS)
        .take_while(|&channel| mesh.has_tex_coords(channel))
        .count();
    piece.set_num_tex_coord_channels(uv_channels);

    for (index, position) in mesh.positions.iter().enumerate() {
        let mut vertex = ModelVertex {
            position: (*position).into(),
            ..Default::default()
        };

        match piece.bounds.as_mut() {
            Some(bounds) => bounds.extend(position),
            None => piece.bounds = Some(AABB::from_point(*position)),
        }

        if let Some(normal) = mesh.normals.get(index).filter(|n| !n.iter().any(|c| c.is_nan())) {
            vertex.normal = (*normal).into();
        }

        if has_tangents {
            if let (Some(tangent), Some(bitangent)) =
                (mesh.tangents.get(index), mesh.bitangents.get(index))
            {
                vertex.s_tangent = (*tangent).into();
                vertex.t_tangent = (*bitangent).into();
            }
        }

        for (channel, tex_coord) in vertex.tex_coords.iter_mut().enumerate().take(uv_channels) {
            if let Some(uv) = mesh.tex_coords[channel].get(index) {
                *tex_coord = [uv.x, uv.y];
            }
        }

        vertex_mapping.push(piece.vertices.len() as u32);
        piece.vertices.push(vertex);
    }

    for face in &mesh.faces {
        // lines and points cannot be drawn with the triangle list
        if face.len() != 3 {
            trace!(target: PIECE, "Dropping {}-index face of mesh {}", face.len(), mesh_index);
            continue;
        }

        let mapped: Option<Vec<u32>> = face
            .iter()
            .map(|&i| vertex_mapping.get(i as usize).copied())
            .collect();

        match mapped {
            Some(indices) => piece.vertex_draw_indices.extend(indices),
            None => warn!(
                target: PIECE,
                "Dropping face {:?} of mesh {}: index out of range", face, mesh_index
            ),
        }
    }
}
