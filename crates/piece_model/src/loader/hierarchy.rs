//! Second pass: parent/child linking
//!
//! Runs only after every piece exists, since a metadata-declared parent may
//! have been built after its child.

use crate::foundation::logging::{error, trace, warn, PIECE};
use crate::model::{Model, PieceId};

/// Resolve the recorded parent names of every piece into links
///
/// Pieces are visited in creation order. A piece whose declared parent does
/// not exist, or whose link would close a cycle, is left detached together
/// with everything linked below it.
pub(crate) fn build_piece_hierarchy(model: &mut Model) {
    let root = model.root_id();

    for id in model.piece_ids() {
        if Some(id) == root {
            continue;
        }
        let Some((name, parent_name)) =
            model.piece(id).map(|p| (p.name.clone(), p.parent_name.clone()))
        else {
            continue;
        };

        if parent_name.is_empty() {
            match root {
                Some(root) => {
                    model.attach(id, root);
                }
                None => error!(
                    target: PIECE,
                    "Missing root piece for orphan '{}' of '{}'", name, model.name
                ),
            }
            continue;
        }

        match model.find_piece_id(&parent_name) {
            Some(parent) if is_ancestor_or_self(model, id, parent) => {
                error!(
                    target: PIECE,
                    "Parent '{}' of piece '{}' would create a cycle in '{}'; piece left detached",
                    parent_name,
                    name,
                    model.name
                );
            }
            Some(parent) => {
                model.attach(id, parent);
                trace!(target: PIECE, "Linked piece '{}' under '{}'", name, parent_name);
            }
            None => {
                error!(
                    target: PIECE,
                    "Missing piece '{}' declared as parent of '{}' in '{}'",
                    parent_name,
                    name,
                    model.name
                );
            }
        }
    }

    let stranded: Vec<&str> = model
        .pieces()
        .filter(|(id, _)| model.is_detached(*id))
        .map(|(_, piece)| piece.name.as_str())
        .collect();
    if !stranded.is_empty() {
        warn!(
            target: PIECE,
            "Pieces outside the hierarchy of '{}': {}",
            model.name,
            stranded.join(", ")
        );
    }
}

/// Whether `candidate` is `id` or already sits below it
fn is_ancestor_or_self(model: &Model, id: PieceId, candidate: PieceId) -> bool {
    let mut current = Some(candidate);
    while let Some(cursor) = current {
        if cursor == id {
            return true;
        }
        current = model.piece(cursor).and_then(|piece| piece.parent);
    }
    false
}
