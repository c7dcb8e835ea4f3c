use crate::types::{Block, Drawing, Entity, EntityKind, Transform};
use std::collections::HashMap;

/// Block inserts deeper than this are dropped; a drawing that legitimately
/// nests this far is not something the flattener needs to support, and a
/// self-referencing block would otherwise never terminate.
const MAX_INSERT_DEPTH: usize = 16;

fn gather(
    entities: &[Entity],
    blocks: &HashMap<&str, &Block>,
    transforms: &[Transform],
    depth: usize,
    out: &mut Vec<Entity>,
    warnings: &mut Vec<String>,
) {
    for entity in entities {
        match &entity.kind {
            EntityKind::Insert {
                block: block_name,
                x,
                y,
                x_scale,
                y_scale,
                rotation,
            } => {
                let Some(block) = blocks.get(block_name.as_str()) else {
                    warnings.push(format!("no block found for insert: {}", block_name));
                    continue;
                };
                if depth >= MAX_INSERT_DEPTH {
                    warnings.push(format!(
                        "insert of block {} exceeds maximum nesting depth, dropped",
                        block_name
                    ));
                    continue;
                }
                // The block's base point offsets the insertion point, so the
                // effective translation is their difference.
                let transform = Transform {
                    x_scale: *x_scale,
                    y_scale: *y_scale,
                    rotation: *rotation,
                    x: Some(x - block.x),
                    y: Some(y - block.y),
                };
                let mut inherited = transforms.to_vec();
                inherited.push(transform);
                gather(&block.entities, blocks, &inherited, depth + 1, out, warnings);
            }
            _ => {
                let mut flattened = entity.clone();
                flattened.transforms = transforms.to_vec();
                out.push(flattened);
            }
        }
    }
}

/// Flatten every block reference in a drawing into plain entities. Each
/// emitted entity carries the transform list inherited from its enclosing
/// insertions, outer-to-inner. Inserts naming an unknown block are skipped
/// with a warning.
pub fn denormalise(drawing: &Drawing, warnings: &mut Vec<String>) -> Vec<Entity> {
    let blocks: HashMap<&str, &Block> = drawing
        .blocks
        .iter()
        .map(|block| (block.name.as_str(), block))
        .collect();
    let mut out = Vec::new();
    gather(&drawing.entities, &blocks, &[], 0, &mut out, warnings);
    out
}

/// Group denormalised entities by layer name, preserving their order within
/// each layer.
pub fn group_entities_by_layer(entities: Vec<Entity>) -> HashMap<String, Vec<Entity>> {
    let mut groups: HashMap<String, Vec<Entity>> = HashMap::new();
    for entity in entities {
        groups.entry(entity.layer.clone()).or_default().push(entity);
    }
    groups
}
