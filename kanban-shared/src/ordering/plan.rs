/// In-memory move planning
///
/// A move is planned on plain vectors of ids, ordered by their current
/// index: the target is spliced out of its source container, spliced into the
/// destination at the slot implied by its anchors, and every affected
/// container is then numbered `0..k-1` by position. Nothing here touches
/// storage; [`super::store`] loads the vectors under lock and writes the
/// result back.
///
/// # Anchors
///
/// | previous | next   | Slot                                             |
/// |----------|--------|--------------------------------------------------|
/// | none     | none   | only valid when the destination is empty         |
/// | none     | `n`    | head; `n` must be the current head               |
/// | `p`      | none   | tail; `p` must be the current tail               |
/// | `p`      | `n`    | between them; they must be adjacent              |
///
/// Anchors are looked up after the target has been removed, so passing the
/// target's own neighbours is a valid request that changes nothing.
///
/// # Example
///
/// ```
/// use kanban_shared::ordering::plan::{plan_move, Anchors};
///
/// let c1 = vec![1, 2]; // card A, card B
/// let c2 = vec![3];    // card C
///
/// let plan = plan_move(&c1, Some(c2.as_slice()), 2, Anchors { previous: None, next: Some(3) }).unwrap();
/// assert_eq!(plan.source, vec![1]);
/// assert_eq!(plan.destination, Some(vec![2, 3]));
/// ```

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Move request as sent by clients
///
/// `I` is the item id type, `C` the container id type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest<I, C> {
    pub target_id: I,

    /// Destination container; `None` keeps the item where it is
    #[serde(default)]
    pub new_container_id: Option<C>,

    #[serde(default)]
    pub previous_id: Option<I>,

    #[serde(default)]
    pub next_id: Option<I>,
}

impl<I: Copy, C> MoveRequest<I, C> {
    pub fn anchors(&self) -> Anchors<I> {
        Anchors {
            previous: self.previous_id,
            next: self.next_id,
        }
    }
}

/// Neighbours the moved item should land between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors<I> {
    pub previous: Option<I>,
    pub next: Option<I>,
}

impl<I: Copy> Anchors<I> {
    pub fn ids(&self) -> impl Iterator<Item = I> {
        self.previous.into_iter().chain(self.next)
    }
}

/// Resulting order of every affected container
///
/// Position in each vector is the new `order_index`. `destination` is `None`
/// for a move within one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan<I> {
    pub source: Vec<I>,
    pub destination: Option<Vec<I>>,
}

impl<I: Copy> MovePlan<I> {
    /// Final `(id, order_index)` pairs of the source container
    pub fn source_placements(&self) -> Vec<(I, i32)> {
        renumber(&self.source)
    }

    /// Final `(id, order_index)` pairs of the destination container, if any
    pub fn destination_placements(&self) -> Option<Vec<(I, i32)>> {
        self.destination.as_deref().map(renumber)
    }
}

/// Numbers items `0..k-1` in their current order
pub fn renumber<I: Copy>(items: &[I]) -> Vec<(I, i32)> {
    items
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect()
}

/// Plans moving `target` out of `source` into `destination`
///
/// `destination` is `None` for a move within `source`.
///
/// # Errors
///
/// - `NotFound` when `target` is not in `source`
/// - `Validation` when an anchor is the target itself, is not in the
///   destination, or the anchors do not describe a single slot
pub fn plan_move<I>(
    source: &[I],
    destination: Option<&[I]>,
    target: I,
    anchors: Anchors<I>,
) -> CoreResult<MovePlan<I>>
where
    I: Copy + Eq + Display,
{
    if anchors.ids().any(|anchor| anchor == target) {
        return Err(CoreError::validation(format!("{} cannot be its own anchor", target)));
    }

    let position = source
        .iter()
        .position(|id| *id == target)
        .ok_or_else(|| CoreError::not_found(target))?;

    let mut source_items = source.to_vec();
    source_items.remove(position);

    match destination {
        None => {
            let slot = insertion_slot(&source_items, anchors)?;
            source_items.insert(slot, target);
            Ok(MovePlan {
                source: source_items,
                destination: None,
            })
        }
        Some(destination) => {
            // Callers pass distinct containers, so the target is never in here
            let mut destination_items: Vec<I> =
                destination.iter().copied().filter(|id| *id != target).collect();
            let slot = insertion_slot(&destination_items, anchors)?;
            destination_items.insert(slot, target);
            Ok(MovePlan {
                source: source_items,
                destination: Some(destination_items),
            })
        }
    }
}

/// Index at which the moved item goes in `items` (target already removed)
fn insertion_slot<I>(items: &[I], anchors: Anchors<I>) -> CoreResult<usize>
where
    I: Copy + Eq + Display,
{
    let locate = |anchor: I| {
        items
            .iter()
            .position(|id| *id == anchor)
            .ok_or_else(|| CoreError::validation(format!("anchor {} is not in the destination", anchor)))
    };

    match (anchors.previous, anchors.next) {
        (None, None) => {
            if items.is_empty() {
                Ok(0)
            } else {
                Err(CoreError::validation(
                    "destination is not empty; previous or next anchor required",
                ))
            }
        }
        (None, Some(next)) => {
            if locate(next)? == 0 {
                Ok(0)
            } else {
                Err(CoreError::validation(format!(
                    "no previous anchor given but {} is not the first item",
                    next
                )))
            }
        }
        (Some(previous), None) => {
            let index = locate(previous)?;
            if index + 1 == items.len() {
                Ok(items.len())
            } else {
                Err(CoreError::validation(format!(
                    "no next anchor given but {} is not the last item",
                    previous
                )))
            }
        }
        (Some(previous), Some(next)) => {
            let before = locate(previous)?;
            let after = locate(next)?;
            if after == before + 1 {
                Ok(after)
            } else {
                Err(CoreError::validation(format!(
                    "anchors {} and {} are not adjacent",
                    previous, next
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(previous: Option<u32>, next: Option<u32>) -> Anchors<u32> {
        Anchors { previous, next }
    }

    fn assert_validation<T: std::fmt::Debug>(result: CoreResult<T>) {
        assert!(
            matches!(result, Err(CoreError::Validation(_))),
            "expected validation error, got {:?}",
            result
        );
    }

    #[test]
    fn test_cross_column_scenario() {
        // C1 = [A, B], C2 = [C]; move B to the head of C2
        let (a, b, c) = (1, 2, 3);
        let plan = plan_move(&[a, b], Some(&[c][..]), b, anchors(None, Some(c))).unwrap();

        assert_eq!(plan.source_placements(), vec![(a, 0)]);
        assert_eq!(plan.destination_placements(), Some(vec![(b, 0), (c, 1)]));
    }

    #[test]
    fn test_move_within_column() {
        let items = [10, 20, 30, 40];

        let plan = plan_move(&items, None, 40, anchors(Some(10), Some(20))).unwrap();
        assert_eq!(plan.source, vec![10, 40, 20, 30]);
        assert!(plan.destination.is_none());

        let plan = plan_move(&items, None, 10, anchors(Some(40), None)).unwrap();
        assert_eq!(plan.source, vec![20, 30, 40, 10]);

        let plan = plan_move(&items, None, 30, anchors(None, Some(10))).unwrap();
        assert_eq!(plan.source, vec![30, 10, 20, 40]);
    }

    #[test]
    fn test_move_to_own_slot_is_noop() {
        let items = [1, 2, 3];

        let plan = plan_move(&items, None, 2, anchors(Some(1), Some(3))).unwrap();
        assert_eq!(plan.source, items.to_vec());

        let plan = plan_move(&items, None, 1, anchors(None, Some(2))).unwrap();
        assert_eq!(plan.source, items.to_vec());

        let plan = plan_move(&items, None, 3, anchors(Some(2), None)).unwrap();
        assert_eq!(plan.source, items.to_vec());
    }

    #[test]
    fn test_only_item_moves_into_empty_column() {
        let plan = plan_move(&[7], Some(&[][..]), 7, anchors(None, None)).unwrap();
        assert!(plan.source.is_empty());
        assert_eq!(plan.destination_placements(), Some(vec![(7, 0)]));

        let plan = plan_move(&[7], None, 7, anchors(None, None)).unwrap();
        assert_eq!(plan.source_placements(), vec![(7, 0)]);
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let result = plan_move(&[1, 2], None, 9, anchors(None, Some(1)));
        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_self_anchor_rejected() {
        assert_validation(plan_move(&[1, 2, 3], None, 2, anchors(Some(2), None)));
        assert_validation(plan_move(&[1, 2, 3], None, 2, anchors(None, Some(2))));
    }

    #[test]
    fn test_anchor_outside_destination_rejected() {
        // 3 lives in the source, not the destination
        assert_validation(plan_move(&[1, 2, 3], Some(&[4, 5][..]), 2, anchors(Some(3), None)));
        assert_validation(plan_move(&[1, 2], None, 1, anchors(None, Some(99))));
    }

    #[test]
    fn test_non_adjacent_anchors_rejected() {
        assert_validation(plan_move(&[1, 2, 3, 4], None, 1, anchors(Some(2), Some(4))));
        // Reversed order is not adjacent either
        assert_validation(plan_move(&[1, 2, 3], None, 1, anchors(Some(3), Some(2))));
    }

    #[test]
    fn test_partial_anchor_must_be_at_edge() {
        // No previous: next must be the head
        assert_validation(plan_move(&[1, 2, 3], None, 1, anchors(None, Some(3))));
        // No next: previous must be the tail
        assert_validation(plan_move(&[1, 2, 3], None, 3, anchors(Some(1), None)));
    }

    #[test]
    fn test_no_anchors_into_non_empty_rejected() {
        assert_validation(plan_move(&[1], Some(&[2][..]), 1, anchors(None, None)));
    }

    #[test]
    fn test_renumber_is_dense() {
        assert_eq!(renumber(&[5, 3, 9]), vec![(5, 0), (3, 1), (9, 2)]);
        assert!(renumber::<u32>(&[]).is_empty());
    }

    #[test]
    fn test_move_request_defaults() {
        let request: MoveRequest<u32, u32> = serde_json::from_str(r#"{"target_id": 4}"#).unwrap();
        assert_eq!(request.target_id, 4);
        assert_eq!(request.new_container_id, None);
        assert_eq!(request.anchors(), anchors(None, None));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    /// Builds a source/destination pair of distinct ids and a valid request
    fn scenario() -> impl Strategy<Value = (Vec<u32>, Vec<u32>, usize, usize, bool)> {
        (1usize..12, 0usize..12, any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<bool>())
            .prop_map(|(source_len, destination_len, target, slot, cross)| {
                let source: Vec<u32> = (0..source_len as u32).collect();
                let destination: Vec<u32> = (100..100 + destination_len as u32).collect();
                let target = target.index(source_len);
                let slot_range = if cross { destination_len + 1 } else { source_len };
                (source, destination, target, slot.index(slot_range), cross)
            })
    }

    /// Anchors that put the moved item at `slot` of `items`
    fn anchors_for_slot(items: &[u32], slot: usize) -> Anchors<u32> {
        Anchors {
            previous: slot.checked_sub(1).map(|index| items[index]),
            next: items.get(slot).copied(),
        }
    }

    fn is_dense(placements: &[(u32, i32)]) -> bool {
        placements
            .iter()
            .enumerate()
            .all(|(position, (_, index))| *index == position as i32)
    }

    proptest! {
        #[test]
        fn moves_keep_containers_dense((source, destination, target, slot, cross) in scenario()) {
            let moved = source[target];
            let remaining: Vec<u32> = source.iter().copied().filter(|id| *id != moved).collect();

            let plan = if cross {
                let anchors = anchors_for_slot(&destination, slot);
                plan_move(&source, Some(destination.as_slice()), moved, anchors).unwrap()
            } else {
                let anchors = anchors_for_slot(&remaining, slot);
                plan_move(&source, None, moved, anchors).unwrap()
            };

            let source_placements = plan.source_placements();
            prop_assert!(is_dense(&source_placements));

            match plan.destination_placements() {
                Some(destination_placements) => {
                    prop_assert!(is_dense(&destination_placements));
                    prop_assert_eq!(source_placements.len(), source.len() - 1);
                    prop_assert_eq!(destination_placements.len(), destination.len() + 1);
                    prop_assert_eq!(plan.destination.as_ref().map(|d| d[slot]), Some(moved));
                }
                None => {
                    prop_assert_eq!(source_placements.len(), source.len());
                    prop_assert_eq!(plan.source[slot], moved);
                }
            }
        }
    }
}
