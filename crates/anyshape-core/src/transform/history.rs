//! Linear undo/redo history of committed transforms.

use super::Transform;

/// Ordered snapshots of committed transforms with a cursor.
///
/// The cursor always points at a valid entry, and the entry under the
/// cursor is the committed transform. A commit after undoing discards
/// the redo branch.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformHistory {
    entries: Vec<Transform>,
    index: usize,
}

impl Default for TransformHistory {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl TransformHistory {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Transform) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    /// The committed transform under the cursor.
    pub fn current(&self) -> Transform {
        self.entries[self.index]
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of snapshots, including any redo branch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All snapshots in commit order.
    pub fn entries(&self) -> &[Transform] {
        &self.entries
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Append `transform`, dropping everything after the cursor first.
    pub fn commit(&mut self, transform: Transform) {
        self.entries.truncate(self.index + 1);
        self.entries.push(transform);
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the new current transform, or `None`
    /// when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Transform> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward one entry. Returns the new current transform, or `None`
    /// when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Transform> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Commit the identity transform.
    pub fn reset(&mut self) -> Transform {
        self.commit(Transform::IDENTITY);
        Transform::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(s: f64) -> Transform {
        Transform::IDENTITY.with_scale(s)
    }

    #[test]
    fn test_new_history() {
        let h = TransformHistory::default();
        assert_eq!(h.len(), 1);
        assert_eq!(h.index(), 0);
        assert!(!h.is_empty());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.current().is_identity());
    }

    #[test]
    fn test_undo_redo_noop_at_bounds() {
        let mut h = TransformHistory::default();
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        assert_eq!(h.index(), 0);
    }

    #[test]
    fn test_commit_after_undo_discards_branch() {
        let mut h = TransformHistory::default();
        h.commit(scaled(1.5));
        h.commit(scaled(2.0));
        assert_eq!(h.len(), 3);

        assert_eq!(h.undo(), Some(scaled(1.5)));
        h.commit(scaled(3.0));

        // initial, 1.5, 3.0
        assert_eq!(h.len(), 3);
        assert_eq!(h.current(), scaled(3.0));
        assert!(!h.can_redo());
        assert_eq!(h.redo(), None);
        assert_eq!(h.entries()[1], scaled(1.5));
    }

    #[test]
    fn test_reset_commits_identity() {
        let mut h = TransformHistory::default();
        h.commit(scaled(2.0).with_rotation(90.0).panned(10.0, 10.0));
        let t = h.reset();
        assert!(t.is_identity());
        assert!(h.current().is_identity());
        assert_eq!(h.len(), 3);

        // Reset is itself undoable
        assert_eq!(h.undo().map(|t| t.rotation), Some(90.0));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn transform_strategy() -> impl Strategy<Value = Transform> {
        (
            0.1f64..5.0,
            -400.0f64..400.0,
            -400.0f64..400.0,
            -180.0f64..180.0,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(scale, x, y, rotation, fh, fv)| Transform {
                scale,
                translate_x: x,
                translate_y: y,
                rotation,
                flip_horizontal: fh,
                flip_vertical: fv,
            })
    }

    proptest! {
        /// Property: N undos then N redos walks the commit sequence exactly.
        #[test]
        fn prop_linear_round_trip(commits in prop::collection::vec(transform_strategy(), 1..30)) {
            let mut h = TransformHistory::default();
            for t in &commits {
                h.commit(*t);
            }
            let n = commits.len();

            for i in (0..n).rev() {
                let expected = if i == 0 { Transform::IDENTITY } else { commits[i - 1] };
                prop_assert_eq!(h.undo(), Some(expected));
            }
            prop_assert_eq!(h.undo(), None);

            for t in &commits {
                prop_assert_eq!(h.redo(), Some(*t));
            }
            prop_assert_eq!(h.redo(), None);
            prop_assert_eq!(h.current(), commits[n - 1]);
        }

        /// Property: The cursor is always in range.
        #[test]
        fn prop_index_in_range(ops in prop::collection::vec(0u8..3, 0..60)) {
            let mut h = TransformHistory::default();
            for (i, op) in ops.into_iter().enumerate() {
                match op {
                    0 => h.commit(Transform::IDENTITY.panned(i as f64, 0.0)),
                    1 => { h.undo(); }
                    _ => { h.redo(); }
                }
                prop_assert!(h.index() < h.len());
                prop_assert_eq!(h.current(), h.entries()[h.index()]);
            }
        }
    }
}
