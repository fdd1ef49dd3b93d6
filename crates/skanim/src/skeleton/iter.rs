//! Hierarchy traversal over the pre-order joint arena
//!
//! Every query here is index arithmetic over the arena: the first child of
//! joint `i` is `i + 1`, and the next sibling of child `c` is
//! `c + 1 + descendant_count(c)`.

use std::iter::FusedIterator;
use std::ops::RangeInclusive;

use super::hierarchy::Skeleton;
use super::joint::Joint;

/// Iterator over the direct children of a joint, first to last
#[derive(Debug, Clone)]
pub struct Children<'a> {
    joints: &'a [Joint],
    next: usize,
    end: usize,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next > self.end {
            return None;
        }
        let current = self.next;
        self.next = current + 1 + self.joints[current].descendant_count;
        Some(current)
    }
}

impl FusedIterator for Children<'_> {}

/// Iterator from a joint's parent up to the root
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    joints: &'a [Joint],
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.joints[current].parent;
        Some(current)
    }
}

impl FusedIterator for Ancestors<'_> {}

impl Skeleton {
    /// Joints with their indices, in pre-order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Joint)> {
        self.joints().iter().enumerate()
    }

    /// Direct children of `index`. Empty for an invalid index.
    pub fn children(&self, index: usize) -> Children<'_> {
        let joints = self.joints();
        let (next, end) = joints
            .get(index)
            .map_or((1, 0), |joint| (index + 1, index + joint.descendant_count));
        Children { joints, next, end }
    }

    /// Parent, grandparent and so on up to the root
    pub fn ancestors(&self, index: usize) -> Ancestors<'_> {
        let joints = self.joints();
        Ancestors {
            joints,
            next: joints.get(index).and_then(Joint::parent),
        }
    }

    /// Indices of every descendant of `index`, which are contiguous
    pub fn descendants(&self, index: usize) -> Option<RangeInclusive<usize>> {
        let joint = self.joint(index)?;
        if joint.descendant_count == 0 {
            return None;
        }
        Some(index + 1..=index + joint.descendant_count)
    }

    /// The `nth` child of `index`
    pub fn child(&self, index: usize, nth: usize) -> Option<usize> {
        self.children(index).nth(nth)
    }

    pub fn child_count(&self, index: usize) -> usize {
        self.children(index).count()
    }

    pub fn last_child(&self, index: usize) -> Option<usize> {
        self.children(index).last()
    }

    /// The sibling immediately before `index` under the same parent
    pub fn left_sibling(&self, index: usize) -> Option<usize> {
        let parent = self.joint(index)?.parent?;
        self.children(parent)
            .take_while(|&child| child < index)
            .last()
    }

    /// Whether `ancestor` is `index` or one of its ancestors
    pub fn is_in_subtree(&self, index: usize, ancestor: usize) -> bool {
        self.joint(ancestor)
            .is_some_and(|joint| index >= ancestor && index <= ancestor + joint.descendant_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// root
    /// ├── spine
    /// │   ├── arm_l
    /// │   │   └── hand_l
    /// │   └── arm_r
    /// └── leg
    fn body() -> Skeleton {
        let mut skeleton = Skeleton::with_root_name("body", "root");
        let spine = skeleton.add_child(0, Joint::new("spine")).unwrap();
        skeleton.add_child(0, Joint::new("leg")).unwrap();
        let arm_l = skeleton.add_child(spine, Joint::new("arm_l")).unwrap();
        skeleton.add_child(spine, Joint::new("arm_r")).unwrap();
        skeleton.add_child(arm_l, Joint::new("hand_l")).unwrap();
        skeleton
    }

    fn idx(skeleton: &Skeleton, name: &str) -> usize {
        skeleton.find_joint(name).unwrap()
    }

    #[test]
    fn test_iter_is_pre_order() {
        let skeleton = body();
        let names: Vec<&str> = skeleton.iter().map(|(_, joint)| joint.name()).collect();
        assert_eq!(names, vec!["root", "spine", "arm_l", "hand_l", "arm_r", "leg"]);
    }

    #[test]
    fn test_children() {
        let skeleton = body();
        let spine = idx(&skeleton, "spine");
        let children: Vec<usize> = skeleton.children(spine).collect();
        assert_eq!(children, vec![idx(&skeleton, "arm_l"), idx(&skeleton, "arm_r")]);
        assert_eq!(skeleton.child_count(0), 2);
        assert_eq!(skeleton.child_count(idx(&skeleton, "leg")), 0);
        assert_eq!(skeleton.children(99).count(), 0);
    }

    #[test]
    fn test_child_and_last_child() {
        let skeleton = body();
        assert_eq!(skeleton.child(0, 0), Some(idx(&skeleton, "spine")));
        assert_eq!(skeleton.child(0, 1), Some(idx(&skeleton, "leg")));
        assert_eq!(skeleton.child(0, 2), None);
        assert_eq!(skeleton.last_child(0), Some(idx(&skeleton, "leg")));
        assert_eq!(skeleton.last_child(idx(&skeleton, "hand_l")), None);
    }

    #[test]
    fn test_left_sibling() {
        let skeleton = body();
        assert_eq!(
            skeleton.left_sibling(idx(&skeleton, "arm_r")),
            Some(idx(&skeleton, "arm_l"))
        );
        assert_eq!(
            skeleton.left_sibling(idx(&skeleton, "leg")),
            Some(idx(&skeleton, "spine"))
        );
        assert_eq!(skeleton.left_sibling(idx(&skeleton, "arm_l")), None);
        assert_eq!(skeleton.left_sibling(0), None);
    }

    #[test]
    fn test_ancestors() {
        let skeleton = body();
        let chain: Vec<&str> = skeleton
            .ancestors(idx(&skeleton, "hand_l"))
            .map(|i| skeleton.joint(i).unwrap().name())
            .collect();
        assert_eq!(chain, vec!["arm_l", "spine", "root"]);
        assert_eq!(skeleton.ancestors(0).count(), 0);
    }

    #[test]
    fn test_descendants_range() {
        let skeleton = body();
        assert_eq!(skeleton.descendants(idx(&skeleton, "spine")), Some(2..=4));
        assert_eq!(skeleton.descendants(idx(&skeleton, "leg")), None);
        assert!(skeleton.is_in_subtree(idx(&skeleton, "hand_l"), idx(&skeleton, "spine")));
        assert!(!skeleton.is_in_subtree(idx(&skeleton, "leg"), idx(&skeleton, "spine")));
    }

    #[test]
    fn test_left_sibling_after_insert_between() {
        // Appending under spine must land after arm_r's subtree and before leg
        let mut skeleton = body();
        let spine = idx(&skeleton, "spine");
        let extra = skeleton.add_child(spine, Joint::new("neck")).unwrap();
        assert_eq!(extra, idx(&skeleton, "leg") - 1);
        assert_eq!(skeleton.left_sibling(extra), Some(idx(&skeleton, "arm_r")));
    }
}
