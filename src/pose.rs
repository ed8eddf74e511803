use crate::types::*;
use crate::utils;

/// World matrices of every joint at one frame, indexed like `Skeleton::joints`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub world_matrices: Vec<Matrix>,
}

impl Pose {
    pub fn new() -> Self {
        Pose {
            world_matrices: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.world_matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world_matrices.is_empty()
    }

    pub fn world_matrix(&self, joint_index: Index) -> &Matrix {
        &self.world_matrices[joint_index]
    }

    /// World position of a joint (translation column of its world matrix).
    pub fn world_position(&self, joint_index: Index) -> Position {
        utils::translation_of(&self.world_matrices[joint_index])
    }

    pub fn positions(&self) -> Vec<Position> {
        self.world_matrices.iter().map(utils::translation_of).collect()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::new()
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// Forward kinematics for one frame.
///
/// Every joint's local matrix is its offset translation followed by its channels, applied in
/// the order they were declared in the file; its world matrix is `parent_world * local`.
///
/// # Panics
/// If `frame >= motion.num_frames` or if `motion` was not parsed together with `skeleton`
/// (channel counts differ). The evaluator never wraps or clamps frame indices.
pub fn evaluate(skeleton: &Skeleton, motion: &Motion, frame: usize) -> Pose {
    let mut pose = Pose::new();
    evaluate_into(skeleton, motion, frame, &mut pose);
    pose
}

/// Same as [`evaluate`] but reuses the allocation of `pose`.
pub fn evaluate_into(skeleton: &Skeleton, motion: &Motion, frame: usize, pose: &mut Pose) {
    assert_eq!(
        skeleton.num_channels(),
        motion.num_channels,
        "motion rows do not match the skeleton's channel layout"
    );
    let row = motion.frame(frame);
    compose(skeleton, Some(row), pose);
}

/// Bind pose: offsets only, every channel taken as zero.
pub fn rest_pose(skeleton: &Skeleton) -> Pose {
    let mut pose = Pose::new();
    compose(skeleton, None, &mut pose);
    pose
}

/// Walk the arena in pre-order so that parents are final before their children.
fn compose(skeleton: &Skeleton, row: Option<&[f64]>, pose: &mut Pose) {
    pose.world_matrices.clear();
    pose.world_matrices.reserve(skeleton.len());

    for joint in skeleton.joints.iter() {
        let local = match row {
            Some(row) => {
                utils::local_transform(joint.offset, &joint.channels, &row[joint.channel_range()])
            }
            None => utils::local_transform(joint.offset, &[], &[]),
        };
        let world = match joint.parent {
            Some(parent) => {
                debug_assert!(parent < joint.index, "joint arena is not in pre-order");
                pose.world_matrices[parent] * local
            }
            None => local,
        };
        pose.world_matrices.push(world);
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// One (parent position, joint position) segment per non-root joint, for line renderers.
pub fn bone_segments(skeleton: &Skeleton, pose: &Pose) -> Vec<(Position, Position)> {
    skeleton
        .joints
        .iter()
        .filter_map(|joint| {
            joint
                .parent
                .map(|parent| (pose.world_position(parent), pose.world_position(joint.index)))
        })
        .collect()
}
