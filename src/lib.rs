//! Parser for Biovision Hierarchy (`.bvh`) motion-capture files and a forward-kinematics
//! evaluator that turns any frame into world-space joint transforms.
//!
//! ```no_run
//! use bvh_pose::parse::load_bvh_from_file;
//! use bvh_pose::pose::evaluate;
//!
//! let (skeleton, motion) = load_bvh_from_file("walk.bvh")?;
//! let pose = evaluate(&skeleton, &motion, 0);
//! for joint in &skeleton.joints {
//!     println!("{}: {:?}", joint.name, pose.world_position(joint.index));
//! }
//! # Ok::<(), bvh_pose::error::BvhError>(())
//! ```

pub mod error;
pub mod parse;
pub mod pose;
pub mod types;
pub mod utils;

pub use error::{BvhError, FormatError};
pub use parse::{load_bvh_from_file, load_bvh_from_reader, load_bvh_from_string};
pub use pose::{bone_segments, evaluate, evaluate_into, rest_pose, Pose};
pub use types::{Channel, Joint, Motion, Skeleton};
