use cgmath::{Matrix4, Vector3};
use std::fmt;

/////////////////////////////////////////////////////////////////////////////////////////////////

pub type Index = usize;
pub type Depth = usize;
pub type Position = Vector3<f64>;
pub type Matrix = Matrix4<f64>;

/// Name given to the leaf joints synthesized from `End Site` blocks.
pub const END_SITE_NAME: &str = "EndSite";

/////////////////////////////////////////////////////////////////////////////////////////////////

/// One degree of freedom a joint reads from every motion row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Xposition,
    Yposition,
    Zposition,
    Xrotation,
    Yrotation,
    Zrotation,
}

impl Channel {
    /// Map a `CHANNELS` token to its kind. Names are case sensitive, as written by exporters.
    pub fn from_name(name: &str) -> Option<Channel> {
        match name {
            "Xposition" => Some(Channel::Xposition),
            "Yposition" => Some(Channel::Yposition),
            "Zposition" => Some(Channel::Zposition),
            "Xrotation" => Some(Channel::Xrotation),
            "Yrotation" => Some(Channel::Yrotation),
            "Zrotation" => Some(Channel::Zrotation),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Xposition => "Xposition",
            Channel::Yposition => "Yposition",
            Channel::Zposition => "Zposition",
            Channel::Xrotation => "Xrotation",
            Channel::Yrotation => "Yrotation",
            Channel::Zrotation => "Zrotation",
        }
    }

    pub fn is_rotation(&self) -> bool {
        matches!(
            self,
            Channel::Xrotation | Channel::Yrotation | Channel::Zrotation
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub index: Index,
    pub parent: Option<Index>, // None only for the root
    pub depth: Depth,
    pub offset: Position,
    pub channels: Vec<Channel>,
    pub channel_start: Index,
    pub children: Vec<Index>,
    pub is_end_site: bool,
}

impl Joint {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Columns of a motion row owned by this joint.
    pub fn channel_range(&self) -> std::ops::Range<Index> {
        self.channel_start..self.channel_start + self.channels.len()
    }
}

/// Joint hierarchy stored as an arena in depth-first pre-order.
/// Index 0 is the root and every parent precedes its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub joints: Vec<Joint>,
}

impl Skeleton {
    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn find_joint_by_index(&self, index: Index) -> &Joint {
        &self.joints[index]
    }

    /// First joint (in pre-order) with the given name.
    pub fn find_joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|joint| joint.name == name)
    }

    pub fn parent_of(&self, index: Index) -> Option<&Joint> {
        self.joints[index].parent.map(|parent| &self.joints[parent])
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|joint| joint.name.as_str()).collect()
    }

    /// Total number of channels in one motion row.
    pub fn num_channels(&self) -> usize {
        self.joints.iter().map(Joint::num_channels).sum()
    }

    /// Returns the kinematic chains like \[\[0,1,2,3\],\[0,4,5,6\],\[0,7,8,9,10\]\].
    /// A chain breaks wherever a joint is not the child of the joint visited just before it;
    /// the new chain then starts with that joint's parent so that linestrips connect.
    pub fn kinematic_chains(&self) -> Vec<Vec<Index>> {
        let mut kinematic_chains: Vec<Vec<Index>> = Vec::new();
        let mut chain: Vec<Index> = Vec::new();
        for joint in self.joints.iter() {
            let continues = match (joint.parent, chain.last()) {
                (Some(parent), Some(&last)) => parent == last,
                _ => false,
            };
            if !continues && !chain.is_empty() {
                kinematic_chains.push(std::mem::take(&mut chain));
            }
            if chain.is_empty() {
                if let Some(parent) = joint.parent {
                    chain.push(parent);
                }
            }
            chain.push(joint.index);
        }
        if !chain.is_empty() {
            kinematic_chains.push(chain);
        }
        kinematic_chains
    }
}

/// Indented hierarchy dump, one joint per line.
impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for joint in &self.joints {
            let indent = "  ".repeat(joint.depth);
            write!(
                f,
                "{}{} offset=({:.2}, {:.2}, {:.2})",
                indent, joint.name, joint.offset.x, joint.offset.y, joint.offset.z
            )?;
            if !joint.channels.is_empty() {
                let names: Vec<&str> = joint.channels.iter().map(Channel::name).collect();
                write!(f, " channels[{}..]={}", joint.channel_start, names.join(" "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub struct Motion {
    pub num_frames: usize,
    pub num_channels: usize,
    pub frame_time: f64,
    /// Row-major: frame 0's channels first, then frame 1's, etc.
    pub data: Vec<f64>,
}

impl Motion {
    /// Channel values of one frame.
    pub fn frame(&self, frame: usize) -> &[f64] {
        assert!(
            frame < self.num_frames,
            "frame {} out of range (motion has {} frames)",
            frame,
            self.num_frames
        );
        let start = frame * self.num_channels;
        &self.data[start..start + self.num_channels]
    }

    /// fps is the reciprocal of frame_time (rounded to nearest integer)
    pub fn fps(&self) -> u32 {
        if self.frame_time > 0.0 {
            (1.0 / self.frame_time).round() as u32
        } else {
            0
        }
    }

    /// Length of the clip in seconds.
    pub fn duration(&self) -> f64 {
        self.num_frames as f64 * self.frame_time
    }
}
