use crate::types::{Channel, Matrix, Position};
use cgmath::{Deg, Matrix4, Vector3};

/// Elementary transform of a single channel value.
/// Position channels translate along their axis (file units), rotation channels rotate about
/// their axis by `value` DEGREES.
pub(crate) fn channel_transform(channel: Channel, value: f64) -> Matrix {
    match channel {
        Channel::Xposition => Matrix4::from_translation(Vector3::new(value, 0.0, 0.0)),
        Channel::Yposition => Matrix4::from_translation(Vector3::new(0.0, value, 0.0)),
        Channel::Zposition => Matrix4::from_translation(Vector3::new(0.0, 0.0, value)),
        Channel::Xrotation => Matrix4::from_angle_x(Deg(value)),
        Channel::Yrotation => Matrix4::from_angle_y(Deg(value)),
        Channel::Zrotation => Matrix4::from_angle_z(Deg(value)),
    }
}

/// Local transform of a joint: its offset, then every channel right-multiplied in declared order.
pub(crate) fn local_transform(offset: Position, channels: &[Channel], values: &[f64]) -> Matrix {
    debug_assert_eq!(channels.len(), values.len());
    channels
        .iter()
        .zip(values)
        .fold(Matrix4::from_translation(offset), |local, (&channel, &value)| {
            local * channel_transform(channel, value)
        })
}

/// Translation column of an affine transform.
pub fn translation_of(matrix: &Matrix) -> Position {
    matrix.w.truncate()
}

/////////////////////////////////////////////////////////////////////////////////////////////////
