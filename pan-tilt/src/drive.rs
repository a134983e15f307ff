use crate::{Linkage, Pose};

/// Actuation backend, which owns pulse generation and the device.
///
/// The angle is in degrees, relative to the calibrated zero.
pub trait Actuator {
    /// Error of the backend.
    type Error;

    /// Command one channel to an angle.
    fn move_to(&mut self, channel: u8, angle: f64) -> Result<(), Self::Error>;
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    type Error = A::Error;

    fn move_to(&mut self, channel: u8, angle: f64) -> Result<(), Self::Error> {
        (**self).move_to(channel, angle)
    }
}

/// Drive an [`Actuator`] with a calibrated linkage.
///
/// Poses that cannot be solved, or that exceed the angle limit, are reported
/// and skipped without issuing any command.
#[derive(Clone, Debug)]
pub struct Driver<A> {
    linkage: Linkage,
    channels: [u8; 2],
    limit: Option<f64>,
    actuator: A,
}

impl<A: Actuator> Driver<A> {
    /// Create with channels of actuator `[A, B]`.
    ///
    /// The angle limit defaults to ±60°.
    pub fn new(linkage: Linkage, channels: [u8; 2], actuator: A) -> Self {
        Self { linkage, channels, limit: Some(60.), actuator }
    }

    /// Set the symmetric angle limit in degrees, `None` to disable.
    pub fn limit(self, limit: Option<f64>) -> Self {
        Self { limit, ..self }
    }

    /// The linkage.
    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    /// The actuator.
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Take the actuator back.
    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Point the end effector at a pose.
    ///
    /// Return the issued angles, or `None` if nothing is issued.
    pub fn point(&mut self, pose: Pose) -> Result<Option<[f64; 2]>, A::Error> {
        let [theta, phi] = pose.to_degrees();
        let angles = match self.linkage.ik_pose(pose) {
            Ok(angles) => angles,
            Err(e) => {
                tracing::warn!(theta, phi, "no command issued: {e}");
                return Ok(None);
            }
        };
        if let Some(limit) = self.limit {
            if angles.iter().any(|a| a.abs() > limit) {
                let [a, b] = angles;
                tracing::warn!(theta, phi, a, b, limit, "no command issued: out of limit");
                return Ok(None);
            }
        }
        for (&channel, &angle) in self.channels.iter().zip(&angles) {
            self.actuator.move_to(channel, angle)?;
        }
        Ok(Some(angles))
    }
}
