use space_salvagers_core::Vec2;

/// Position and facing of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vec2,
    /// Facing in radians.
    pub rotation: f32,
}

impl Transform {
    /// Transform at `position` facing along the x axis.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Turns the transform to face along `direction`; zero directions keep the facing.
    pub fn face(&mut self, direction: Vec2) {
        if direction.length_squared() > f32::EPSILON {
            self.rotation = direction.y.atan2(direction.x);
        }
    }
}
