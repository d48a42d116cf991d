use glam::Vec3;
use uuid::Uuid;

/// Light component attached to a scene node. The node's orientation gives
/// the light its direction; the component carries photometric data only.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            intensity,
            kind: LightKind::Point,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_directional(&self) -> bool {
        self.kind == LightKind::Directional
    }
}
