//! Fire-and-forget notifications for an external effect sink.

use glam::Vec2;

use crate::ColorTag;

/// Visual or textual feedback requested by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// What should be shown.
    pub kind: NotificationKind,
    /// World position of the feedback.
    pub position: Vec2,
    /// Colour hint for presentation.
    pub color: ColorTag,
}

/// Shape of a notification.
#[derive(Clone, Debug, PartialEq)]
pub enum NotificationKind {
    /// Floating text such as rewards or wave banners.
    FloatingText(String),
    /// Expanding blast ring.
    Explosion {
        /// Radius of the blast.
        radius: f32,
    },
    /// Small particle puff.
    Particle,
}

impl Notification {
    /// Creates a floating text notification.
    #[must_use]
    pub fn text(text: impl Into<String>, position: Vec2, color: ColorTag) -> Self {
        Self {
            kind: NotificationKind::FloatingText(text.into()),
            position,
            color,
        }
    }

    /// Creates an explosion notification.
    #[must_use]
    pub fn explosion(position: Vec2, radius: f32, color: ColorTag) -> Self {
        Self {
            kind: NotificationKind::Explosion { radius },
            position,
            color,
        }
    }

    /// Creates a particle notification.
    #[must_use]
    pub fn particle(position: Vec2, color: ColorTag) -> Self {
        Self {
            kind: NotificationKind::Particle,
            position,
            color,
        }
    }
}

/// Receiver of notifications. The simulation never reads them back.
pub trait EffectSink {
    /// Hands a notification to the presentation layer.
    fn notify(&mut self, notification: Notification);
}

impl EffectSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Sink that drops every notification.
impl EffectSink for () {
    fn notify(&mut self, _notification: Notification) {}
}
