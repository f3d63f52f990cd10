use crate::{CoreError, Grade};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HapticStyle {
    Light,
    Medium,
    Heavy,
    Success,
}

impl HapticStyle {
    pub fn for_grade(grade: Grade) -> Self {
        match grade {
            Grade::Again => HapticStyle::Heavy,
            Grade::Hard => HapticStyle::Medium,
            Grade::Good => HapticStyle::Light,
            Grade::Easy => HapticStyle::Success,
        }
    }
}

/// Fire-and-forget feedback device. Callers ignore failures.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, style: HapticStyle) -> Result<(), CoreError>;
}
