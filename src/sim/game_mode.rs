#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameMode {
    #[default]
    Soccar,
    Hoops,
    /// No arena, goals or boost pads. The cars and ball fall forever.
    TheVoid,
}

impl GameMode {
    pub const ALL: [Self; 3] = [Self::Soccar, Self::Hoops, Self::TheVoid];

    const NAMES: [&'static str; 3] = ["soccar", "hoops", "void"];

    #[must_use]
    pub const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    #[must_use]
    pub const fn has_goals(self) -> bool {
        !matches!(self, Self::TheVoid)
    }
}

impl TryFrom<u8> for GameMode {
    type Error = ();
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(usize::from(value)).copied().ok_or(())
    }
}
