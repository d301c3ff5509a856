/// What kind of simulation object owns a rigid body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserInfoTypes {
    #[default]
    None,
    Ball,
    Car,
}
