use carball::CarControls;

/// Ground controls, everything else neutral
pub const fn quick_drive(throttle: f32, steer: f32, boost: bool, handbrake: bool) -> CarControls {
    let mut controls = CarControls::DEFAULT;
    controls.throttle = throttle;
    controls.steer = steer;
    controls.boost = boost;
    controls.handbrake = handbrake;
    controls
}

/// Air controls, no throttle or steering
pub const fn quick_air(pitch: f32, yaw: f32, roll: f32, jump: bool, boost: bool) -> CarControls {
    let mut controls = CarControls::DEFAULT;
    controls.pitch = pitch;
    controls.yaw = yaw;
    controls.roll = roll;
    controls.jump = jump;
    controls.boost = boost;
    controls
}
