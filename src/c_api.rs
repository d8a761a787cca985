use crate::{
    body::{BodyId, Pose},
    config::PhysicsConfig,
    scene,
    world::World,
};

/// Builds the standard level with default physics. Returns null on failure.
#[unsafe(no_mangle)]
pub extern "C" fn World_CreateStandard() -> *mut World {
    match scene::standard_level(PhysicsConfig::default()) {
        Ok(world) => Box::into_raw(Box::new(world)),
        Err(err) => {
            log::warn!("failed to build standard level: {}", err);
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_Destroy(handle: *mut World) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_Advance(handle: *mut World, dt: f32) {
    if let Some(world) = unsafe { handle.as_mut() } {
        world.advance(dt);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_Launch(handle: *mut World, id: u32, angle: f32, speed: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|world| world.launch(BodyId(id), angle, speed).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_LaunchProjectile(handle: *mut World, angle: f32, speed: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|world| world.launch_projectile(angle, speed).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_Aim(handle: *mut World, angle: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|world| world.aim(angle).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_Reload(handle: *mut World) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|world| world.reload().is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_GetBodyCount(handle: *const World) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |world| world.bodies().len())
}

/// Writes the pose of body `id` into `out`. Returns false for an unknown id
/// or a null pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_GetPose(handle: *const World, id: u32, out: *mut Pose) -> bool {
    let (Some(world), false) = (unsafe { handle.as_ref() }, out.is_null()) else {
        return false;
    };
    match world.pose(BodyId(id)) {
        Ok(pose) => {
            unsafe { out.write(pose) };
            true
        }
        Err(_) => false,
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_IsActive(handle: *const World, id: u32) -> bool {
    unsafe { handle.as_ref() }
        .and_then(|world| world.body(BodyId(id)).ok())
        .is_some_and(|body| body.active)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn World_GetScore(handle: *const World) -> i32 {
    unsafe { handle.as_ref() }.map_or(0, |world| world.score())
}
