//! Fly camera driven by mouse motion.
//!
//! Horizontal mouse motion turns the heading, vertical motion walks along it.
//! The view never pitches once the mouse has moved: the front vector is kept
//! in the XZ plane.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

use crate::config::CameraConfig;

/// cgmath builds clip space for a -1..1 depth range, wgpu expects 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub yaw: Deg<f32>,
}

impl Camera {
    pub fn new(position: Vector3<f32>, front: Vector3<f32>, yaw: Deg<f32>) -> Self {
        Self {
            position: Point3::new(position.x, position.y, position.z),
            front: front.normalize(),
            up: Vector3::unit_y(),
            yaw,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.position, config.front, config.yaw)
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.front, self.up)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates raw mouse motion between frames and applies it to a camera.
#[derive(Clone, Copy, Debug)]
pub struct CameraController {
    sensitivity: f32,
    move_speed: f32,
    pending: (f64, f64),
}

impl CameraController {
    pub fn new(sensitivity: f32, move_speed: f32) -> Self {
        Self {
            sensitivity,
            move_speed,
            pending: (0.0, 0.0),
        }
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.pending.0 += dx;
        self.pending.1 += dy;
    }

    /// Turn by the pending horizontal motion and walk by the pending vertical
    /// motion. Moving the mouse up (negative `dy`) walks forward.
    pub fn update(&mut self, camera: &mut Camera) {
        let (dx, dy) = std::mem::take(&mut self.pending);
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        camera.yaw += Deg(dx as f32 * self.sensitivity);
        let yaw = Rad::from(camera.yaw);
        camera.front = Vector3::new(yaw.0.cos(), 0.0, yaw.0.sin()).normalize();
        camera.position += camera.front * (-dy as f32 * self.sensitivity * self.move_speed);
    }
}
