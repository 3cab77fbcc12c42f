/// Tests for the camera

use super::*;

#[test]
fn test_new_camera_is_identity() {
    let cam = Camera::new();
    assert_eq!(*cam.view(), Mat4::IDENTITY);
    assert_eq!(*cam.projection(), Mat4::IDENTITY);
    assert_eq!(cam.view_projection(), Mat4::IDENTITY);
}

#[test]
fn test_view_projection_order() {
    let mut cam = Camera::new();
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
    let projection = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
    cam.set_view(view);
    cam.set_projection(projection);
    assert_eq!(cam.view_projection(), projection * view);
}

#[test]
fn test_look_at_transforms_center_onto_negative_z() {
    let mut cam = Camera::new();
    let eye = Vec3::new(0.0, 0.0, 10.0);
    let center = Vec3::ZERO;
    cam.look_at(eye, center, Vec3::Y);

    let p = cam.view().transform_point3(center);
    assert!(p.x.abs() < 1e-5);
    assert!(p.y.abs() < 1e-5);
    assert!((p.z + 10.0).abs() < 1e-5);
}

#[test]
fn test_perspective_constructor() {
    let cam = Camera::perspective(1.2, 4.0 / 3.0, 0.1, 1000.0);
    assert_eq!(*cam.view(), Mat4::IDENTITY);
    assert_ne!(*cam.projection(), Mat4::IDENTITY);
}
